//! Scriptable in-memory ledger.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use palmares_core::error::LedgerError;
use palmares_core::ledger::{
    EventFilter, EventSubscription, LedgerClient, RawEvent, Receipt, Registry, SubscriptionId,
    TransactionHandle, TxStatus,
};
use serde_json::Value;
use tokio::sync::mpsc;

/// Scripted result of one transaction submission.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Inclusion succeeds and the receipt carries these emitted events.
    Succeed(Vec<RawEvent>),
    /// Inclusion succeeds but execution reverts with an optional reason.
    Revert(Option<String>),
    /// Submission itself fails at the transport level.
    Fail(String),
}

struct Subscriber {
    registry: Registry,
    event_name: String,
    sender: mpsc::UnboundedSender<RawEvent>,
}

/// An in-memory ledger: records every emitted event as history, delivers
/// live copies to subscribers, and answers calls and submissions from
/// scripted results.
///
/// Submission outcomes are consumed FIFO per (registry, method); when no
/// outcome is scripted, submissions succeed with an empty receipt.
#[derive(Default)]
pub struct FakeLedger {
    history: Mutex<Vec<RawEvent>>,
    subscribers: Mutex<HashMap<u64, Subscriber>>,
    next_subscription_id: AtomicU64,
    call_results: Mutex<HashMap<(Registry, String, Option<String>), Value>>,
    failing_calls: Mutex<Vec<(Registry, String)>>,
    submit_outcomes: Mutex<HashMap<(Registry, String), VecDeque<SubmitOutcome>>>,
    submissions: Mutex<Vec<(Registry, String, Vec<Value>)>>,
    echo_receipts: AtomicBool,
}

impl FakeLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to history and delivers it to live subscribers.
    ///
    /// # Panics
    ///
    /// Panics if an internal mutex is poisoned.
    pub fn emit(&self, registry: Registry, name: &str, args: Vec<Value>) {
        let event = RawEvent {
            registry,
            name: name.to_owned(),
            args,
        };
        self.history.lock().unwrap().push(event.clone());
        self.deliver(&event);
    }

    /// Delivers an event to live subscribers without recording history.
    /// Useful for simulating the historical/live overlap window.
    pub fn deliver_live_only(&self, registry: Registry, name: &str, args: Vec<Value>) {
        self.deliver(&RawEvent {
            registry,
            name: name.to_owned(),
            args,
        });
    }

    /// Scripts the result of a read call, for any arguments.
    pub fn set_call_result(&self, registry: Registry, method: &str, result: Value) {
        self.call_results
            .lock()
            .unwrap()
            .insert((registry, method.to_owned(), None), result);
    }

    /// Scripts the result of a read call for one exact argument list.
    pub fn set_call_result_for(
        &self,
        registry: Registry,
        method: &str,
        args: &[Value],
        result: Value,
    ) {
        let key = (registry, method.to_owned(), Some(args_key(args)));
        self.call_results.lock().unwrap().insert(key, result);
    }

    /// Makes a read call fail at the transport level.
    pub fn fail_call(&self, registry: Registry, method: &str) {
        self.failing_calls
            .lock()
            .unwrap()
            .push((registry, method.to_owned()));
    }

    /// Queues the outcome of the next submission of (registry, method).
    pub fn push_submit_outcome(&self, registry: Registry, method: &str, outcome: SubmitOutcome) {
        self.submit_outcomes
            .lock()
            .unwrap()
            .entry((registry, method.to_owned()))
            .or_default()
            .push_back(outcome);
    }

    /// When enabled, receipt events of successful submissions are also
    /// emitted to history and live subscribers, like a real ledger echo.
    pub fn set_echo_receipts(&self, echo: bool) {
        self.echo_receipts.store(echo, Ordering::SeqCst);
    }

    /// Returns every submission recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn submissions(&self) -> Vec<(Registry, String, Vec<Value>)> {
        self.submissions.lock().unwrap().clone()
    }

    /// Returns the number of open live subscriptions.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn live_subscription_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    fn deliver(&self, event: &RawEvent) {
        let subscribers = self.subscribers.lock().unwrap();
        for subscriber in subscribers.values() {
            if subscriber.registry == event.registry && subscriber.event_name == event.name {
                // A closed receiver just means the subscriber went away.
                let _ = subscriber.sender.send(event.clone());
            }
        }
    }
}

fn args_key(args: &[Value]) -> String {
    serde_json::to_string(args).expect("JSON values serialize infallibly")
}

struct FakeTransactionHandle {
    receipt: Receipt,
}

#[async_trait]
impl TransactionHandle for FakeTransactionHandle {
    async fn wait(self: Box<Self>) -> Result<Receipt, LedgerError> {
        Ok(self.receipt)
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn query_events(
        &self,
        registry: Registry,
        event_name: &str,
        filter: &EventFilter,
        from_index: u64,
    ) -> Result<Vec<RawEvent>, LedgerError> {
        let matching: Vec<RawEvent> = self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|event| {
                event.registry == registry
                    && event.name == event_name
                    && filter.matches(&event.args)
            })
            .cloned()
            .collect();
        let from = usize::try_from(from_index).unwrap_or(usize::MAX);
        Ok(matching.into_iter().skip(from).collect())
    }

    async fn subscribe(
        &self,
        registry: Registry,
        event_name: &str,
    ) -> Result<EventSubscription, LedgerError> {
        let id = self.next_subscription_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().insert(
            id,
            Subscriber {
                registry,
                event_name: event_name.to_owned(),
                sender,
            },
        );
        Ok(EventSubscription {
            id: SubscriptionId(id),
            events: receiver,
        })
    }

    async fn unsubscribe(&self, id: SubscriptionId) -> Result<(), LedgerError> {
        self.subscribers.lock().unwrap().remove(&id.0);
        Ok(())
    }

    async fn call(
        &self,
        registry: Registry,
        method: &str,
        args: &[Value],
    ) -> Result<Value, LedgerError> {
        if self
            .failing_calls
            .lock()
            .unwrap()
            .contains(&(registry, method.to_owned()))
        {
            return Err(LedgerError::Call {
                registry,
                method: method.to_owned(),
                reason: "simulated failure".to_owned(),
            });
        }
        let results = self.call_results.lock().unwrap();
        let exact = results.get(&(registry, method.to_owned(), Some(args_key(args))));
        let fallback = results.get(&(registry, method.to_owned(), None));
        exact
            .or(fallback)
            .cloned()
            .ok_or_else(|| LedgerError::Call {
                registry,
                method: method.to_owned(),
                reason: "no scripted result".to_owned(),
            })
    }

    async fn submit(
        &self,
        registry: Registry,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Box<dyn TransactionHandle>, LedgerError> {
        self.submissions
            .lock()
            .unwrap()
            .push((registry, method.to_owned(), args));

        let outcome = self
            .submit_outcomes
            .lock()
            .unwrap()
            .get_mut(&(registry, method.to_owned()))
            .and_then(VecDeque::pop_front)
            .unwrap_or(SubmitOutcome::Succeed(Vec::new()));

        match outcome {
            SubmitOutcome::Succeed(events) => {
                if self.echo_receipts.load(Ordering::SeqCst) {
                    for event in &events {
                        self.history.lock().unwrap().push(event.clone());
                        self.deliver(event);
                    }
                }
                Ok(Box::new(FakeTransactionHandle {
                    receipt: Receipt {
                        status: TxStatus::Succeeded,
                        events,
                    },
                }))
            }
            SubmitOutcome::Revert(reason) => Ok(Box::new(FakeTransactionHandle {
                receipt: Receipt {
                    status: TxStatus::Reverted { reason },
                    events: Vec::new(),
                },
            })),
            SubmitOutcome::Fail(reason) => Err(LedgerError::Submit {
                registry,
                method: method.to_owned(),
                reason,
            }),
        }
    }
}
