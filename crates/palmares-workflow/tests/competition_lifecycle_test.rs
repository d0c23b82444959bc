//! Full competition lifecycle over the fakes: registration, minting,
//! nomination, jury assignment, voting and winner designation, then a
//! from-scratch replay that must converge on the same state.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use palmares_core::clock::Clock;
use palmares_core::content::{ContentId, ContentStore};
use palmares_core::identity::Address;
use palmares_core::ledger::{LedgerClient, RawEvent, Registry};
use palmares_metadata::codec::{self, PersonFields};
use palmares_projection::application::projector::EventProjector;
use palmares_projection::application::subscriptions::SubscriptionManager;
use palmares_projection::domain::entities::{Category, CompetitionPhase, PeopleKind, Winner};
use palmares_test_support::{
    FakeLedger, FixedClock, MemoryContentStore, SubmitOutcome, init_test_tracing,
};
use palmares_voting::VotingCoordinator;
use palmares_workflow::domain::draft::{CompetitionDraft, JuryDraft, PersonDraft};
use palmares_workflow::{CompetitionWorkflow, CreateProgress, MintProgress, MintingWorkflow};
use serde_json::json;
use tokio::sync::Mutex;

struct World {
    ledger: Arc<FakeLedger>,
    content: Arc<MemoryContentStore>,
    clock: Arc<FixedClock>,
    projector: Arc<Mutex<EventProjector>>,
    competitions: CompetitionWorkflow,
    minting: MintingWorkflow,
    voting: VotingCoordinator,
}

fn world() -> World {
    init_test_tracing();
    let ledger = Arc::new(FakeLedger::new());
    // Receipt events also reach history, like a real ledger echo.
    ledger.set_echo_receipts(true);
    let content = Arc::new(MemoryContentStore::new());
    let clock = Arc::new(FixedClock::at(
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
    ));
    let projector = Arc::new(Mutex::new(EventProjector::new(
        Arc::clone(&ledger) as Arc<dyn LedgerClient>,
        Arc::clone(&content) as Arc<dyn ContentStore>,
    )));
    let competitions = CompetitionWorkflow::new(
        Arc::clone(&ledger) as Arc<dyn LedgerClient>,
        Arc::clone(&content) as Arc<dyn ContentStore>,
        Arc::clone(&clock) as Arc<dyn Clock>,
        Arc::clone(&projector),
    );
    let minting = MintingWorkflow::new(
        Arc::clone(&ledger) as Arc<dyn LedgerClient>,
        Arc::clone(&content) as Arc<dyn ContentStore>,
        Arc::clone(&projector),
    );
    let voting = VotingCoordinator::new(
        Arc::clone(&ledger) as Arc<dyn LedgerClient>,
        Arc::clone(&clock) as Arc<dyn Clock>,
        Arc::clone(&projector),
    );
    World {
        ledger,
        content,
        clock,
        projector,
        competitions,
        minting,
        voting,
    }
}

/// Pre-publishes a person document so its content id can be scripted into
/// the mint event. The store is content-addressed, so the workflow's own
/// publish of the same bytes yields the same id.
async fn expected_person_document(world: &World, draft: &PersonDraft) -> ContentId {
    let picture = world.content.put(draft.picture.clone()).await.unwrap();
    let fields = PersonFields {
        firstname: draft.firstname.clone(),
        lastname: draft.lastname.clone(),
        picture,
        wallet: draft.wallet.clone(),
    };
    world
        .content
        .put(codec::person_document(&fields).to_bytes())
        .await
        .unwrap()
}

async fn expected_jury_document(world: &World, draft: &JuryDraft) -> ContentId {
    let picture = world.content.put(draft.picture.clone()).await.unwrap();
    let fields = PersonFields {
        firstname: draft.firstname.clone(),
        lastname: draft.lastname.clone(),
        picture,
        wallet: draft.wallet.clone(),
    };
    world
        .content
        .put(codec::jury_document(&fields).to_bytes())
        .await
        .unwrap()
}

fn actor_draft(firstname: &str, wallet: &str) -> PersonDraft {
    PersonDraft {
        kind: PeopleKind::Actor,
        firstname: firstname.to_owned(),
        lastname: "Deneuve".to_owned(),
        wallet: Address::new(wallet),
        picture: firstname.as_bytes().to_vec(),
    }
}

fn event(registry: Registry, name: &str, args: Vec<serde_json::Value>) -> RawEvent {
    RawEvent {
        registry,
        name: name.to_owned(),
        args,
    }
}

#[tokio::test]
async fn test_full_lifecycle_and_replay_convergence() {
    let world = world();

    // -- Register the competition.
    let draft = CompetitionDraft {
        title: "Best Actor 2026".to_owned(),
        award_name: "Golden Mask".to_owned(),
        category: Category::Actor,
        start_time: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
        end_time: Utc.with_ymd_and_hms(2026, 3, 8, 0, 0, 0).unwrap(),
        picture: b"trophy".to_vec(),
    };
    world.ledger.push_submit_outcome(
        Registry::Competitions,
        "addCompetition",
        SubmitOutcome::Succeed(vec![event(
            Registry::Competitions,
            "CompetitionSessionRegistered",
            vec![json!(1)],
        )]),
    );
    let mut create_progress = CreateProgress::default();
    let competition_id = world
        .competitions
        .create_competition(&draft, &mut create_progress)
        .await
        .unwrap();
    assert_eq!(competition_id, 1);

    // The replaying projector below reads the competition through this call.
    let document = create_progress.document.clone().unwrap();
    world.ledger.set_call_result_for(
        Registry::Competitions,
        "getCompetition",
        &[json!(1)],
        json!({
            "title": draft.title,
            "tokenURI": document.as_str(),
            "typeCompetitions": draft.category.code(),
            "startTime": draft.start_time.timestamp(),
            "endTime": draft.end_time.timestamp(),
        }),
    );

    // -- Mint two actor nominees.
    let mut token_ids = Vec::new();
    for (token_id, firstname, wallet) in [(10, "Catherine", "0xcd"), (11, "Isabelle", "0xih")] {
        let actor = actor_draft(firstname, wallet);
        let document = expected_person_document(&world, &actor).await;
        world.ledger.push_submit_outcome(
            Registry::Actors,
            "mint",
            SubmitOutcome::Succeed(vec![event(
                Registry::Actors,
                "ActorMinted",
                vec![json!(token_id), json!(document.as_str())],
            )]),
        );
        let mut progress = MintProgress::default();
        let minted = world
            .minting
            .register_person(&actor, &mut progress)
            .await
            .unwrap();
        assert_eq!(minted, token_id);
        token_ids.push(minted);
    }

    // -- Attach them as nominees.
    for (local_id, token_id) in [(1u64, 10u64), (2, 11)] {
        world.ledger.push_submit_outcome(
            Registry::Competitions,
            "addNomineeToCompetition",
            SubmitOutcome::Succeed(vec![event(
                Registry::Competitions,
                "NomineeCompetitionsRegistered",
                vec![json!(1), json!(local_id), json!(token_id)],
            )]),
        );
    }
    world
        .competitions
        .add_nominees(competition_id, &token_ids)
        .await
        .unwrap();

    // -- Mint a jury member and assign them.
    let jury = JuryDraft {
        firstname: "Agnès".to_owned(),
        lastname: "Varda".to_owned(),
        wallet: Address::new("0xjury"),
        picture: b"portrait".to_vec(),
    };
    let jury_document = expected_jury_document(&world, &jury).await;
    world.ledger.push_submit_outcome(
        Registry::Juries,
        "mint",
        SubmitOutcome::Succeed(vec![event(
            Registry::Juries,
            "JuryMinted",
            vec![json!("0xjury"), json!(7), json!(jury_document.as_str())],
        )]),
    );
    let mut jury_progress = MintProgress::default();
    let jury_id = world
        .minting
        .register_jury(&jury, &mut jury_progress)
        .await
        .unwrap();
    assert_eq!(jury_id, 7);

    world.ledger.push_submit_outcome(
        Registry::Competitions,
        "addJuryToCompetition",
        SubmitOutcome::Succeed(vec![event(
            Registry::Competitions,
            "JuryAddedToCompetition",
            vec![json!(1), json!(7)],
        )]),
    );
    world
        .competitions
        .assign_juries(competition_id, &[jury_id])
        .await
        .unwrap();

    // -- Vote inside the window.
    world
        .clock
        .set(Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap());
    let pending = world.voting.pending_votes(jury_id).await;
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, competition_id);

    world.ledger.push_submit_outcome(
        Registry::Competitions,
        "voteOnCompetition",
        SubmitOutcome::Succeed(vec![event(
            Registry::Competitions,
            "VotedOnCompetition",
            vec![json!(1), json!(7), json!(1)],
        )]),
    );
    world
        .voting
        .cast_vote(competition_id, jury_id, 1)
        .await
        .unwrap();
    assert!(world.voting.pending_votes(jury_id).await.is_empty());

    // -- Close the window and designate the winner.
    world
        .clock
        .set(Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap());
    world.ledger.push_submit_outcome(
        Registry::Competitions,
        "designateWinner",
        SubmitOutcome::Succeed(vec![event(
            Registry::Competitions,
            "WinnerDesignated",
            vec![json!(1), json!(10), json!(1), json!(0)],
        )]),
    );
    let winner = world
        .competitions
        .designate_winner(competition_id)
        .await
        .unwrap();
    assert_eq!(
        winner,
        Winner {
            token_id: 10,
            local_id: 1
        }
    );

    let lifecycle_state = {
        let projector = world.projector.lock().await;
        assert_eq!(
            projector
                .competition(competition_id)
                .unwrap()
                .phase(world.clock.now()),
            CompetitionPhase::WinnerDesignated
        );
        (
            projector.actors(),
            projector.jury_members(),
            projector.competition(competition_id).unwrap(),
        )
    };

    // -- A projector starting from nothing replays the echoed history and
    // must converge on the optimistically built state.
    let mut replayer = EventProjector::new(
        Arc::clone(&world.ledger) as Arc<dyn LedgerClient>,
        Arc::clone(&world.content) as Arc<dyn ContentStore>,
    );
    let mut manager =
        SubscriptionManager::new(Arc::clone(&world.ledger) as Arc<dyn LedgerClient>);
    for registry in [Registry::Actors, Registry::Juries, Registry::Competitions] {
        replayer.sync(&mut manager, registry).await.unwrap();
    }

    assert_eq!(replayer.actors(), lifecycle_state.0);
    assert_eq!(replayer.jury_members(), lifecycle_state.1);
    assert_eq!(replayer.competition(competition_id).unwrap(), lifecycle_state.2);
}
