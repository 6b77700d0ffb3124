use chrono::Duration;
use storage::repository::{Storage, ValidationStateRecord, ValidationStateRepository};
use storage::sqlite::SqliteRepository;
use validation_core::machine::{Event, LongSessionState, ValidationMachine, ValidationState};
use validation_core::model::{
    AnswerOption, Epoch, Flip, FlipStatus, Relevance, SessionParams, SessionParamsDraft,
};
use validation_core::time::fixed_now;

fn build_params(epoch: u64) -> SessionParams {
    SessionParamsDraft {
        epoch,
        coinbase: "0xabc".into(),
        credential: "secret".into(),
        validation_start_ms: fixed_now().timestamp_millis(),
        short_session_secs: 120,
        long_session_secs: 600,
        locale: Some("de".into()),
    }
    .validate()
    .unwrap()
}

fn long_machine(epoch: u64) -> ValidationMachine {
    let long: Vec<Flip> = (0..6)
        .map(|i| {
            Flip::new(format!("l{i}"))
                .with_status(FlipStatus::decoded())
                .with_words(vec![i, i + 10])
        })
        .collect();
    let mut machine = ValidationMachine::start(
        build_params(epoch),
        Vec::new(),
        long,
        fixed_now() + Duration::seconds(200),
    );
    machine.send(Event::StartLongSession);
    for i in 0..6 {
        machine.send(Event::Answer {
            hash: format!("l{i}").into(),
            option: AnswerOption::Right,
        });
    }
    machine.send(Event::FinishFlips);
    machine.send(Event::StartKeywordsQualification);
    machine.send(Event::ToggleWords {
        hash: "l2".into(),
        relevance: Relevance::Irrelevant,
    });
    machine
}

#[tokio::test]
async fn sqlite_roundtrip_restores_session() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let machine = long_machine(11);
    let record = ValidationStateRecord::from_snapshot(machine.snapshot(), fixed_now());
    repo.save_state(&record).await.unwrap();

    let loaded = repo
        .load_state(Epoch::new(11))
        .await
        .unwrap()
        .expect("record stored");
    assert_eq!(loaded.state_path, "longSession.solve.answer.keywordsQualification");
    assert_eq!(loaded.saved_at, fixed_now());
    // Credentials never reach the database.
    assert_eq!(loaded.snapshot.context().params().credential().expose(), "");

    let restored = ValidationMachine::restore(build_params(11), loaded.into_snapshot()).unwrap();
    assert_eq!(restored.snapshot(), machine.snapshot());
    assert_eq!(
        restored.state(),
        &ValidationState::LongSession(LongSessionState::KeywordsQualification)
    );
    assert_eq!(
        restored.context().long_flips()[2].relevance(),
        Some(Relevance::Irrelevant)
    );
}

#[tokio::test]
async fn sqlite_save_overwrites_and_clear_removes() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_overwrite?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Migrations are idempotent.
    repo.migrate().await.expect("migrate twice");

    let mut machine = long_machine(5);
    repo.save_state(&ValidationStateRecord::from_snapshot(machine.snapshot(), fixed_now()))
        .await
        .unwrap();

    machine.send(Event::Pick { index: 5 });
    machine.send(Event::Submit);
    let later = fixed_now() + Duration::seconds(30);
    repo.save_state(&ValidationStateRecord::from_snapshot(machine.snapshot(), later))
        .await
        .unwrap();

    let loaded = repo.load_state(Epoch::new(5)).await.unwrap().unwrap();
    assert_eq!(loaded.state_path, "longSession.solve.answer.submitAnswers.review");
    assert_eq!(loaded.saved_at, later);

    repo.clear_state(Epoch::new(5)).await.unwrap();
    assert!(repo.load_state(Epoch::new(5)).await.unwrap().is_none());
}

#[tokio::test]
async fn storage_sqlite_keys_sessions_by_epoch() {
    let storage = Storage::sqlite("sqlite:file:memdb_epochs?mode=memory&cache=shared")
        .await
        .expect("storage");

    for epoch in [1, 2] {
        let machine = long_machine(epoch);
        storage
            .validation_states
            .save_state(&ValidationStateRecord::from_snapshot(machine.snapshot(), fixed_now()))
            .await
            .unwrap();
    }
    storage.validation_states.clear_state(Epoch::new(1)).await.unwrap();

    assert!(storage.validation_states.load_state(Epoch::new(1)).await.unwrap().is_none());
    let kept = storage.validation_states.load_state(Epoch::new(2)).await.unwrap().unwrap();
    assert_eq!(kept.epoch, Epoch::new(2));
}

#[tokio::test]
async fn sqlite_clears_earlier_epochs() {
    let storage = Storage::sqlite("sqlite:file:memdb_prune?mode=memory&cache=shared")
        .await
        .expect("storage");

    for epoch in [1, 2, 3] {
        let machine = long_machine(epoch);
        storage
            .validation_states
            .save_state(&ValidationStateRecord::from_snapshot(machine.snapshot(), fixed_now()))
            .await
            .unwrap();
    }
    storage.validation_states.clear_other_epochs(Epoch::new(3)).await.unwrap();

    for epoch in [1, 2] {
        assert!(storage.validation_states.load_state(Epoch::new(epoch)).await.unwrap().is_none());
    }
    assert!(storage.validation_states.load_state(Epoch::new(3)).await.unwrap().is_some());
}
