use cerealbox_core::{
    AutoPlayer, AutoStep, Binder, BoxDef, Catalog, Event, EventBus, NamePools, NameTier, Rarity,
    RarityKey, Session, SessionError, Slot, Stage, Timing, WeightTable,
};

fn rarities() -> Vec<Rarity> {
    ["1d", "2d", "3d", "cr"]
        .iter()
        .enumerate()
        .map(|(idx, key)| Rarity {
            key: (*key).into(),
            label: key.to_string(),
            icon: "◆".to_string(),
            repeat: 1,
            tier: if idx >= 2 {
                NameTier::Rare
            } else {
                NameTier::Common
            },
        })
        .collect()
}

fn boxed(key: &str, slots: &[&[(&str, f64)]]) -> BoxDef {
    BoxDef {
        key: key.to_string(),
        title: key.to_string(),
        description: String::new(),
        icon: String::new(),
        slots: slots
            .iter()
            .map(|entries| Slot::new(entries.iter().map(|(k, w)| (*k, *w)).collect::<WeightTable>()))
            .collect(),
    }
}

fn catalog() -> Catalog {
    let names = NamePools {
        common_adjectives: vec!["Misty".to_string()],
        rare_adjectives: vec!["Nebula".to_string()],
        nouns: vec!["Tide".to_string(), "Echo".to_string()],
    };
    Catalog::new(
        rarities(),
        vec![
            boxed(
                "mini",
                &[&[("1d", 1.0)], &[("1d", 65.0), ("2d", 35.0)], &[("3d", 1.0)]],
            ),
            boxed("crown", &[&[("1d", 1.0)], &[("cr", 1.0)]]),
            boxed("empty", &[]),
        ],
        names,
        "mini",
    )
    .expect("catalog")
}

fn session() -> Session {
    Session::new(catalog(), 21)
}

#[test]
fn starts_idle_on_default_box() {
    let session = session();
    assert_eq!(session.stage(), Stage::Idle);
    assert_eq!(session.current_box().key, "mini");
    assert_eq!(session.opened(), 0);
    assert_eq!(session.binder().len(), 4);
}

#[test]
fn full_cycle_records_every_card() {
    let mut session = session();
    let mut events = EventBus::default();
    session.spawn_box(&mut events).expect("spawn");
    assert_eq!(session.break_box(&mut events).expect("break"), 3);
    assert_eq!(session.stage(), Stage::Revealing);

    let first = session.reveal_next(&mut events).expect("reveal");
    assert_eq!(first.index, 2);
    assert_eq!(first.card.rarity.as_str(), "3d");
    assert!(!first.finished);
    session.reveal_next(&mut events).expect("reveal");
    let last = session.reveal_next(&mut events).expect("reveal");
    assert!(last.finished);
    assert_eq!(last.index, 0);
    assert_eq!(last.card.rarity.as_str(), "1d");

    assert_eq!(session.stage(), Stage::SummaryShown);
    assert_eq!(session.opened(), 1);
    assert_eq!(session.binder().total(), 3);
    assert_eq!(session.binder().count("3d"), 1);
    let summary = session.summary().expect("summary");
    assert_eq!(summary.cards.len(), 3);
    assert_eq!(
        summary.featured.as_ref().map(|c| c.rarity.as_str()),
        Some("3d")
    );
    assert!(session.pack().is_none());

    let drained: Vec<Event> = events.drain().collect();
    assert!(matches!(drained.first(), Some(Event::BoxSpawned { .. })));
    assert!(matches!(
        drained.last(),
        Some(Event::PackFinished { opened: 1, .. })
    ));
}

#[test]
fn summary_lists_cards_top_of_stack_first() {
    let mut session = session();
    let mut events = EventBus::default();
    session.spawn_box(&mut events).expect("spawn");
    session.break_box(&mut events).expect("break");
    let stacked = session.pack().expect("pack").cards.clone();

    let mut indices = Vec::new();
    while session.stage() == Stage::Revealing {
        indices.push(session.reveal_next(&mut events).expect("reveal").index);
    }
    assert_eq!(indices, vec![2, 1, 0]);

    let mut expected = stacked;
    expected.reverse();
    let summary = session.summary().expect("summary");
    assert_eq!(summary.cards, expected);
    assert_eq!(session.pulled(), expected.as_slice());
    assert_eq!(summary.cards[0].rarity.as_str(), "3d");
}

#[test]
fn rejects_out_of_order_operations() {
    let mut session = session();
    let mut events = EventBus::default();
    assert!(matches!(
        session.break_box(&mut events),
        Err(SessionError::InvalidStage(Stage::Idle))
    ));
    assert!(matches!(
        session.reveal_next(&mut events),
        Err(SessionError::InvalidStage(Stage::Idle))
    ));
    session.spawn_box(&mut events).expect("spawn");
    session.break_box(&mut events).expect("break");
    assert!(matches!(
        session.spawn_box(&mut events),
        Err(SessionError::InvalidStage(Stage::Revealing))
    ));
}

#[test]
fn unknown_box_is_an_error() {
    let mut session = session();
    let mut events = EventBus::default();
    assert!(matches!(
        session.select_box("mega", &mut events),
        Err(SessionError::UnknownBox(key)) if key == "mega"
    ));
    assert_eq!(session.current_box().key, "mini");
    assert!(events.is_empty());
    session.select_box("crown", &mut events).expect("select");
    assert_eq!(session.current_box().key, "crown");
}

#[test]
fn empty_box_finishes_immediately() {
    let mut session = session();
    let mut events = EventBus::default();
    session.select_box("empty", &mut events).expect("select");
    let summary = session.open_all(&mut events).expect("open");
    assert!(summary.cards.is_empty());
    assert_eq!(summary.featured, None);
    assert_eq!(session.opened(), 1);
    assert_eq!(session.stage(), Stage::SummaryShown);
}

#[test]
fn open_all_repeats_from_summary() {
    let mut session = session();
    let mut events = EventBus::default();
    session.select_box("crown", &mut events).expect("select");
    for round in 1..=4u64 {
        let summary = session.open_all(&mut events).expect("open");
        assert_eq!(
            summary.featured.map(|c| c.rarity),
            Some(RarityKey::from("cr"))
        );
        assert_eq!(session.opened(), round);
    }
    assert_eq!(session.binder().count("cr"), 4);
    assert_eq!(session.binder().count("1d"), 4);
}

#[test]
fn restore_keeps_counts_and_fills_gaps() {
    let mut session = session();
    let mut partial = Binder::default();
    partial.record(&RarityKey::from("2d"));
    session.restore(partial, 9);
    assert_eq!(session.opened(), 9);
    assert_eq!(session.binder().count("2d"), 1);
    assert_eq!(session.binder().count("cr"), 0);
    assert_eq!(session.binder().len(), 4);
}

#[test]
fn auto_play_walks_the_stages() {
    let mut session = session();
    let mut events = EventBus::default();
    let timing = Timing::default();
    let mut auto = AutoPlayer::new(timing).with_pack_limit(1);
    auto.start(0);
    assert_eq!(auto.next_due(), Some(timing.auto_step_ms));

    // nothing fires early
    assert_eq!(auto.poll(10, &mut session, &mut events).expect("poll"), None);

    let mut now = auto.next_due().expect("due");
    assert_eq!(
        auto.poll(now, &mut session, &mut events).expect("poll"),
        Some(AutoStep::Spawned)
    );
    now = auto.next_due().expect("due");
    assert_eq!(
        auto.poll(now, &mut session, &mut events).expect("poll"),
        Some(AutoStep::Broken { cards: 3 })
    );
    assert_eq!(auto.next_due(), Some(now + timing.wait_after_break_ms));

    let mut reveals = 0;
    while let Some(due) = auto.next_due() {
        now = due;
        match auto.poll(now, &mut session, &mut events).expect("poll") {
            Some(AutoStep::Revealed(_)) => reveals += 1,
            other => panic!("unexpected step {other:?}"),
        }
    }
    assert_eq!(reveals, 3);
    assert!(!auto.is_running());
    assert_eq!(auto.packs_finished(), 1);
    assert_eq!(session.opened(), 1);
    assert_eq!(session.stage(), Stage::SummaryShown);
}

#[test]
fn auto_play_keeps_a_single_pending_step() {
    let mut session = session();
    let mut events = EventBus::default();
    let mut auto = AutoPlayer::new(Timing::instant());
    auto.start(0);
    let first = auto.pending().expect("pending").token;
    let second = auto.schedule(5, 100).expect("token");
    assert_ne!(first, second);
    assert!(!auto.is_current(first));
    assert_eq!(auto.next_due(), Some(105));

    // the replaced step is stale
    assert_eq!(
        auto.fire(first, 200, &mut session, &mut events).expect("fire"),
        None
    );
    assert_eq!(session.stage(), Stage::Idle);
    assert!(auto
        .fire(second, 200, &mut session, &mut events)
        .expect("fire")
        .is_some());
    assert_eq!(session.stage(), Stage::BoxSpawned);
}

#[test]
fn stopped_auto_play_never_fires() {
    let mut session = session();
    let mut events = EventBus::default();
    let mut auto = AutoPlayer::new(Timing::instant());
    auto.start(0);
    let token = auto.pending().expect("pending").token;
    auto.stop();
    assert_eq!(auto.pending(), None);
    assert_eq!(auto.schedule(0, 0), None);
    assert_eq!(
        auto.fire(token, 1_000, &mut session, &mut events)
            .expect("fire"),
        None
    );
    assert_eq!(auto.poll(1_000, &mut session, &mut events).expect("poll"), None);
    assert_eq!(session.stage(), Stage::Idle);
}

#[test]
fn auto_play_runs_many_packs() {
    let mut session = session();
    let mut events = EventBus::default();
    let mut auto = AutoPlayer::new(Timing::instant()).with_pack_limit(25);
    auto.start(0);
    let mut guard = 0;
    while auto.is_running() {
        auto.poll(0, &mut session, &mut events).expect("poll");
        guard += 1;
        assert!(guard < 1_000, "auto-play did not stop");
    }
    assert_eq!(session.opened(), 25);
    assert_eq!(session.binder().total(), 75);
    assert_eq!(session.binder().count("1d") + session.binder().count("2d"), 50);
}

#[test]
fn auto_play_resumes_a_half_revealed_pack() {
    let mut session = session();
    let mut events = EventBus::default();
    session.spawn_box(&mut events).expect("spawn");
    session.break_box(&mut events).expect("break");
    session.reveal_next(&mut events).expect("reveal");

    let mut auto = AutoPlayer::new(Timing::instant()).with_pack_limit(1);
    auto.start(0);
    while auto.is_running() {
        auto.poll(0, &mut session, &mut events).expect("poll");
    }
    assert_eq!(session.opened(), 1);
    assert_eq!(session.summary().map(|s| s.cards.len()), Some(3));
}
