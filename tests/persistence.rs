use pretty_assertions::assert_eq;
use tdchess::brain::{Brain, BrainConfig, BrainStore};
use tdchess::{Color, Config, Fingerprint, Game};

#[test]
fn brain_roundtrips_bit_for_bit() {
    let dir = tempfile::tempdir().unwrap();
    let store = BrainStore::new(dir.path().join("brain.json"));
    let mut brain = Brain::open(BrainConfig::default(), store.clone());
    let awkward = [0.1 + 0.2, -1.0 / 3.0, 1e-17, 0.7071067811865476, -0.123456789012345678];
    for (i, v) in awkward.iter().enumerate() {
        brain.set_value(Fingerprint((i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)), *v, i as u32 + 1);
    }
    brain.save().unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), brain.len());
    for (fp, stats) in brain.positions() {
        let (v, n) = loaded.value_of(*fp);
        assert_eq!(v.to_bits(), stats.value.to_bits());
        assert_eq!(n, stats.visits);
    }
}

#[test]
fn finished_games_are_saved_with_periodic_backups() {
    let dir = tempfile::tempdir().unwrap();
    let store = BrainStore::new(dir.path().join("brain.json"));
    let config = Config::default();
    let mut brain = Brain::open(config.brain, store.clone());
    for i in 0..10 {
        let mut game = Game::new(&mut brain, &config);
        game.set_ai_color(Some(Color::Black));
        game.forfeit_on_time(if i % 2 == 0 { Color::White } else { Color::Black }).unwrap();
    }
    assert!(!brain.is_dirty());
    assert!(store.backup_path(10).exists());
    assert!(!store.backup_path(5).exists());

    let reopened = Brain::open(BrainConfig::default(), store.clone());
    assert_eq!(reopened.games_played(), 10);
    assert_eq!(reopened.stats().ai_wins, 5);

    let summary = store.read_summary().unwrap();
    assert_eq!(summary.games, 10);
    assert_eq!(summary.positions_learned, 1);
    assert_eq!(summary.ai_win_rate, 50.0);
}

#[test]
fn missing_store_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let brain = Brain::open(BrainConfig::default(), BrainStore::new(dir.path().join("nothing.json")));
    assert!(brain.is_empty());
    assert_eq!(brain.games_played(), 0);
}

#[test]
fn stored_hyperparameters_win_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = BrainStore::new(dir.path().join("brain.json"));
    let tuned = BrainConfig { learning_rate: 0.05, ..BrainConfig::default() };
    let mut brain = Brain::open(tuned, store.clone());
    brain.set_value(Fingerprint(1), 0.5, 1);
    brain.save().unwrap();
    let reopened = Brain::open(BrainConfig::default(), store);
    assert_eq!(reopened.config().learning_rate, 0.05);
}

#[test]
fn failed_save_keeps_the_brain_dirty_until_the_next_game() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();
    let store = BrainStore::new(blocker.join("brain.json"));
    let config = Config::default();
    let mut brain = Brain::open(config.brain, store.clone());

    let mut game = Game::new(&mut brain, &config);
    game.forfeit_on_time(Color::White).unwrap();
    assert!(game.is_over());
    assert!(game.learning_report().is_some());
    drop(game);
    assert!(brain.is_dirty());
    assert!(!store.path().exists());

    std::fs::remove_file(&blocker).unwrap();
    let mut game = Game::new(&mut brain, &config);
    game.forfeit_on_time(Color::Black).unwrap();
    drop(game);
    assert!(!brain.is_dirty());
    assert!(store.path().exists());

    let reopened = Brain::open(BrainConfig::default(), store);
    assert_eq!(reopened.games_played(), 2);
}
