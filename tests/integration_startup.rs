//! Integration test to ensure a session can start up without errors.

use descent::{DescentResult, GameSession, GameSettings, GameStatus, InputMode, Intent, Tile};

#[test]
fn test_basic_startup() -> DescentResult<()> {
    let mut session = GameSession::new(42, GameSettings::default())?;

    assert_eq!(session.status(), GameStatus::Title);
    assert_eq!(session.floor_index(), 1);
    assert_eq!(session.seed(), 42);
    assert!(session.combat.is_none());

    // The player starts on the up stairs of floor 1 with full health.
    let snapshot = session.snapshot();
    assert_eq!(snapshot.player.hp, 100);
    assert_eq!(
        snapshot.grid.get(snapshot.player.position),
        Some(Tile::StairsUp)
    );

    session.step([Intent::StartNewGame])?;
    assert_eq!(session.input_mode(), InputMode::Exploring);
    assert_eq!(
        session.drain_events(),
        vec![descent::GameEvent::NewGame { seed: 42 }]
    );
    Ok(())
}

#[test]
fn test_settings_template_round_trip() -> DescentResult<()> {
    let json = GameSettings::default().to_json_pretty()?;
    let parsed = GameSettings::from_json(&json)?;
    assert_eq!(parsed, GameSettings::default());
    Ok(())
}

#[test]
fn test_settings_file_drives_session() -> DescentResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{ "combat": { "player_max_hp": 250 }, "generation": { "weak_enemies": 0 } }"#,
    )?;

    let settings = GameSettings::from_json_file(&path)?;
    let session = GameSession::new(3, settings)?;
    assert_eq!(session.world.player.max_hp, 250);
    assert!(session.world.floor.roaming.is_empty());
    Ok(())
}

#[test]
fn test_same_seed_same_session() -> DescentResult<()> {
    let script = [
        Intent::StartNewGame,
        Intent::Move(descent::Direction::East),
        Intent::Move(descent::Direction::South),
        Intent::Move(descent::Direction::West),
    ];

    let mut a = GameSession::new(1234, GameSettings::default())?;
    let mut b = GameSession::new(1234, GameSettings::default())?;
    for intent in script {
        a.step([intent])?;
        b.step([intent])?;
    }
    for _ in 0..300 {
        a.tick()?;
        b.tick()?;
    }
    assert_eq!(a.snapshot(), b.snapshot());
    Ok(())
}
