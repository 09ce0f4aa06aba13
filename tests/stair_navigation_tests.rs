//! Integration tests for walking the stairs between floors.

use descent::{EnemyKind, GameSession, GameSettings, GameStatus, Intent, Position, Tile};

fn started(seed: i64) -> GameSession {
    let mut session = GameSession::new(seed, GameSettings::default()).expect("session");
    session.handle_intent(Intent::StartNewGame).expect("start");
    session
}

/// Puts the player on the down stairs and runs the transition tick. Any
/// encounter started by landing next to an enemy is dropped.
fn descend(session: &mut GameSession) {
    let stairs = session
        .world
        .floor
        .stairs_down
        .expect("floor should have stairs down");
    session.world.player.position = stairs;
    session.tick().expect("tick");
    session.combat = None;
}

#[test]
fn test_descend_to_boss_floor() {
    let mut session = started(98765);

    for expected in 2..=5 {
        descend(&mut session);
        assert_eq!(session.floor_index(), expected);

        let floor = &session.world.floor;
        let player = session.world.player.position;
        assert_ne!(Some(player), floor.stairs_up, "player should be nudged off the stairs");
        assert!(floor.grid.get(player).is_some_and(|t| t.is_passable()));
    }

    let floor = &session.world.floor;
    assert!(floor.stairs_down.is_none());
    assert_eq!(floor.grid.count(Tile::StairsDown), 0);
    assert_eq!(
        floor.boss.as_ref().map(|b| b.kind),
        Some(EnemyKind::Boss)
    );
    // Health carries over between floors.
    assert_eq!(session.world.player.max_hp, 100);
}

#[test]
fn test_climb_back_rebuilds_same_floor() {
    let mut session = started(555);
    descend(&mut session);
    let floor_two = session.world.floor.grid.clone();

    descend(&mut session);
    assert_eq!(session.floor_index(), 3);

    let up = session.world.floor.stairs_up.expect("stairs up");
    session.world.player.position = up;
    session.tick().unwrap();
    session.combat = None;

    assert_eq!(session.floor_index(), 2);
    assert_eq!(session.world.floor.grid, floor_two);
    // Arriving from below places the player next to the down stairs.
    let down = session.world.floor.stairs_down.expect("stairs down");
    assert_eq!(session.world.player.position.manhattan_distance(down), 1);
}

#[test]
fn test_nothing_happens_while_typing_a_seed() {
    let mut session = started(42);
    session.handle_intent(Intent::EnterSeedEdit).unwrap();

    let stairs = session.world.floor.stairs_down.expect("stairs down");
    session.world.player.position = stairs;
    session.tick().unwrap();
    assert_eq!(session.floor_index(), 1);

    session.handle_intent(Intent::CancelSeedEdit).unwrap();
    session.tick().unwrap();
    assert_eq!(session.floor_index(), 2);
}

#[test]
fn test_boss_only_engages_on_anchor() {
    let mut settings = GameSettings::default();
    settings.generation.boss_floor = 1;
    let mut session = GameSession::new(42, settings).unwrap();
    session.handle_intent(Intent::StartNewGame).unwrap();

    let anchor = session.world.floor.boss.as_ref().expect("boss").position;
    assert!(session.world.floor.stairs_down.is_none());

    session.world.player.position = Position::new(anchor.x + 1, anchor.y + 1);
    session.tick().unwrap();
    assert!(session.combat.is_none());

    session.world.player.position = anchor;
    session.tick().unwrap();
    let combat = session.combat.as_ref().expect("boss fight");
    assert_eq!(combat.enemy_kind, EnemyKind::Boss);
    assert_eq!(combat.enemy_hp, 200);
}

#[test]
fn test_beating_boss_wins() {
    let mut settings = GameSettings::default();
    settings.generation.boss_floor = 1;
    let mut session = GameSession::new(42, settings).unwrap();
    session.handle_intent(Intent::StartNewGame).unwrap();

    let anchor = session.world.floor.boss.as_ref().expect("boss").position;
    session.world.player.position = anchor;
    session.tick().unwrap();
    session.combat.as_mut().expect("boss fight").enemy_hp = 1;

    session.handle_intent(Intent::Attack).unwrap();
    for _ in 0..40 {
        session.tick().unwrap();
    }
    session.handle_intent(Intent::Acknowledge).unwrap();

    assert_eq!(session.status(), GameStatus::Won);
    assert!(session.world.floor.boss.is_some());
    assert!(session
        .drain_events()
        .contains(&descent::GameEvent::GameWon));
}
