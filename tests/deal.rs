//! Integration tests for dealing: fairness order, tier filtering and court locks.

use court_rotation_web::{
    deal, DealMode, Player, Rank, RotationError, Session, COURT_COUNT, PLAYERS_PER_COURT,
};

fn player(name: &str, rank: Rank, play_count: u32) -> Player {
    Player::with_play_count(name, rank, play_count)
}

fn session_with(players: &[(&str, Rank, u32)]) -> Session {
    Session::with_players(
        players
            .iter()
            .map(|(name, rank, pc)| player(name, *rank, *pc))
            .collect(),
    )
}

fn names(players: &[Player]) -> Vec<&str> {
    players.iter().map(|p| p.name.as_str()).collect()
}

fn total_players(s: &Session) -> usize {
    s.queue.len() + s.courts.iter().map(Vec::len).sum::<usize>()
}

fn assert_full_or_empty(s: &Session) {
    for court in &s.courts {
        assert!(court.is_empty() || court.len() == PLAYERS_PER_COURT);
    }
}

#[test]
fn deal_orders_by_play_count_then_arrival() {
    use Rank::Beginner as B;
    let mut s = session_with(&[("A", B, 0), ("B", B, 0), ("C", B, 1), ("D", B, 0), ("E", B, 2)]);

    assert_eq!(deal(&mut s, DealMode::All), Ok(1));

    assert_eq!(names(&s.courts[0]), vec!["A", "B", "D", "C"]);
    assert_eq!(names(&s.queue), vec!["E"]);
    for court in &s.courts[1..] {
        assert!(court.is_empty());
    }
    for p in &s.courts[0] {
        assert!(p.in_game);
        assert_eq!(p.last_court, Some(0));
    }
    assert!(s.court_filled_at[0].is_some());
    assert!(s.court_filled_at[1].is_none());
}

#[test]
fn deal_never_skips_a_lower_play_count() {
    let counts = [3, 0, 2, 1, 0, 4, 1, 2, 5, 0];
    let players: Vec<Player> = counts
        .iter()
        .enumerate()
        .map(|(i, pc)| player(&format!("P{i}"), Rank::Beginner, *pc))
        .collect();
    let mut s = Session::with_players(players);

    assert_eq!(deal(&mut s, DealMode::All), Ok(2));

    let max_dealt = s.courts.iter().flatten().map(|p| p.play_count).max().unwrap();
    let min_waiting = s.queue.iter().map(|p| p.play_count).min().unwrap();
    assert!(max_dealt <= min_waiting);
    assert_eq!(names(&s.queue), vec!["P5", "P8"]);
    assert_eq!(total_players(&s), counts.len());
    assert_full_or_empty(&s);
}

#[test]
fn deal_fills_courts_in_index_order_and_leaves_remainder_queued() {
    let players: Vec<Player> = (0..6)
        .map(|i| player(&format!("P{i}"), Rank::Beginner, 0))
        .collect();
    let mut s = Session::with_players(players);

    assert_eq!(deal(&mut s, DealMode::All), Ok(1));
    assert_eq!(s.courts[0].len(), 4);
    assert_eq!(names(&s.queue), vec!["P4", "P5"]);
    assert_full_or_empty(&s);
}

#[test]
fn deal_requires_four_players() {
    let mut s = session_with(&[("A", Rank::Beginner, 0), ("B", Rank::Beginner, 0), ("C", Rank::Intermediate, 0)]);
    assert_eq!(
        deal(&mut s, DealMode::All),
        Err(RotationError::InsufficientPlayers {
            required: 4,
            tier: None
        })
    );
    assert_eq!(s.queue.len(), 3);
}

#[test]
fn tier_deal_only_takes_that_rank() {
    use Rank::{Beginner as B, Intermediate as I};
    let mut s = session_with(&[
        ("B1", B, 0),
        ("I1", I, 1),
        ("B2", B, 0),
        ("I2", I, 0),
        ("I3", I, 2),
        ("B3", B, 0),
        ("I4", I, 0),
    ]);

    assert_eq!(deal(&mut s, DealMode::Tier(I)), Ok(1));

    assert_eq!(names(&s.courts[0]), vec!["I2", "I4", "I1", "I3"]);
    assert_eq!(names(&s.queue), vec!["B1", "B2", "B3"]);
}

#[test]
fn tier_deal_reports_tier_when_short() {
    use Rank::{Beginner as B, Intermediate as I};
    let mut s = session_with(&[("B1", B, 0), ("B2", B, 0), ("I1", I, 0), ("B3", B, 0), ("I2", I, 0)]);

    let err = deal(&mut s, DealMode::Tier(I)).unwrap_err();
    assert_eq!(
        err,
        RotationError::InsufficientPlayers {
            required: 4,
            tier: Some(I)
        }
    );
    assert!(err.to_string().contains("Intermediate"));
    assert!(s.courts.iter().all(Vec::is_empty));
}

#[test]
fn deal_skips_locked_courts() {
    let players: Vec<Player> = (0..12)
        .map(|i| player(&format!("P{i}"), Rank::Beginner, 0))
        .collect();
    let mut s = Session::with_players(players);
    s.toggle_lock(0).unwrap();
    s.toggle_lock(2).unwrap();

    assert_eq!(deal(&mut s, DealMode::All), Ok(2));

    assert!(s.courts[0].is_empty());
    assert!(s.courts[2].is_empty());
    assert_eq!(names(&s.courts[1]), vec!["P0", "P1", "P2", "P3"]);
    assert_eq!(names(&s.courts[3]), vec!["P4", "P5", "P6", "P7"]);
    assert_eq!(s.queue.len(), 4);
}

#[test]
fn deal_fails_when_every_court_is_full_or_locked() {
    let players: Vec<Player> = (0..20)
        .map(|i| player(&format!("P{i}"), Rank::Beginner, 0))
        .collect();
    let mut s = Session::with_players(players);
    s.toggle_lock(3).unwrap();

    assert_eq!(deal(&mut s, DealMode::All), Ok(COURT_COUNT - 1));
    let before = s.snapshot();

    assert_eq!(deal(&mut s, DealMode::All), Err(RotationError::NoCourtsAvailable));
    assert_eq!(s.snapshot(), before);
}

#[test]
fn locked_court_keeps_its_players_across_deals() {
    let players: Vec<Player> = (0..8)
        .map(|i| player(&format!("P{i}"), Rank::Beginner, 0))
        .collect();
    let mut s = Session::with_players(players);
    deal(&mut s, DealMode::All).unwrap();
    let court_0 = s.courts[0].clone();
    s.toggle_lock(0).unwrap();

    for i in 8..12 {
        s.add_player(&format!("P{i}"), Some(Rank::Beginner)).unwrap();
    }
    assert_eq!(deal(&mut s, DealMode::All), Ok(1));
    assert_eq!(s.courts[0], court_0);
    assert_eq!(names(&s.courts[2]), vec!["P8", "P9", "P10", "P11"]);
}
