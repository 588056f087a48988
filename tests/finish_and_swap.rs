//! Integration tests for finishing games and swapping a single court player.

use court_rotation_web::{
    deal, finish_game, swap_player, DealMode, Player, PlayerId, Rank, RotationError, Session,
};
use std::collections::BTreeSet;

fn session_with_court_0(extra_waiting: &[(&str, u32)]) -> Session {
    let players: Vec<Player> = ["A", "B", "C", "D"]
        .iter()
        .map(|name| Player::new(*name, Rank::Beginner))
        .collect();
    let mut s = Session::with_players(players);
    deal(&mut s, DealMode::All).unwrap();
    for (name, pc) in extra_waiting {
        s.queue
            .push(Player::with_play_count(*name, Rank::Beginner, *pc));
    }
    s
}

fn names(players: &[Player]) -> Vec<&str> {
    players.iter().map(|p| p.name.as_str()).collect()
}

fn id_of(s: &Session, name: &str) -> PlayerId {
    s.all_players().find(|p| p.name == name).unwrap().id
}

#[test]
fn finish_returns_players_to_queue_tail_in_slot_order() {
    let players: Vec<Player> = ["W1", "W2", "W3", "W4", "A", "B", "C", "D"]
        .iter()
        .map(|name| Player::new(*name, Rank::Beginner))
        .collect();
    let mut s = Session::with_players(players);
    deal(&mut s, DealMode::All).unwrap();
    assert_eq!(names(&s.courts[1]), vec!["A", "B", "C", "D"]);
    s.queue.push(Player::new("Z", Rank::Intermediate));
    let court_ids: Vec<PlayerId> = s.courts[1].iter().map(|p| p.id).collect();

    finish_game(&mut s, 1).unwrap();

    assert!(s.courts[1].is_empty());
    assert!(s.court_filled_at[1].is_none());
    assert_eq!(names(&s.queue), vec!["Z", "A", "B", "C", "D"]);
    for p in &s.queue[1..] {
        assert_eq!(p.play_count, 1);
        assert!(p.played);
        assert!(!p.in_game);
        assert_eq!(p.last_court, Some(1));
        let expected: BTreeSet<PlayerId> =
            court_ids.iter().copied().filter(|id| *id != p.id).collect();
        assert_eq!(p.last_partners, expected);
    }
    // Court 0 untouched
    assert_eq!(names(&s.courts[0]), vec!["W1", "W2", "W3", "W4"]);
    assert_eq!(s.queue[0].play_count, 0);
}

#[test]
fn finish_overwrites_previous_partners() {
    let mut s = session_with_court_0(&[]);
    finish_game(&mut s, 0).unwrap();
    s.queue.swap(0, 3);
    s.add_player("E", Some(Rank::Beginner)).unwrap();
    // Queue: D, B, C, A, E - all but E have one game, so E goes first.
    deal(&mut s, DealMode::All).unwrap();
    assert_eq!(names(&s.courts[0]), vec!["E", "D", "B", "C"]);

    finish_game(&mut s, 0).unwrap();

    let d = s.queue.iter().find(|p| p.name == "D").unwrap();
    assert_eq!(d.play_count, 2);
    let expected: BTreeSet<PlayerId> = ["E", "B", "C"].iter().map(|n| id_of(&s, n)).collect();
    assert_eq!(d.last_partners, expected);
}

#[test]
fn finish_on_empty_court_changes_nothing() {
    let mut s = session_with_court_0(&[("X", 0)]);
    let before = s.snapshot();

    finish_game(&mut s, 2).unwrap();

    assert_eq!(s.snapshot(), before);
}

#[test]
fn finish_rejects_unknown_court() {
    let mut s = Session::new();
    assert_eq!(finish_game(&mut s, 4), Err(RotationError::InvalidCourt(4)));
}

#[test]
fn swap_brings_in_lowest_play_count_in_same_slot() {
    let mut s = session_with_court_0(&[("X", 3), ("Y", 0)]);
    let a = id_of(&s, "A");
    let y = id_of(&s, "Y");

    assert_eq!(swap_player(&mut s, 0, a), Ok(Some(y)));

    assert_eq!(names(&s.courts[0]), vec!["Y", "B", "C", "D"]);
    assert_eq!(names(&s.queue), vec!["A", "X"]);

    let incoming = &s.courts[0][0];
    assert!(incoming.in_game);
    assert_eq!(incoming.last_court, Some(0));
    assert_eq!(incoming.play_count, 0);

    let outgoing = &s.queue[0];
    assert!(!outgoing.in_game);
    assert_eq!(outgoing.last_court, None);
    assert_eq!(outgoing.play_count, 0);
}

#[test]
fn swap_breaks_ties_by_queue_position() {
    let mut s = session_with_court_0(&[("X", 1), ("Y", 1), ("Z", 2)]);
    let c = id_of(&s, "C");

    swap_player(&mut s, 0, c).unwrap();

    assert_eq!(names(&s.courts[0]), vec!["A", "B", "X", "D"]);
    assert_eq!(names(&s.queue), vec!["C", "Y", "Z"]);
}

#[test]
fn swap_without_standby_players_fails() {
    let mut s = session_with_court_0(&[]);
    let a = id_of(&s, "A");
    let before = s.snapshot();

    assert_eq!(swap_player(&mut s, 0, a), Err(RotationError::NoStandbyPlayers));
    assert_eq!(s.snapshot(), before);
}

#[test]
fn swap_of_player_not_on_court_is_noop() {
    let mut s = session_with_court_0(&[("X", 0)]);
    let x = id_of(&s, "X");
    let before = s.snapshot();

    assert_eq!(swap_player(&mut s, 0, x), Ok(None));
    assert_eq!(swap_player(&mut s, 1, x), Ok(None));
    assert_eq!(s.snapshot(), before);
}

#[test]
fn swap_ignores_court_lock() {
    let mut s = session_with_court_0(&[("X", 0)]);
    s.toggle_lock(0).unwrap();
    let b = id_of(&s, "B");

    swap_player(&mut s, 0, b).unwrap();

    assert_eq!(names(&s.courts[0]), vec!["A", "X", "C", "D"]);
    assert!(s.locks[0]);
}

#[test]
fn rotation_conserves_players_and_keeps_courts_full_or_empty() {
    let players: Vec<Player> = (0..11)
        .map(|i| Player::new(format!("P{i}"), Rank::Beginner))
        .collect();
    let mut s = Session::with_players(players);
    let check = |s: &Session| {
        let total = s.queue.len() + s.courts.iter().map(Vec::len).sum::<usize>();
        assert_eq!(total, 11);
        assert!(s.courts.iter().all(|c| c.is_empty() || c.len() == 4));
    };

    deal(&mut s, DealMode::All).unwrap();
    check(&s);
    let outgoing = s.courts[1][2].id;
    swap_player(&mut s, 1, outgoing).unwrap();
    check(&s);
    finish_game(&mut s, 0).unwrap();
    check(&s);
    deal(&mut s, DealMode::All).unwrap();
    check(&s);
    finish_game(&mut s, 1).unwrap();
    finish_game(&mut s, 0).unwrap();
    check(&s);
    assert!(s.courts.iter().all(Vec::is_empty));
    assert!(s.queue.iter().all(|p| !p.in_game));
}
