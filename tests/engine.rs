use pawnstorm::search::{IterationReport, Reporter};
use pawnstorm::{Engine, EngineConfig, EngineError, Position, Terminal};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[test]
fn startpos_depth_three_returns_a_legal_move() {
    let mut engine = Engine::default();
    engine.configure(Some(3), None);
    let res = engine.search(Position::startpos()).unwrap();
    assert_eq!(res.depth, 3);
    assert!(Position::startpos().legal_moves().contains(&res.best_move.unwrap()));
    assert!(res.nodes > 20);
}

#[test]
fn single_legal_move_ignores_limits() {
    let mut engine = Engine::default();
    engine.configure(Some(10), None);
    let pos = Position::from_fen("R6k/8/5K2/8/8/8/8/8 b - - 0 1").unwrap();
    let res = engine.search(pos.clone()).unwrap();
    assert_eq!(res.depth, 1);
    assert_eq!(pos.uci_move(res.best_move.unwrap()), "h8h7");
}

#[test]
fn stalemate_is_reported() {
    let mut engine = Engine::default();
    let pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
    match engine.start_search(pos) {
        Err(EngineError::NoLegalMoves(t)) => assert_eq!(t, Terminal::Stalemate),
        other => panic!("expected stalemate, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn movetime_search_returns_promptly() {
    let mut engine = Engine::default();
    engine.configure(None, Some(50));
    let t0 = Instant::now();
    let res = engine.search(Position::startpos()).unwrap();
    assert!(t0.elapsed() < Duration::from_secs(2));
    assert!(res.best_move.is_some());
}

#[test]
fn reporter_receives_iterations() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let reporter: Reporter = Arc::new(move |r: &IterationReport| sink.lock().unwrap().push((r.depth, r.pv.len())));
    let mut engine = Engine::default();
    engine.set_reporter(Some(reporter));
    engine.configure(Some(2), None);
    engine.search(Position::startpos()).unwrap();
    let seen = seen.lock().unwrap();
    assert_eq!(seen.iter().map(|r| r.0).collect::<Vec<_>>(), vec![1, 2]);
    assert!(seen.iter().all(|r| r.1 >= 1));
}

#[test]
fn reset_and_resize_between_searches() {
    let mut engine = Engine::new(&EngineConfig { depth: Some(2), ..EngineConfig::default() });
    let first = engine.search(Position::startpos()).unwrap();
    engine.reset_state().unwrap();
    engine.set_hash_mb(1).unwrap();
    assert_eq!(engine.hash_mb(), 1);
    let second = engine.search(Position::startpos()).unwrap();
    assert_eq!(first.score, second.score);
}

#[test]
fn threads_setting_uses_fan_out() {
    let mut engine = Engine::new(&EngineConfig { depth: Some(2), threads: 2, ..EngineConfig::default() });
    let res = engine.search(Position::startpos()).unwrap();
    assert_eq!(res.depth, 2);
    assert!(Position::startpos().legal_moves().contains(&res.best_move.unwrap()));
}
