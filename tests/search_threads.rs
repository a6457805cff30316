use pawnstorm::search::{iterative_deepening, search_parallel, SearchControl, SearchParams, TranspositionTable};
use pawnstorm::Position;

const FENS: &[&str] = &[
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
];

#[test]
fn parallel_root_agrees_with_single_thread() {
    let control = SearchControl::new();
    for fen in FENS {
        let mut pos = Position::from_fen(fen).unwrap();
        let mut tt = TranspositionTable::with_capacity_entries(1 << 16);
        let single = iterative_deepening(&mut pos, Some(&mut tt), &control, &SearchParams::fixed_depth(3), None).unwrap();
        let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let parallel = pool.install(|| search_parallel(&pos, 3, &control, Some(4))).unwrap();
        assert_eq!(single.score, parallel.score, "{fen}");
        assert_eq!(parallel.depth, 3);
        assert!(pos.legal_moves().contains(&parallel.best_move.unwrap()));
    }
}

#[test]
fn stopped_fan_out_still_returns_a_move() {
    let pos = Position::startpos();
    let control = SearchControl::new();
    control.stop();
    let res = search_parallel(&pos, 5, &control, None).unwrap();
    assert_eq!(res.depth, 0);
    assert!(pos.legal_moves().contains(&res.best_move.unwrap()));
}

#[test]
fn fan_out_without_tables_gives_same_score() {
    let control = SearchControl::new();
    let pos = Position::from_fen(FENS[0]).unwrap();
    let pool = rayon::ThreadPoolBuilder::new().num_threads(2).build().unwrap();
    let with_tables = pool.install(|| search_parallel(&pos, 3, &control, Some(4))).unwrap();
    let without = pool.install(|| search_parallel(&pos, 3, &control, None)).unwrap();
    assert_eq!(with_tables.score, without.score);
    assert_eq!(without.depth, 3);
}
