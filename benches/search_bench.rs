use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pawnstorm::search::{iterative_deepening, SearchControl, SearchParams, TranspositionTable};
use pawnstorm::Position;

const MIDDLEGAME: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

fn bench_search(c: &mut Criterion) {
    for (name, fen) in [("search_depth_4_startpos", None), ("search_depth_4_italian", Some(MIDDLEGAME))] {
        let root = match fen {
            Some(f) => Position::from_fen(f).unwrap(),
            None => Position::startpos(),
        };
        c.bench_function(name, |ben| {
            ben.iter(|| {
                let mut pos = root.clone();
                let mut tt = TranspositionTable::with_capacity_mb(16);
                let control = SearchControl::new();
                let r = iterative_deepening(black_box(&mut pos), Some(&mut tt), &control, &SearchParams::fixed_depth(4), None).unwrap();
                black_box(r.nodes)
            })
        });
    }
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
