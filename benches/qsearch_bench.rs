use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pawnstorm::search::{SearchContext, SearchControl};
use pawnstorm::search::eval::INFINITY;
use pawnstorm::Position;

fn bench_qsearch(c: &mut Criterion) {
    // Lots of mutual captures around e4/d5
    let tactical = Position::from_fen("r2qkb1r/ppp2ppp/2n1bn2/3pp3/3PP3/2N1BN2/PPP2PPP/R2QKB1R w KQkq - 0 6").unwrap();
    for (name, root) in [("qsearch_startpos", Position::startpos()), ("qsearch_tactical", tactical)] {
        c.bench_function(name, |ben| {
            let control = SearchControl::new();
            ben.iter(|| {
                let mut pos = root.clone();
                let mut ctx = SearchContext::new(&mut pos, None, &control);
                black_box(ctx.quiescence(-INFINITY, INFINITY))
            })
        });
    }
}

criterion_group!(benches, bench_qsearch);
criterion_main!(benches);
