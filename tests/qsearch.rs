use pawnstorm::search::eval::{evaluate, INFINITY};
use pawnstorm::search::{SearchContext, SearchControl};
use pawnstorm::Position;

fn qsearch(fen: &str) -> (i32, i32) {
    let mut pos = Position::from_fen(fen).unwrap();
    let stand = evaluate(pos.board());
    let control = SearchControl::new();
    let mut ctx = SearchContext::new(&mut pos, None, &control);
    (stand, ctx.quiescence(-INFINITY, INFINITY))
}

#[test]
fn qsearch_improves_tactical_position() {
    // Hanging queen vs bishop, Black to move
    let (stand, qs) = qsearch("4k3/8/8/8/5Q2/8/8/2b4K b - - 0 1");
    assert!(qs > stand, "qsearch should improve eval: qs {qs} vs stand {stand}");
}

#[test]
fn qsearch_equals_standpat_without_captures() {
    let (stand, qs) = qsearch("k7/8/8/8/8/8/8/7K w - - 0 1");
    assert_eq!(qs, stand);
}

#[test]
fn qsearch_never_below_stand_pat() {
    // Only capture available loses the queen
    let (stand, qs) = qsearch("4k3/8/4p3/3p4/8/8/8/3QK3 w - - 0 1");
    assert_eq!(qs, stand);
}

#[test]
fn fail_hard_window_clamps() {
    let mut pos = Position::from_fen("4k3/8/8/8/5Q2/8/8/2b4K b - - 0 1").unwrap();
    let control = SearchControl::new();
    let mut ctx = SearchContext::new(&mut pos, None, &control);
    assert_eq!(ctx.quiescence(-50, 50), 50);
    assert_eq!(ctx.quiescence(20_000, 20_100), 20_000);
}
