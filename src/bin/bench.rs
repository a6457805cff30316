use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

use pawnstorm::uci::format_score;
use pawnstorm::{Engine, EngineConfig, Position};

// Opening, middlegame and endgame positions with some tactics in each.
const SUITE: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "r2qkb1r/ppp2ppp/2n1bn2/3pp3/3PP3/2N1BN2/PPP2PPP/R2QKB1R w KQkq - 0 6",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
    "6k1/5ppp/8/8/8/8/8/R5K1 w - - 0 1",
    "4k3/8/8/3q4/8/8/3R4/3K4 w - - 0 1",
];

#[derive(Parser, Debug)]
#[command(name = "pawnstorm-bench", version, about = "Run the search over a fixed suite and report nodes per second")]
struct Args {
    /// Single FEN (or 'startpos') instead of the built-in suite
    #[arg(long)]
    fen: Option<String>,

    /// Fixed search depth
    #[arg(long, default_value_t = 5)]
    depth: u32,

    /// Movetime in milliseconds (replaces the depth limit when set)
    #[arg(long)]
    movetime: Option<u64>,

    /// Threads
    #[arg(long, default_value_t = 1)]
    threads: usize,

    /// Transposition table size in MB
    #[arg(long, default_value_t = 16)]
    hash_mb: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let fens: Vec<String> = match args.fen.as_deref() {
        Some("startpos") => vec![SUITE[0].to_string()],
        Some(f) => vec![f.to_string()],
        None => SUITE.iter().map(|s| s.to_string()).collect(),
    };
    let positions = fens.iter().map(|f| Position::from_fen(f)).collect::<Result<Vec<_>, _>>()?;

    let cfg = EngineConfig {
        depth: if args.movetime.is_some() { None } else { Some(args.depth.max(1)) },
        movetime_ms: args.movetime,
        hash_mb: args.hash_mb,
        threads: args.threads,
    };
    cfg.validate()?;
    let mut engine = Engine::new(&cfg);

    let progress = ProgressBar::new(positions.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?,
    );

    let mut total_nodes = 0u64;
    let t0 = Instant::now();
    for pos in positions {
        engine.reset_state()?;
        let root = pos.clone();
        let res = engine.search(pos)?;
        total_nodes += res.nodes;
        let best = res.best_move.map(|m| root.uci_move(m)).unwrap_or_else(|| "0000".to_string());
        progress.println(format!(
            "{}  bestmove={} score={} depth={} nodes={}",
            root.fen(),
            best,
            format_score(res.score),
            res.depth,
            res.nodes
        ));
        progress.set_message(format!("{total_nodes} nodes"));
        progress.inc(1);
    }
    progress.finish_and_clear();

    let dt = t0.elapsed().as_secs_f64();
    let nps = if dt > 0.0 { total_nodes as f64 / dt } else { 0.0 };
    println!("total nodes={} elapsed={:.3}s nps={:.1}", total_nodes, dt, nps);
    Ok(())
}
