use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::io;
use std::path::PathBuf;

use pawnstorm::search::eval::is_mate_score;
use pawnstorm::uci::{self, format_score};
use pawnstorm::{Engine, EngineConfig, Position};

#[derive(Parser, Debug)]
#[command(name = "pawnstorm", version, about = "Alpha-beta chess engine (UCI on stdin/stdout by default)")]
struct Args {
    /// JSON config file; command-line flags override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Search this FEN once and print the result instead of speaking UCI
    #[arg(long, conflicts_with = "startpos")]
    fen: Option<String>,

    /// Search the initial position once and print the result
    #[arg(long)]
    startpos: bool,

    /// Depth limit in plies
    #[arg(long)]
    depth: Option<u32>,

    /// Time limit in milliseconds
    #[arg(long)]
    movetime: Option<u64>,

    /// Transposition table size in MB
    #[arg(long)]
    hash_mb: Option<usize>,

    /// Threads (>1 uses the fixed-depth root fan-out)
    #[arg(long)]
    threads: Option<usize>,
}

fn build_config(args: &Args) -> Result<EngineConfig> {
    let mut cfg = match &args.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if args.depth.is_some() { cfg.depth = args.depth; }
    if args.movetime.is_some() { cfg.movetime_ms = args.movetime; }
    if let Some(mb) = args.hash_mb { cfg.hash_mb = mb; }
    if let Some(t) = args.threads { cfg.threads = t; }
    cfg.validate()?;
    Ok(cfg)
}

fn search_once(pos: Position, cfg: &EngineConfig) -> Result<()> {
    let mut engine = Engine::new(cfg);
    if cfg.depth.is_none() && cfg.movetime_ms.is_none() {
        // A one-shot search needs some limit
        engine.configure(Some(6), None);
    }
    let root = pos.clone();
    let res = engine.search(pos)?;
    let best = res.best_move.map(|m| root.uci_move(m)).unwrap_or_else(|| "0000".to_string());
    println!(
        "bestmove={} score={} depth={} nodes={} pv={}",
        best,
        format_score(res.score),
        res.depth,
        res.nodes,
        root.uci_line(&res.pv).join(" ")
    );
    if is_mate_score(res.score) { info!("forced mate found"); }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let cfg = build_config(&args)?;

    if let Some(fen) = args.fen.as_deref() {
        return search_once(Position::from_fen(fen)?, &cfg);
    }
    if args.startpos {
        return search_once(Position::startpos(), &cfg);
    }

    info!("starting UCI loop (hash {} MB, threads {})", cfg.hash_mb, cfg.threads);
    let stdin = io::stdin();
    uci::run_loop(stdin.lock(), io::stdout(), cfg)?;
    Ok(())
}
