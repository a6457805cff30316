use cozy_chess::Color;
use log::{debug, info, warn};
use std::io::{BufRead, Write};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use crate::board::Position;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::EngineError;
use crate::search::eval::{is_mate_score, MATE_SCORE};
use crate::search::time::allot_movetime;
use crate::search::{IterationReport, Reporter};

const ENGINE_NAME: &str = concat!("PawnStorm ", env!("CARGO_PKG_VERSION"));

type Output<W> = Arc<Mutex<W>>;

fn emit<W: Write>(out: &Output<W>, line: &str) {
    let mut w = out.lock().unwrap_or_else(|p| p.into_inner());
    if let Err(e) = writeln!(w, "{line}").and_then(|_| w.flush()) {
        warn!("failed to write to GUI: {e}");
    }
}

/// `score cp N` or `score mate N` (moves, negative when getting mated).
pub fn format_score(score: i32) -> String {
    if is_mate_score(score) {
        let plies = MATE_SCORE - score.abs();
        let moves = (plies + 1) / 2;
        format!("mate {}", if score > 0 { moves } else { -moves })
    } else {
        format!("cp {score}")
    }
}

/// Depth used by a `go` that carries no limit at all and no configured default.
pub const DEFAULT_GO_DEPTH: u32 = 4;

/// Arguments of one `go` command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GoParams {
    pub depth: Option<u32>,
    pub movetime: Option<u64>,
    pub infinite: bool,
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u64>,
}

impl GoParams {
    pub fn parse(args: &str) -> Self {
        let mut go = Self::default();
        let mut tokens = args.split_whitespace();
        while let Some(tok) = tokens.next() {
            let slot = match tok {
                "infinite" => {
                    go.infinite = true;
                    continue;
                }
                "depth" => {
                    go.depth = tokens.next().and_then(|s| s.parse().ok());
                    continue;
                }
                "movetime" => &mut go.movetime,
                "wtime" => &mut go.wtime,
                "btime" => &mut go.btime,
                "winc" => &mut go.winc,
                "binc" => &mut go.binc,
                "movestogo" => &mut go.movestogo,
                _ => continue,
            };
            // Clocks can go negative in some GUIs; treat that as empty
            *slot = tokens.next().and_then(|s| s.parse::<i64>().ok()).map(|v| v.max(0) as u64);
        }
        go
    }

    /// Depth and time limits for the search. Explicit limits win, then the
    /// side to move's clock, then the configured defaults, then `DEFAULT_GO_DEPTH`.
    pub fn limits(&self, side: Color, defaults: &EngineConfig) -> (Option<u32>, Option<u64>) {
        if self.infinite { return (None, None); }
        if self.depth.is_some() || self.movetime.is_some() { return (self.depth, self.movetime); }
        let (clock, inc) = match side {
            Color::White => (self.wtime, self.winc),
            Color::Black => (self.btime, self.binc),
        };
        if let Some(time_ms) = clock {
            return (None, Some(allot_movetime(time_ms, inc.unwrap_or(0), self.movestogo)));
        }
        if defaults.depth.is_some() || defaults.movetime_ms.is_some() {
            return (defaults.depth, defaults.movetime_ms);
        }
        (Some(DEFAULT_GO_DEPTH), None)
    }
}

/// One UCI conversation: engine state, the current position and the search
/// currently running in the background (if any).
pub struct UciSession<W: Write + Send + 'static> {
    engine: Engine,
    defaults: EngineConfig,
    position: Position,
    out: Output<W>,
    pending: Option<JoinHandle<()>>,
}

impl<W: Write + Send + 'static> UciSession<W> {
    pub fn new(config: EngineConfig, out: W) -> Self {
        Self {
            engine: Engine::new(&config),
            defaults: config,
            position: Position::startpos(),
            out: Arc::new(Mutex::new(out)),
            pending: None,
        }
    }

    pub fn position(&self) -> &Position { &self.position }

    pub fn engine(&self) -> &Engine { &self.engine }

    /// Handles one input line; returns `false` once the session should end.
    pub fn handle_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match cmd {
            "" => {}
            "uci" => self.cmd_uci(),
            "isready" => emit(&self.out, "readyok"),
            "ucinewgame" => self.cmd_ucinewgame(),
            "setoption" => self.cmd_setoption(rest),
            "position" => {
                if let Err(e) = self.cmd_position(rest) { warn!("ignoring position command: {e}"); }
            }
            "go" => self.cmd_go(rest),
            "stop" => self.finish_pending(),
            "d" | "print" => emit(&self.out, &format!("info string fen {}", self.position.fen())),
            "quit" => {
                self.finish_pending();
                return false;
            }
            other => debug!("unknown command {other:?}"),
        }
        true
    }

    fn cmd_uci(&self) {
        emit(&self.out, &format!("id name {ENGINE_NAME}"));
        emit(&self.out, "id author PawnStorm developers");
        emit(&self.out, &format!("option name Hash type spin default {} min 1 max 4096", self.defaults.hash_mb));
        emit(&self.out, &format!("option name Threads type spin default {} min 1 max 256", self.defaults.threads));
        emit(&self.out, "uciok");
    }

    fn cmd_ucinewgame(&mut self) {
        self.finish_pending();
        self.position = Position::startpos();
        if let Err(e) = self.engine.reset_state() { warn!("could not clear state: {e}"); }
    }

    fn cmd_setoption(&mut self, args: &str) {
        // setoption name <id> value <x>
        let Some(rest) = args.strip_prefix("name") else { return };
        let (name, value) = match rest.split_once(" value ") {
            Some((n, v)) => (n.trim(), v.trim()),
            None => (rest.trim(), ""),
        };
        self.finish_pending();
        match name.to_ascii_lowercase().as_str() {
            "hash" => match value.parse::<usize>() {
                Ok(mb) => {
                    if let Err(e) = self.engine.set_hash_mb(mb) { warn!("Hash not applied: {e}"); }
                }
                Err(_) => warn!("bad Hash value {value:?}"),
            },
            "threads" => match value.parse::<usize>() {
                Ok(n) => self.engine.set_threads(n),
                Err(_) => warn!("bad Threads value {value:?}"),
            },
            _ => debug!("unsupported option {name:?}"),
        }
    }

    fn cmd_position(&mut self, args: &str) -> Result<(), EngineError> {
        let (base, moves) = match args.split_once("moves") {
            Some((b, m)) => (b.trim(), m.split_whitespace().collect::<Vec<_>>()),
            None => (args.trim(), Vec::new()),
        };
        let mut pos = if base == "startpos" {
            Position::startpos()
        } else if let Some(fen) = base.strip_prefix("fen") {
            Position::from_fen(fen.trim())?
        } else {
            return Err(EngineError::InvalidPosition(args.to_string()));
        };
        for m in moves { pos.play_uci(m)?; }
        self.position = pos;
        Ok(())
    }

    fn cmd_go(&mut self, args: &str) {
        self.finish_pending();

        let go = GoParams::parse(args);
        let (depth, movetime) = go.limits(self.position.side_to_move(), &self.defaults);
        debug!("go: depth {depth:?} movetime {movetime:?}");
        self.engine.configure(depth, movetime);

        let root = self.position.clone();
        let out = self.out.clone();
        let reporter: Reporter = Arc::new(move |r: &IterationReport| {
            let pv = root.uci_line(&r.pv).join(" ");
            emit(
                &out,
                &format!(
                    "info depth {} score {} nodes {} time {} pv {}",
                    r.depth,
                    format_score(r.score),
                    r.nodes,
                    r.elapsed.as_millis(),
                    pv
                ),
            );
        });
        self.engine.set_reporter(Some(reporter));

        let handle = match self.engine.start_search(self.position.clone()) {
            Ok(h) => h,
            Err(EngineError::NoLegalMoves(t)) => {
                info!("go on a finished game ({t})");
                emit(&self.out, "bestmove 0000");
                return;
            }
            Err(e) => {
                warn!("search not started: {e}");
                emit(&self.out, "bestmove 0000");
                return;
            }
        };

        let root = self.position.clone();
        let out = self.out.clone();
        let printer = thread::Builder::new().name("bestmove".into()).spawn(move || {
            let line = match handle.wait() {
                Ok(res) => match res.best_move {
                    Some(mv) => format!("bestmove {}", root.uci_move(mv)),
                    None => "bestmove 0000".to_string(),
                },
                Err(e) => {
                    warn!("search failed: {e}");
                    "bestmove 0000".to_string()
                }
            };
            emit(&out, &line);
        });
        match printer {
            Ok(h) => self.pending = Some(h),
            Err(e) => {
                warn!("could not spawn result thread: {e}");
                self.engine.request_stop();
            }
        }
    }

    // Stops the running search and waits until its bestmove has been printed.
    fn finish_pending(&mut self) {
        if let Some(h) = self.pending.take() {
            self.engine.request_stop();
            if h.join().is_err() { warn!("result thread panicked"); }
        }
    }
}

/// Reads commands until `quit` or end of input.
pub fn run_loop<R: BufRead, W: Write + Send + 'static>(input: R, output: W, config: EngineConfig) -> Result<(), EngineError> {
    let mut session = UciSession::new(config, output);
    for line in input.lines() {
        if !session.handle_line(&line?) { return Ok(()); }
    }
    session.finish_pending();
    Ok(())
}
