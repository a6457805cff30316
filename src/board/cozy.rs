use cozy_chess::{Board as CozyBoard, Color, File, Move, Piece, Square};
use std::fmt;

use crate::error::EngineError;
use crate::search::zobrist;

/// Why a position has no legal moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Terminal {
    Checkmate,
    Stalemate,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Terminal::Checkmate => write!(f, "checkmate"),
            Terminal::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// Mutable game position with make/unmake over a cozy-chess board.
///
/// Every `make_move` pushes the previous board so `unmake_move` restores it
/// exactly; the search relies on that pairing on every exit path.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    history: Vec<CozyBoard>,
}

impl Default for Position {
    fn default() -> Self { Self::startpos() }
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: CozyBoard::default(), history: Vec::with_capacity(128) }
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        CozyBoard::from_fen(fen.trim(), false)
            .map(|b| Self { board: b, history: Vec::with_capacity(128) })
            .map_err(|e| EngineError::InvalidPosition(format!("{fen:?}: {e:?}")))
    }

    pub fn from_start_and_moves(moves: &[String]) -> Result<Self, EngineError> {
        let mut pos = Self::startpos();
        for m in moves { pos.play_uci(m)?; }
        Ok(pos)
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    pub fn fingerprint(&self) -> u64 { zobrist::compute(&self.board) }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }

    /// Number of moves made on this position that can still be unmade.
    pub fn ply(&self) -> usize { self.history.len() }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.board.generate_moves(|ml| { moves.extend(ml); false });
        moves
    }

    pub fn has_legal_moves(&self) -> bool {
        self.board.generate_moves(|ml| !ml.is_empty())
    }

    /// Checkmate or stalemate when the side to move has nothing to play.
    pub fn terminal(&self) -> Option<Terminal> {
        if self.has_legal_moves() { return None; }
        if self.in_check() { Some(Terminal::Checkmate) } else { Some(Terminal::Stalemate) }
    }

    pub fn make_move(&mut self, mv: Move) {
        self.history.push(self.board.clone());
        self.board.play_unchecked(mv);
    }

    pub fn unmake_move(&mut self) {
        if let Some(prev) = self.history.pop() { self.board = prev; }
    }

    pub fn piece_on(&self, sq: Square) -> Option<(Color, Piece)> {
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((color, piece))
    }

    /// Piece removed by `mv`, including the pawn taken en passant.
    pub fn captured_piece(&self, mv: Move) -> Option<Piece> {
        let them = !self.board.side_to_move();
        if self.board.colors(them).has(mv.to) { return self.board.piece_on(mv.to); }
        let moved = self.board.piece_on(mv.from)?;
        if moved == Piece::Pawn && mv.from.file() != mv.to.file() { return Some(Piece::Pawn); }
        None
    }

    pub fn is_capture(&self, mv: Move) -> bool { self.captured_piece(mv).is_some() }

    /// Legal captures by the side to move that land on `sq`, with the moving piece.
    pub fn attackers_to(&self, sq: Square) -> Vec<(Piece, Move)> {
        let mut out = Vec::new();
        if !self.board.colors(!self.board.side_to_move()).has(sq) { return out; }
        self.board.generate_moves(|ml| {
            if ml.to.has(sq) {
                let piece = ml.piece;
                for mv in ml { if mv.to == sq { out.push((piece, mv)); } }
            }
            false
        });
        out
    }

    /// Standard coordinate notation; castling is printed as the king's two-square hop.
    pub fn uci_move(&self, mv: Move) -> String {
        let is_castle = self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.colors(self.board.side_to_move()).has(mv.to);
        if is_castle {
            let file = if (mv.to.file() as u8) > (mv.from.file() as u8) { File::G } else { File::C };
            let to = Square::new(file, mv.from.rank());
            return format!("{}{}", mv.from, to);
        }
        format!("{}", mv)
    }

    pub fn parse_uci_move(&self, s: &str) -> Result<Move, EngineError> {
        let s = s.trim();
        self.legal_moves()
            .into_iter()
            .find(|&m| self.uci_move(m) == s)
            .ok_or_else(|| EngineError::IllegalMove(s.to_string()))
    }

    pub fn play_uci(&mut self, s: &str) -> Result<(), EngineError> {
        let mv = self.parse_uci_move(s)?;
        self.board.play_unchecked(mv);
        Ok(())
    }

    /// Renders a line of moves starting from this position.
    pub fn uci_line(&self, line: &[Move]) -> Vec<String> {
        let mut pos = self.clone();
        let mut out = Vec::with_capacity(line.len());
        for &mv in line {
            out.push(pos.uci_move(mv));
            pos.make_move(mv);
        }
        out
    }

    pub fn fen(&self) -> String { format!("{}", self.board) }
}
