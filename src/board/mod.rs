//! Board representation with pure `apply` for search branching and an
//! in-place `make`/`unmake` pair for the live game board.

pub mod attacks;
pub mod fen;
pub mod moves;
pub mod types;

use std::fmt;

pub use moves::{Move, MoveKind, MoveRequest};
pub use types::{Color, Piece, PieceKind, Square};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// The four independent castling rights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        white_kingside: true,
        white_queenside: true,
        black_kingside: true,
        black_queenside: true,
    };

    pub const NONE: CastlingRights = CastlingRights {
        white_kingside: false,
        white_queenside: false,
        black_kingside: false,
        black_queenside: false,
    };

    pub fn kingside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_kingside,
            Color::Black => self.black_kingside,
        }
    }

    pub fn queenside(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_queenside,
            Color::Black => self.black_queenside,
        }
    }

    fn clear_color(&mut self, color: Color) {
        match color {
            Color::White => {
                self.white_kingside = false;
                self.white_queenside = false;
            }
            Color::Black => {
                self.black_kingside = false;
                self.black_queenside = false;
            }
        }
    }

    /// Drops the right tied to a rook home corner when anything moves from or to it.
    fn clear_corner(&mut self, sq: Square) {
        match (sq.file(), sq.rank()) {
            (0, 0) => self.white_queenside = false,
            (7, 0) => self.white_kingside = false,
            (0, 7) => self.black_queenside = false,
            (7, 7) => self.black_kingside = false,
            _ => {}
        }
    }

    /// Bit layout used by the fingerprint: WK, WQ, BK, BQ.
    pub fn bits(&self) -> u8 {
        (self.white_kingside as u8)
            | (self.white_queenside as u8) << 1
            | (self.black_kingside as u8) << 2
            | (self.black_queenside as u8) << 3
    }
}

/// State `unmake` needs that the move itself does not carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Undo {
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Board {
    squares: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    kings: [Square; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Board {
    pub(crate) fn empty() -> Self {
        Self {
            squares: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            kings: [Square::new(4, 0), Square::new(4, 7)],
        }
    }

    pub fn startpos() -> Self {
        let mut b = Self::empty();
        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (file, &kind) in back.iter().enumerate() {
            let f = file as u8;
            b.put(Square::new(f, 0), Piece::new(Color::White, kind));
            b.put(Square::new(f, 1), Piece::new(Color::White, PieceKind::Pawn));
            b.put(Square::new(f, 6), Piece::new(Color::Black, PieceKind::Pawn));
            b.put(Square::new(f, 7), Piece::new(Color::Black, kind));
        }
        b.castling = CastlingRights::ALL;
        b
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color { self.side_to_move }
    #[inline]
    pub fn castling(&self) -> CastlingRights { self.castling }
    #[inline]
    pub fn en_passant(&self) -> Option<Square> { self.en_passant }
    #[inline]
    pub fn halfmove_clock(&self) -> u32 { self.halfmove_clock }
    #[inline]
    pub fn fullmove_number(&self) -> u32 { self.fullmove_number }

    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        self.kings[color.index()]
    }

    /// Occupied squares with their pieces, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    pub fn in_check(&self) -> bool {
        let us = self.side_to_move;
        self.attacks_on(self.king_square(us), us.opposite())
    }

    /// Places a piece; only FEN construction and `make`/`unmake` go through here.
    pub(crate) fn put(&mut self, sq: Square, piece: Piece) {
        self.squares[sq.index()] = Some(piece);
        if piece.kind == PieceKind::King {
            self.kings[piece.color.index()] = sq;
        }
    }

    #[inline]
    fn take(&mut self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()].take()
    }

    /// Rook origin and destination squares for a castling move.
    fn castle_rook_squares(color: Color, kind: MoveKind) -> Option<(Square, Square)> {
        let r = color.home_rank();
        match kind {
            MoveKind::CastleKingside => Some((Square::new(7, r), Square::new(5, r))),
            MoveKind::CastleQueenside => Some((Square::new(0, r), Square::new(3, r))),
            _ => None,
        }
    }

    /// Returns the board after `mv`. No legality check.
    pub fn apply(&self, mv: Move) -> Board {
        let mut next = *self;
        next.make(mv);
        next
    }

    /// Applies `mv` in place and returns what `unmake` needs to revert it.
    pub fn make(&mut self, mv: Move) -> Undo {
        let undo = Undo {
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        };
        let color = mv.piece().color;

        self.take(mv.from());
        if mv.is_capture() {
            self.take(mv.capture_square());
        }
        let placed = match mv.kind() {
            MoveKind::Promotion(kind) => Piece::new(color, kind),
            _ => mv.piece(),
        };
        self.put(mv.to(), placed);

        if let Some((rook_from, rook_to)) = Self::castle_rook_squares(color, mv.kind()) {
            if let Some(rook) = self.take(rook_from) {
                self.put(rook_to, rook);
            }
        }

        if mv.piece().kind == PieceKind::King {
            self.castling.clear_color(color);
        }
        self.castling.clear_corner(mv.from());
        self.castling.clear_corner(mv.to());

        self.en_passant = match mv.kind() {
            MoveKind::DoublePawnPush => mv.from().offset(0, color.forward()),
            _ => None,
        };

        if mv.piece().kind == PieceKind::Pawn || mv.is_capture() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if color == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = color.opposite();
        undo
    }

    /// Reverts `mv`, which must be the last move applied with `make`.
    pub fn unmake(&mut self, mv: Move, undo: Undo) {
        let color = mv.piece().color;
        self.side_to_move = color;

        if let Some((rook_from, rook_to)) = Self::castle_rook_squares(color, mv.kind()) {
            if let Some(rook) = self.take(rook_to) {
                self.put(rook_from, rook);
            }
        }

        self.take(mv.to());
        self.put(mv.from(), mv.piece());
        if let Some(captured) = mv.captured() {
            self.put(mv.capture_square(), captured);
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let c = self.piece_at(Square::new(file, rank)).map_or('.', |p| p.to_char());
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({})", self.to_fen())
    }
}
