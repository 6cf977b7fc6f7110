use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::types::{Piece, PieceKind, Square};

/// Special-move tag carried by every move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    Normal,
    DoublePawnPush,
    EnPassant,
    CastleKingside,
    CastleQueenside,
    Promotion(PieceKind),
}

/// A fully resolved move. Built by the move generator and never changed after.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    from: Square,
    to: Square,
    piece: Piece,
    captured: Option<Piece>,
    kind: MoveKind,
}

impl Move {
    pub(crate) fn new(from: Square, to: Square, piece: Piece, captured: Option<Piece>, kind: MoveKind) -> Self {
        Self { from, to, piece, captured, kind }
    }

    #[inline]
    pub fn from(&self) -> Square { self.from }
    #[inline]
    pub fn to(&self) -> Square { self.to }
    #[inline]
    pub fn piece(&self) -> Piece { self.piece }
    #[inline]
    pub fn captured(&self) -> Option<Piece> { self.captured }
    #[inline]
    pub fn kind(&self) -> MoveKind { self.kind }

    pub fn is_capture(&self) -> bool { self.captured.is_some() }

    pub fn is_castle(&self) -> bool {
        matches!(self.kind, MoveKind::CastleKingside | MoveKind::CastleQueenside)
    }

    pub fn promotion(&self) -> Option<PieceKind> {
        match self.kind {
            MoveKind::Promotion(k) => Some(k),
            _ => None,
        }
    }

    /// Square of the captured piece (differs from `to` for en passant).
    pub fn capture_square(&self) -> Square {
        match self.kind {
            MoveKind::EnPassant => Square::new(self.to.file(), self.from.rank()),
            _ => self.to,
        }
    }

    /// Board-coordinate order used to break search ties reproducibly.
    pub fn coordinate_cmp(&self, other: &Move) -> Ordering {
        let promo = |m: &Move| m.promotion().map_or(0, |k| k.index() + 1);
        (self.from, self.to, promo(self)).cmp(&(other.from, other.to, promo(other)))
    }

    pub fn request(&self) -> MoveRequest {
        MoveRequest { from: self.from, to: self.to, promotion: self.promotion() }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.request())
    }
}

/// What a caller submits: coordinates plus the promotion choice when a pawn
/// reaches the last rank. Resolved against the legal move set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> Self {
        Self { from, to, promotion: None }
    }

    pub fn with_promotion(mut self, kind: PieceKind) -> Self {
        self.promotion = Some(kind);
        self
    }
}

impl From<Move> for MoveRequest {
    fn from(mv: Move) -> Self {
        mv.request()
    }
}

impl From<&Move> for MoveRequest {
    fn from(mv: &Move) -> Self {
        mv.request()
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(k) = self.promotion {
            write!(f, "{}", k.to_char())?;
        }
        Ok(())
    }
}

/// Parses UCI coordinate text such as `e2e4` or `e7e8q`.
impl FromStr for MoveRequest {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(format!("invalid move text: {s}"));
        }
        let from: Square = s[0..2].parse()?;
        let to: Square = s[2..4].parse()?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => Some(PieceKind::from_char(c).ok_or_else(|| format!("invalid promotion piece: {c}"))?),
        };
        Ok(MoveRequest { from, to, promotion })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_uci_text() {
        let r: MoveRequest = "e7e8q".parse().unwrap();
        assert_eq!(r.from.to_string(), "e7");
        assert_eq!(r.to.to_string(), "e8");
        assert_eq!(r.promotion, Some(PieceKind::Queen));
        assert_eq!(r.to_string(), "e7e8q");
        assert!("e2".parse::<MoveRequest>().is_err());
        assert!("e7e8x".parse::<MoveRequest>().is_err());
    }
}
