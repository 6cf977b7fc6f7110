use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::board::{Board, Color, PieceKind, Square};

/// Canonical position key: piece placement, side to move, castling rights and
/// en-passant availability. Move counters are deliberately not part of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u64);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for Fingerprint {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        u64::from_str_radix(s, 16).map(Fingerprint)
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

const PIECE_KEYS: usize = 12 * 64;
const SIDE_KEY: usize = PIECE_KEYS;
const CASTLE_KEYS: usize = SIDE_KEY + 1;
const EP_KEYS: usize = CASTLE_KEYS + 4;
const TABLE_LEN: usize = EP_KEYS + 8;

static TABLE: OnceLock<[u64; TABLE_LEN]> = OnceLock::new();

fn table() -> &'static [u64; TABLE_LEN] {
    TABLE.get_or_init(|| {
        let mut t = [0u64; TABLE_LEN];
        let mut seed = 0xF00D_F00D_DEAD_BEEF;
        for v in &mut t {
            seed = splitmix64(seed);
            *v = seed;
        }
        t
    })
}

fn piece_index(color: Color, kind: PieceKind) -> usize {
    color.index() * 6 + kind.index()
}

/// The en-passant file counts only when the side to move has a pawn that
/// could actually make the capture.
fn en_passant_file(board: &Board) -> Option<u8> {
    let target = board.en_passant()?;
    let us = board.side_to_move();
    let pawn = Some(crate::board::Piece::new(us, PieceKind::Pawn));
    let from_rank = target.rank() as i8 - us.forward();
    if !(0..8).contains(&from_rank) {
        return None;
    }
    [-1i8, 1].iter().find_map(|&df| {
        let f = target.file() as i8 + df;
        if !(0..8).contains(&f) {
            return None;
        }
        (board.piece_at(Square::new(f as u8, from_rank as u8)) == pawn).then_some(target.file())
    })
}

pub fn compute(board: &Board) -> Fingerprint {
    let t = table();
    let mut key = 0u64;
    for (sq, piece) in board.pieces() {
        key ^= t[piece_index(piece.color, piece.kind) * 64 + sq.index()];
    }
    if board.side_to_move() == Color::Black {
        key ^= t[SIDE_KEY];
    }
    let bits = board.castling().bits();
    for i in 0..4 {
        if bits & (1 << i) != 0 {
            key ^= t[CASTLE_KEYS + i];
        }
    }
    if let Some(file) = en_passant_file(board) {
        key ^= t[EP_KEYS + file as usize];
    }
    Fingerprint(key)
}

impl Board {
    pub fn fingerprint(&self) -> Fingerprint {
        compute(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_do_not_change_the_key() {
        let a = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let b = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 37 90").unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn side_castling_and_en_passant_change_the_key() {
        let base = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
        let black = Board::from_fen("4k3/8/8/8/8/8/8/4K2R b K - 0 1").unwrap();
        let no_castle = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 1").unwrap();
        assert_ne!(base.fingerprint(), black.fingerprint());
        assert_ne!(base.fingerprint(), no_castle.fingerprint());

        let ep = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let no_ep = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 2").unwrap();
        assert_ne!(ep.fingerprint(), no_ep.fingerprint());
    }

    #[test]
    fn unusable_en_passant_square_is_ignored() {
        let ep = Board::from_fen("4k3/8/8/3p4/8/8/8/4K3 w - d6 0 2").unwrap();
        let no_ep = Board::from_fen("4k3/8/8/3p4/8/8/8/4K3 w - - 0 2").unwrap();
        assert_eq!(ep.fingerprint(), no_ep.fingerprint());
    }

    #[test]
    fn hex_text_roundtrip() {
        let fp = Board::startpos().fingerprint();
        assert_eq!(fp.to_string().len(), 16);
        assert_eq!(fp.to_string().parse::<Fingerprint>().unwrap(), fp);
    }
}
