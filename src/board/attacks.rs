use super::types::{Color, PieceKind, Square};
use super::Board;

pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [(1, 2), (2, 1), (2, -1), (1, -2), (-1, -2), (-2, -1), (-2, 1), (-1, 2)];
pub const KING_OFFSETS: [(i8, i8); 8] = [(0, 1), (1, 1), (1, 0), (1, -1), (0, -1), (-1, -1), (-1, 0), (-1, 1)];
pub const ROOK_DIRS: [(i8, i8); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];
pub const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, -1), (-1, 1)];

impl Board {
    /// True iff any piece of `by` attacks `target`. Occupancy of `target`
    /// itself does not matter.
    pub fn attacks_on(&self, target: Square, by: Color) -> bool {
        let is = |sq: Option<Square>, kinds: &[PieceKind]| {
            sq.and_then(|s| self.piece_at(s))
                .map_or(false, |p| p.color == by && kinds.contains(&p.kind))
        };

        // A pawn of `by` attacks `target` from one rank behind it, relative to its direction.
        let back = -by.forward();
        if is(target.offset(-1, back), &[PieceKind::Pawn]) || is(target.offset(1, back), &[PieceKind::Pawn]) {
            return true;
        }
        if KNIGHT_OFFSETS.iter().any(|&(df, dr)| is(target.offset(df, dr), &[PieceKind::Knight])) {
            return true;
        }
        if KING_OFFSETS.iter().any(|&(df, dr)| is(target.offset(df, dr), &[PieceKind::King])) {
            return true;
        }
        let slider = |dirs: &[(i8, i8)], kinds: &[PieceKind]| {
            dirs.iter().any(|&(df, dr)| {
                let mut cur = target.offset(df, dr);
                while let Some(sq) = cur {
                    if let Some(p) = self.piece_at(sq) {
                        return p.color == by && kinds.contains(&p.kind);
                    }
                    cur = sq.offset(df, dr);
                }
                false
            })
        };
        slider(&ROOK_DIRS, &[PieceKind::Rook, PieceKind::Queen])
            || slider(&BISHOP_DIRS, &[PieceKind::Bishop, PieceKind::Queen])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square {
        s.parse().unwrap()
    }

    #[test]
    fn startpos_attacks() {
        let b = Board::startpos();
        assert!(b.attacks_on(sq("f3"), Color::White));
        assert!(b.attacks_on(sq("d3"), Color::White));
        assert!(!b.attacks_on(sq("e4"), Color::White));
        assert!(b.attacks_on(sq("f6"), Color::Black));
        assert!(!b.attacks_on(sq("e5"), Color::Black));
    }

    #[test]
    fn sliders_are_blocked() {
        let b = Board::from_fen("4k3/8/8/8/4p3/8/8/R3K2R w - - 0 1").unwrap();
        assert!(b.attacks_on(sq("a8"), Color::White));
        assert!(!b.attacks_on(sq("e4"), Color::White));
        assert!(b.attacks_on(sq("d3"), Color::Black));
        assert!(!b.attacks_on(sq("e3"), Color::Black));
    }
}
