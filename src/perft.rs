//! Move-path enumeration for validating move generation.

use rayon::prelude::*;

use crate::board::{Board, Move};
use crate::rules::legal_moves;

/// Leaf count at `depth`, using in-place make/unmake.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves(board);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in moves {
        let undo = board.make(mv);
        nodes += perft(board, depth - 1);
        board.unmake(mv, undo);
    }
    nodes
}

/// Per-root-move counts, in legal move order.
pub fn divide(board: &Board, depth: u32) -> Vec<(Move, u64)> {
    legal_moves(board)
        .into_iter()
        .map(|mv| {
            let mut child = board.apply(mv);
            (mv, perft(&mut child, depth.saturating_sub(1)))
        })
        .collect()
}

/// Same as [`divide`], with root moves spread over the rayon pool.
pub fn divide_parallel(board: &Board, depth: u32) -> Vec<(Move, u64)> {
    legal_moves(board)
        .par_iter()
        .map(|&mv| {
            let mut child = board.apply(mv);
            (mv, perft(&mut child, depth.saturating_sub(1)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_startpos_counts() {
        let mut b = Board::startpos();
        assert_eq!(perft(&mut b, 0), 1);
        assert_eq!(perft(&mut b, 1), 20);
        assert_eq!(perft(&mut b, 2), 400);
        assert_eq!(b, Board::startpos());
    }

    #[test]
    fn divide_sums_to_perft() {
        let b = Board::startpos();
        let total: u64 = divide_parallel(&b, 3).iter().map(|d| d.1).sum();
        assert_eq!(total, 8902);
        assert_eq!(divide(&b, 3), divide_parallel(&b, 3));
    }
}
