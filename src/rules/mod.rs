//! Legality filter, move validation and terminal-state classification.

pub mod movegen;
pub mod status;

use crate::board::{Board, Move, MoveKind, MoveRequest, PieceKind};
use crate::error::{IllegalMoveError, IllegalMoveReason};

pub use movegen::pseudo_legal_moves;
pub use status::{has_insufficient_material, position_status, GameOutcome, GameResult, Termination};

/// True iff `mv` (pseudo-legal for the side to move) does not leave the
/// mover's king attacked, and for castling the king neither starts in,
/// crosses, nor lands on an attacked square.
pub fn is_legal(board: &Board, mv: Move) -> bool {
    let us = board.side_to_move();
    let them = us.opposite();
    if mv.is_castle() {
        return movegen::castle_path(us, mv.kind()).iter().all(|&sq| !board.attacks_on(sq, them));
    }
    let after = board.apply(mv);
    !after.attacks_on(after.king_square(us), them)
}

/// All legal moves for the side to move, ordered by origin square.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = pseudo_legal_moves(board, board.side_to_move());
    moves.retain(|&mv| is_legal(board, mv));
    moves
}

pub fn has_legal_move(board: &Board) -> bool {
    pseudo_legal_moves(board, board.side_to_move()).into_iter().any(|mv| is_legal(board, mv))
}

/// Resolves a request against the rules, or explains why it is illegal.
pub fn validate(board: &Board, request: MoveRequest) -> Result<Move, IllegalMoveError> {
    let reject = |reason| Err(IllegalMoveError::new(request, reason));

    let Some(piece) = board.piece_at(request.from) else {
        return reject(IllegalMoveReason::NoPieceAtOrigin);
    };
    if piece.color != board.side_to_move() {
        return reject(IllegalMoveReason::WrongTurn);
    }

    let mut from_origin = Vec::with_capacity(28);
    movegen::moves_from(board, request.from, piece, &mut from_origin);
    let candidates: Vec<Move> = from_origin.into_iter().filter(|m| m.to() == request.to).collect();

    if candidates.is_empty() {
        let castle_attempt = piece.kind == PieceKind::King
            && request.from.rank() == request.to.rank()
            && request.from.file().abs_diff(request.to.file()) == 2;
        return reject(if castle_attempt {
            IllegalMoveReason::CastlingPreconditionUnmet
        } else {
            IllegalMoveReason::DestinationUnreachable
        });
    }

    let promotes = candidates.iter().any(|m| m.promotion().is_some());
    let mv = match (promotes, request.promotion) {
        (true, None) => return reject(IllegalMoveReason::PromotionRequired),
        (true, Some(kind)) => match candidates.iter().find(|m| m.promotion() == Some(kind)) {
            Some(&m) => m,
            None => return reject(IllegalMoveReason::InvalidPromotion),
        },
        (false, Some(_)) => return reject(IllegalMoveReason::InvalidPromotion),
        (false, None) => candidates[0],
    };

    if is_legal(board, mv) {
        Ok(mv)
    } else if matches!(mv.kind(), MoveKind::CastleKingside | MoveKind::CastleQueenside) {
        reject(IllegalMoveReason::CastlingPreconditionUnmet)
    } else {
        reject(IllegalMoveReason::KingInCheck)
    }
}

/// Finds the legal move matching UCI coordinate text.
pub fn find_move(board: &Board, uci: &str) -> Option<Move> {
    let request: MoveRequest = uci.parse().ok()?;
    validate(board, request).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn req(s: &str) -> MoveRequest {
        s.parse().unwrap()
    }

    fn reason(fen: &str, uci: &str) -> IllegalMoveReason {
        let b = Board::from_fen(fen).unwrap();
        validate(&b, req(uci)).unwrap_err().reason
    }

    #[test]
    fn startpos_has_twenty_moves() {
        assert_eq!(legal_moves(&Board::startpos()).len(), 20);
    }

    #[test]
    fn reasons_for_rejection() {
        let start = crate::board::START_FEN;
        assert_eq!(reason(start, "e3e4"), IllegalMoveReason::NoPieceAtOrigin);
        assert_eq!(reason(start, "e7e5"), IllegalMoveReason::WrongTurn);
        assert_eq!(reason(start, "e2e5"), IllegalMoveReason::DestinationUnreachable);
        assert_eq!(reason(start, "e1g1"), IllegalMoveReason::CastlingPreconditionUnmet);
        // Pinned knight on e2 by the rook on e8.
        assert_eq!(reason("4r1k1/8/8/8/8/8/4N3/4K3 w - - 0 1", "e2c3"), IllegalMoveReason::KingInCheck);
        // The king would castle through f1, covered by the bishop on c4.
        assert_eq!(reason("4k3/8/8/8/2b5/8/8/4K2R w K - 0 1", "e1g1"), IllegalMoveReason::CastlingPreconditionUnmet);
        assert_eq!(reason("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7a8"), IllegalMoveReason::PromotionRequired);
        assert_eq!(reason("4k3/P7/8/8/8/8/8/4K3 w - - 0 1", "a7a8k"), IllegalMoveReason::InvalidPromotion);
        assert_eq!(reason(start, "e2e4q"), IllegalMoveReason::InvalidPromotion);
    }

    #[test]
    fn underpromotion_is_resolved() {
        let b = Board::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let mv = validate(&b, req("a7a8n")).unwrap();
        assert_eq!(mv.promotion(), Some(PieceKind::Knight));
        assert_eq!(mv.to_string(), "a7a8n");
    }

    #[test]
    fn en_passant_only_right_after_double_push() {
        let b = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        let mv = validate(&b, req("e5d6")).unwrap();
        assert_eq!(mv.kind(), MoveKind::EnPassant);
        let after = b.apply(mv);
        assert_eq!(after.piece_at("d5".parse().unwrap()), None);

        let stale = Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - - 0 2").unwrap();
        assert_eq!(validate(&stale, req("e5d6")).unwrap_err().reason, IllegalMoveReason::DestinationUnreachable);
    }

    #[test]
    fn en_passant_cannot_expose_king() {
        // Capturing would clear the fifth rank between the king and the rook.
        let b = Board::from_fen("8/8/8/K2pP2r/8/8/8/7k w - d6 0 2").unwrap();
        assert_eq!(validate(&b, req("e5d6")).unwrap_err().reason, IllegalMoveReason::KingInCheck);
    }

    #[test]
    fn castling_out_of_check_is_refused() {
        let b = Board::from_fen("4r1k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert!(legal_moves(&b).iter().all(|m| !m.is_castle()));
        let quiet = Board::from_fen("6k1/8/8/8/8/8/8/R3K2R w KQ - 0 1").unwrap();
        assert_eq!(legal_moves(&quiet).iter().filter(|m| m.is_castle()).count(), 2);
    }

    #[test]
    fn queenside_castling_ignores_attack_on_b_file() {
        // b1 is attacked but the king never crosses it.
        let b = Board::from_fen("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1").unwrap();
        assert!(validate(&b, req("e1c1")).is_ok());
    }
}
