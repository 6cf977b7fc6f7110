//! Pseudo-legal move generation, one pure function per piece kind.

use crate::board::attacks::{BISHOP_DIRS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRS};
use crate::board::{Board, Color, Move, MoveKind, Piece, PieceKind, Square};

/// Every pseudo-legal move for `color`, ordered by origin square. Castling
/// is included whenever the right is held, the rook is home and the squares
/// between are empty; attack conditions are left to the legal filter.
pub fn pseudo_legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut out = Vec::with_capacity(48);
    for (from, piece) in board.pieces() {
        if piece.color != color {
            continue;
        }
        moves_from(board, from, piece, &mut out);
    }
    out
}

/// Pseudo-legal moves of the piece on `from`.
pub fn moves_from(board: &Board, from: Square, piece: Piece, out: &mut Vec<Move>) {
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, piece, out),
        PieceKind::Knight => step_moves(board, from, piece, &KNIGHT_OFFSETS, out),
        PieceKind::Bishop => slide_moves(board, from, piece, &BISHOP_DIRS, out),
        PieceKind::Rook => slide_moves(board, from, piece, &ROOK_DIRS, out),
        PieceKind::Queen => {
            slide_moves(board, from, piece, &ROOK_DIRS, out);
            slide_moves(board, from, piece, &BISHOP_DIRS, out);
        }
        PieceKind::King => {
            step_moves(board, from, piece, &KING_OFFSETS, out);
            castle_moves(board, from, piece, out);
        }
    }
}

/// Number of pseudo-legal moves for `color`, without building the list.
pub fn mobility(board: &Board, color: Color) -> usize {
    let mut scratch = Vec::with_capacity(32);
    let mut total = 0;
    for (from, piece) in board.pieces() {
        if piece.color != color || piece.kind == PieceKind::King {
            continue;
        }
        scratch.clear();
        moves_from(board, from, piece, &mut scratch);
        total += scratch.len();
    }
    total
}

fn push_pawn_move(from: Square, to: Square, piece: Piece, captured: Option<Piece>, out: &mut Vec<Move>) {
    if to.rank() == piece.color.promotion_rank() {
        for kind in PieceKind::PROMOTIONS {
            out.push(Move::new(from, to, piece, captured, MoveKind::Promotion(kind)));
        }
    } else {
        out.push(Move::new(from, to, piece, captured, MoveKind::Normal));
    }
}

fn pawn_moves(board: &Board, from: Square, piece: Piece, out: &mut Vec<Move>) {
    let dir = piece.color.forward();
    if let Some(one) = from.offset(0, dir) {
        if board.piece_at(one).is_none() {
            push_pawn_move(from, one, piece, None, out);
            if from.rank() == piece.color.pawn_start_rank() {
                if let Some(two) = one.offset(0, dir) {
                    if board.piece_at(two).is_none() {
                        out.push(Move::new(from, two, piece, None, MoveKind::DoublePawnPush));
                    }
                }
            }
        }
    }
    for df in [-1, 1] {
        let Some(to) = from.offset(df, dir) else { continue };
        match board.piece_at(to) {
            Some(target) if target.color != piece.color => push_pawn_move(from, to, piece, Some(target), out),
            Some(_) => {}
            None if board.en_passant() == Some(to) => {
                let victim = Piece::new(piece.color.opposite(), PieceKind::Pawn);
                let behind = Square::new(to.file(), from.rank());
                if board.piece_at(behind) == Some(victim) {
                    out.push(Move::new(from, to, piece, Some(victim), MoveKind::EnPassant));
                }
            }
            None => {}
        }
    }
}

fn step_moves(board: &Board, from: Square, piece: Piece, offsets: &[(i8, i8)], out: &mut Vec<Move>) {
    for &(df, dr) in offsets {
        let Some(to) = from.offset(df, dr) else { continue };
        match board.piece_at(to) {
            None => out.push(Move::new(from, to, piece, None, MoveKind::Normal)),
            Some(t) if t.color != piece.color => out.push(Move::new(from, to, piece, Some(t), MoveKind::Normal)),
            Some(_) => {}
        }
    }
}

fn slide_moves(board: &Board, from: Square, piece: Piece, dirs: &[(i8, i8)], out: &mut Vec<Move>) {
    for &(df, dr) in dirs {
        let mut cur = from.offset(df, dr);
        while let Some(to) = cur {
            match board.piece_at(to) {
                None => out.push(Move::new(from, to, piece, None, MoveKind::Normal)),
                Some(t) => {
                    if t.color != piece.color {
                        out.push(Move::new(from, to, piece, Some(t), MoveKind::Normal));
                    }
                    break;
                }
            }
            cur = to.offset(df, dr);
        }
    }
}

fn castle_moves(board: &Board, from: Square, piece: Piece, out: &mut Vec<Move>) {
    let color = piece.color;
    let rank = color.home_rank();
    if from != Square::new(4, rank) {
        return;
    }
    let rights = board.castling();
    let rook = Some(Piece::new(color, PieceKind::Rook));
    let empty = |files: &[u8]| files.iter().all(|&f| board.piece_at(Square::new(f, rank)).is_none());

    if rights.kingside(color) && board.piece_at(Square::new(7, rank)) == rook && empty(&[5, 6]) {
        out.push(Move::new(from, Square::new(6, rank), piece, None, MoveKind::CastleKingside));
    }
    if rights.queenside(color) && board.piece_at(Square::new(0, rank)) == rook && empty(&[1, 2, 3]) {
        out.push(Move::new(from, Square::new(2, rank), piece, None, MoveKind::CastleQueenside));
    }
}

/// Squares the king stands on, crosses, and lands on while castling.
pub(crate) fn castle_path(color: Color, kind: MoveKind) -> [Square; 3] {
    let r = color.home_rank();
    match kind {
        MoveKind::CastleQueenside => [Square::new(4, r), Square::new(3, r), Square::new(2, r)],
        _ => [Square::new(4, r), Square::new(5, r), Square::new(6, r)],
    }
}
