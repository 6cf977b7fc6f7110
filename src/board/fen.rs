use super::types::{Color, Piece, PieceKind, Square};
use super::{Board, CastlingRights};
use crate::error::FenError;

impl Board {
    /// Parses a FEN string. The two move counters are optional.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::MissingFields(parts.len()));
        }
        let mut board = Board::empty();

        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::Placement(parts[0].to_string()));
        }
        let mut king_count = [0usize; 2];
        for (i, row) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for ch in row.chars() {
                if let Some(d) = ch.to_digit(10) {
                    if !(1..=8).contains(&d) {
                        return Err(FenError::Placement(parts[0].to_string()));
                    }
                    file += d as u8;
                } else {
                    let piece = Piece::from_char(ch).ok_or_else(|| FenError::Placement(parts[0].to_string()))?;
                    if file >= 8 {
                        return Err(FenError::Placement(parts[0].to_string()));
                    }
                    if piece.kind == PieceKind::King {
                        king_count[piece.color.index()] += 1;
                    }
                    board.put(Square::new(file, rank), piece);
                    file += 1;
                }
                if file > 8 {
                    return Err(FenError::Placement(parts[0].to_string()));
                }
            }
            if file != 8 {
                return Err(FenError::Placement(parts[0].to_string()));
            }
        }
        if king_count != [1, 1] {
            return Err(FenError::KingCount);
        }

        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        let mut castling = CastlingRights::NONE;
        if parts[2] != "-" {
            for ch in parts[2].chars() {
                match ch {
                    'K' => castling.white_kingside = true,
                    'Q' => castling.white_queenside = true,
                    'k' => castling.black_kingside = true,
                    'q' => castling.black_queenside = true,
                    _ => return Err(FenError::Castling(parts[2].to_string())),
                }
            }
        }
        board.castling = castling;

        board.en_passant = if parts[3] == "-" {
            None
        } else {
            let sq: Square = parts[3].parse().map_err(|_| FenError::EnPassant(parts[3].to_string()))?;
            if sq.rank() != 2 && sq.rank() != 5 {
                return Err(FenError::EnPassant(parts[3].to_string()));
            }
            Some(sq)
        };

        if let Some(h) = parts.get(4) {
            board.halfmove_clock = h.parse().map_err(|_| FenError::Counter(h.to_string()))?;
        }
        if let Some(n) = parts.get(5) {
            board.fullmove_number = n.parse().map_err(|_| FenError::Counter(n.to_string()))?;
        }
        Ok(board)
    }

    pub fn to_fen(&self) -> String {
        let mut s = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_at(Square::new(file, rank)) {
                    Some(p) => {
                        if empty > 0 {
                            s.push_str(&empty.to_string());
                            empty = 0;
                        }
                        s.push(p.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                s.push_str(&empty.to_string());
            }
            if rank > 0 {
                s.push('/');
            }
        }
        s.push(' ');
        s.push(if self.side_to_move == Color::White { 'w' } else { 'b' });
        s.push(' ');
        let c = self.castling;
        if c == CastlingRights::NONE {
            s.push('-');
        } else {
            for (flag, ch) in [
                (c.white_kingside, 'K'),
                (c.white_queenside, 'Q'),
                (c.black_kingside, 'k'),
                (c.black_queenside, 'q'),
            ] {
                if flag {
                    s.push(ch);
                }
            }
        }
        s.push(' ');
        match self.en_passant {
            Some(sq) => s.push_str(&sq.to_string()),
            None => s.push('-'),
        }
        s.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        s
    }
}
