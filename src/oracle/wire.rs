//! JSON shapes exchanged with the oracle service.
//!
//! Request: `{"size": 4, "data": "W...B...........", "nextPlayerColor": "b"}`.
//! Move reply: `{"x": 1, "y": 2}`, optionally with `winningSquare`.
//! Terminal reply: `{"x": -1, "y": -1, "message": "Game finished. W wins!"}`.

use super::{OracleError, OracleResult, Verdict};
use crate::games::squares::{Board, Color, Position, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Body of an oracle request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleRequest {
    /// Board side length.
    pub size: usize,
    /// Row-major board, `.`/`W`/`B` per cell.
    pub data: String,
    /// `"w"` or `"b"`.
    pub next_player_color: String,
}

impl OracleRequest {
    /// Builds the request for `next` to move on `board`.
    #[instrument(skip(board), fields(size = board.size()))]
    pub fn new(board: &Board, next: Color) -> Self {
        Self {
            size: board.size(),
            data: board.encode(),
            next_player_color: next.symbol().to_ascii_lowercase().to_string(),
        }
    }

    /// Decodes the board and color, for oracle implementations.
    pub fn decode(&self) -> Option<(Board, Color)> {
        let mut chars = self.next_player_color.chars();
        let color = Color::from_symbol(chars.next()?)?;
        if chars.next().is_some() {
            return None;
        }
        Some((Board::decode(self.size, &self.data)?, color))
    }
}

/// Body of an oracle reply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleResponse {
    /// Column of the chosen cell, negative for a terminal reply.
    pub x: i64,
    /// Row of the chosen cell, negative for a terminal reply.
    pub y: i64,
    /// Human-readable status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// `"w"`/`"b"` winner or `"draw"` on terminal replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Vertices of a completed square as `[x, y]` pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winning_square: Option<Vec<[i64; 2]>>,
}

impl OracleResponse {
    /// Move reply.
    pub fn with_move(position: Position) -> Self {
        Self {
            x: position.x as i64,
            y: position.y as i64,
            ..Self::default()
        }
    }

    /// Terminal reply carrying `message`.
    pub fn finished(message: impl Into<String>) -> Self {
        Self {
            x: -1,
            y: -1,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// Interprets the reply.
    ///
    /// # Errors
    ///
    /// [`OracleError::Malformed`] for a terminal reply whose message names
    /// neither a win, a draw nor a finished game.
    #[instrument(skip(self), fields(x = self.x, y = self.y))]
    pub fn into_result(self) -> Result<OracleResult, OracleError> {
        let square = self.winning_square.as_deref().and_then(parse_square);

        if self.x >= 0 && self.y >= 0 {
            return Ok(OracleResult::Move {
                position: Position::new(self.x as usize, self.y as usize),
                claimed_square: square,
            });
        }

        let message = self.message.unwrap_or_default();
        debug!(%message, status = ?self.status, "Terminal oracle reply");
        let named = named_winner(&message, self.status.as_deref());

        if message.contains("wins") {
            Ok(OracleResult::Verdict(Verdict::Won { winner: named, square }))
        } else if message.contains("Draw") {
            Ok(OracleResult::Verdict(Verdict::Draw))
        } else if message.contains("finished") {
            Ok(OracleResult::Verdict(Verdict::Won { winner: named, square }))
        } else {
            Err(OracleError::Malformed(format!(
                "negative coordinates without a verdict: {message:?}"
            )))
        }
    }
}

fn named_winner(message: &str, status: Option<&str>) -> Option<Color> {
    if message.contains("W wins") {
        return Some(Color::White);
    }
    if message.contains("B wins") {
        return Some(Color::Black);
    }
    let status = status?;
    if status.len() == 1 {
        status.chars().next().and_then(Color::from_symbol)
    } else {
        None
    }
}

fn parse_square(points: &[[i64; 2]]) -> Option<Square> {
    let vertices: Vec<Position> = points
        .iter()
        .map(|&[x, y]| {
            (x >= 0 && y >= 0).then(|| Position::new(x as usize, y as usize))
        })
        .collect::<Option<_>>()?;
    let vertices: [Position; 4] = vertices.try_into().ok()?;
    Some(Square::new(vertices))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let mut board = Board::new(3).unwrap();
        board.set(Position::new(2, 0), Color::White).unwrap();
        let request = OracleRequest::new(&board, Color::Black);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"size": 3, "data": "..W......", "nextPlayerColor": "b"})
        );
        let (decoded, color) = request.decode().unwrap();
        assert_eq!(decoded, board);
        assert_eq!(color, Color::Black);
    }

    #[test]
    fn test_move_reply() {
        let reply: OracleResponse = serde_json::from_str(r#"{"x": 2, "y": 1}"#).unwrap();
        assert_eq!(
            reply.into_result(),
            Ok(OracleResult::Move {
                position: Position::new(2, 1),
                claimed_square: None
            })
        );
    }

    #[test]
    fn test_move_reply_with_square() {
        let reply: OracleResponse = serde_json::from_str(
            r#"{"x": 1, "y": 1, "winningSquare": [[0,0],[1,0],[0,1],[1,1]]}"#,
        )
        .unwrap();
        let Ok(OracleResult::Move { claimed_square, .. }) = reply.into_result() else {
            panic!("expected a move");
        };
        assert!(claimed_square.unwrap().contains(Position::new(1, 1)));
    }

    #[test]
    fn test_win_verdict_names_winner() {
        let reply: OracleResponse = serde_json::from_str(
            r#"{"x": -1, "y": -1, "message": "Game finished. B wins!"}"#,
        )
        .unwrap();
        assert_eq!(
            reply.into_result(),
            Ok(OracleResult::Verdict(Verdict::Won {
                winner: Some(Color::Black),
                square: None
            }))
        );
    }

    #[test]
    fn test_draw_and_finished_verdicts() {
        assert_eq!(
            OracleResponse::finished("Game finished. Draw").into_result(),
            Ok(OracleResult::Verdict(Verdict::Draw))
        );
        assert_eq!(
            OracleResponse::finished("Game finished").into_result(),
            Ok(OracleResult::Verdict(Verdict::Won {
                winner: None,
                square: None
            }))
        );
    }

    #[test]
    fn test_status_field_names_winner() {
        let reply = OracleResponse {
            status: Some("w".to_string()),
            ..OracleResponse::finished("Somebody wins")
        };
        assert_eq!(
            reply.into_result(),
            Ok(OracleResult::Verdict(Verdict::Won {
                winner: Some(Color::White),
                square: None
            }))
        );
    }

    #[test]
    fn test_unrecognised_terminal_reply_is_malformed() {
        let reply = OracleResponse::finished("No valid moves available");
        assert!(matches!(reply.into_result(), Err(OracleError::Malformed(_))));
    }

    #[test]
    fn test_short_square_is_ignored() {
        assert_eq!(parse_square(&[[0, 0], [1, 0]]), None);
        assert_eq!(parse_square(&[[0, 0], [1, 0], [0, -1], [1, 1]]), None);
    }
}
