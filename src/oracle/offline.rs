//! Oracle stand-in for playing without a service.

use super::{MoveOracle, OracleError, OracleResult};
use crate::games::squares::{Board, Color};
use tracing::debug;

/// Fails every request, so oracle-controlled sides fall back to random
/// empty cells.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineOracle;

#[async_trait::async_trait]
impl MoveOracle for OfflineOracle {
    async fn request_move(&self, _board: &Board, next: Color) -> Result<OracleResult, OracleError> {
        debug!(%next, "Offline oracle consulted");
        Err(OracleError::Transport("oracle disabled".to_string()))
    }

    fn name(&self) -> &str {
        "offline"
    }
}
