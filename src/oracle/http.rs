//! Oracle reached over HTTP with a JSON body.

use super::{MoveOracle, OracleError, OracleRequest, OracleResponse, OracleResult};
use crate::games::squares::{Board, Color};
use tracing::{debug, instrument, warn};

/// Posts the board to a URL and parses the reply.
///
/// Any non-2xx status or unparseable body is an [`OracleError`]. Timeouts
/// are enforced by the caller.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    url: String,
    client: reqwest::Client,
}

impl HttpOracle {
    /// Creates an oracle client for `url` (e.g. `http://host:8080/api/nextMove`).
    #[instrument(skip(url), fields(url = %url.as_ref()))]
    pub fn new(url: impl AsRef<str>) -> Self {
        Self {
            url: url.as_ref().to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl MoveOracle for HttpOracle {
    #[instrument(skip(self, board), fields(url = %self.url, next = %next))]
    async fn request_move(&self, board: &Board, next: Color) -> Result<OracleResult, OracleError> {
        let request = OracleRequest::new(board, next);
        debug!(data = %request.data, "Sending oracle request");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Oracle request failed");
                OracleError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Oracle returned error status");
            return Err(OracleError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        debug!(%body, "Oracle replied");

        let reply: OracleResponse =
            serde_json::from_str(&body).map_err(|e| OracleError::Malformed(e.to_string()))?;
        reply.into_result()
    }

    fn name(&self) -> &str {
        &self.url
    }
}
