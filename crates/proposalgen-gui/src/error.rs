use std::fmt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use proposalgen_core::ProposalError;
use serde::Serialize;

/// JSON error returned by the `/api` routes.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

/// Pipeline failures surface as 500 with the full error chain.
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, format!("{error:#}"))
    }
}

/// Rejected input is the caller's fault; anything else is ours.
impl From<ProposalError> for AppError {
    fn from(error: ProposalError) -> Self {
        let status = match error {
            ProposalError::InvalidTitle(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.to_string())
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use proposalgen_core::{EMPTY_TITLE_MESSAGE, ResearchTitle};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body readable");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn invalid_title_maps_to_bad_request() {
        let err = ResearchTitle::parse("   ").unwrap_err();
        let response = AppError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], EMPTY_TITLE_MESSAGE);
    }

    #[tokio::test]
    async fn pipeline_errors_keep_their_context_chain() {
        let err = anyhow::anyhow!("502 Bad Gateway").context("pipeline aborted");
        let response = AppError::from(err).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "pipeline aborted: 502 Bad Gateway"
        );
    }
}
