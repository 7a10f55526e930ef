use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The catalog or the image CDN answered with a non-2xx status, or could not be reached.
    #[error("catalog unreachable at {url}: {reason}")]
    Connectivity { url: String, reason: String },

    #[error("unexpected response shape from {from}: {reason}")]
    MalformedResponse { from: String, reason: String },

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("database error: {0}")]
    Db(#[from] sea_orm::DbErr),
}

impl AppError {
    pub fn connectivity(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Connectivity { url: url.into(), reason: reason.to_string() }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Connectivity { .. } | AppError::MalformedResponse { .. } => {
                StatusCode::BAD_GATEWAY
            },
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
