use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use outline_splitter::SplitterError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Load(#[source] SplitterError),
    #[error("split failed: {0}")]
    Split(#[source] SplitterError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<SplitterError> for ApiError {
    fn from(e: SplitterError) -> Self {
        if e.is_load_error() {
            Self::Load(e)
        } else {
            Self::Split(e)
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Load(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Split(_) | Self::Io(_) | Self::Archive(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        } else {
            tracing::warn!(error = %self, "request rejected");
            self.to_string()
        };

        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}
