//! Live map errors

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Result type used across the crate.
pub type Result<T> = anyhow::Result<T, Error>;

/// Errors surfaced by feed adapters and the snapshot routes.
///
/// Expected feed conditions (a missed poll, a malformed record) are handled
/// in the engine and never become an `Error`.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Error {
    /// Nothing on the map matches the requested id.
    #[error("code: 404, description: {0}")]
    NotFound(String),

    /// The upstream feed could not be reached or answered with a failure.
    #[error("code: 502, description: {0}")]
    Feed(String),

    /// A feed payload or recording could not be decoded.
    #[error("code: 500, description: decode {0}")]
    Decode(String),

    /// A recording holds no snapshots.
    #[error("code: 500, description: empty_recording")]
    EmptyRecording,

    #[error("code: 500, description: {0}")]
    Internal(String),
}

impl Error {
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Feed(_) => StatusCode::BAD_GATEWAY,
            Self::Decode(_) | Self::EmptyRecording | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[must_use]
    pub fn description(&self) -> String {
        self.to_string()
    }

    // same kind, message replaced by the full context chain
    fn rewrap(&self, chain: String) -> Self {
        match self {
            Self::NotFound(_) => Self::NotFound(chain),
            Self::Feed(_) => Self::Feed(chain),
            Self::Decode(_) => Self::Decode(chain),
            Self::EmptyRecording => Self::EmptyRecording,
            Self::Internal(_) => Self::Internal(chain),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        let chain = err.chain().map(ToString::to_string).collect::<Vec<_>>().join(" -> ");

        // keep the kind of an `Error` buried under added context
        if let Some(inner) = err.downcast_ref::<Self>() {
            tracing::debug!("error: {err}, caused by: {inner}");
            return inner.rewrap(chain);
        }

        Self::Internal(chain)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Error rendered by the snapshot routes as a JSON body.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    error: String,
}

impl HttpError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<anyhow::Error> for HttpError {
    fn from(e: anyhow::Error) -> Self {
        Error::from(e).into()
    }
}

impl From<Error> for HttpError {
    fn from(e: Error) -> Self {
        Self { status: e.code(), error: e.description() }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = json!({ "code": self.status.as_u16(), "error": self.error });
        (self.status, Json(body)).into_response()
    }
}

#[macro_export]
macro_rules! not_found {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::NotFound(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::NotFound(format!($err))
    };
}

#[macro_export]
macro_rules! feed_error {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::Feed(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::Feed(format!($err))
    };
}

#[cfg(test)]
mod tests {
    use anyhow::{Context, anyhow};
    use http::StatusCode;
    use serde_json::Value;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::{EnvFilter, Registry, fmt};

    use super::*;

    #[test]
    fn codes() {
        assert_eq!(Error::NotFound("v1".to_string()).code(), StatusCode::NOT_FOUND);
        assert_eq!(Error::Feed("timeout".to_string()).code(), StatusCode::BAD_GATEWAY);
        assert_eq!(Error::EmptyRecording.code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            Error::NotFound("vehicle 42".to_string()).to_string(),
            "code: 404, description: vehicle 42"
        );
    }

    #[test]
    fn context_keeps_kind() {
        Registry::default().with(EnvFilter::new("debug")).with(fmt::layer()).init();

        let poll = || -> Result<()> {
            Err(Error::Feed("feed unavailable".to_string()))
                .context("fetching vehicle positions")
                .context("polling feed")?;
            Ok(())
        };

        assert_eq!(
            poll().unwrap_err(),
            Error::Feed(
                "polling feed -> fetching vehicle positions -> code: 502, description: feed unavailable"
                    .to_string()
            )
        );
    }

    #[test]
    fn plain_anyhow_is_internal() {
        let err: Error = anyhow!("socket closed").context("reading recording").into();
        assert_eq!(err, Error::Internal("reading recording -> socket closed".to_string()));
    }

    #[test]
    fn bad_json_is_decode() {
        let err = serde_json::from_str::<Value>(r#"{"vehicles": ["#).map_err(Error::from);
        assert!(matches!(err, Err(Error::Decode(_))));
    }

    #[test]
    fn macros_format() {
        let id = "bus-7";
        assert_eq!(not_found!("no vehicle {id}"), Error::NotFound("no vehicle bus-7".to_string()));
        assert_eq!(
            feed_error!("status {}", 503),
            Error::Feed("status 503".to_string())
        );
    }

    #[test]
    fn http_error_status() {
        let err = HttpError::from(anyhow::Error::from(Error::EmptyRecording).context("loading"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = HttpError::from(not_found!("v9")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
