use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use powerrank_core::rankings::RankingsError;
use powerrank_core::voting::VoteError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    NotFound(String),
    Unavailable(String),
    /// Logged and reported in full; only `message` reaches the client.
    Internal {
        message: String,
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn internal(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            message: message.into(),
            source: source.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
            ApiError::Internal { message, source } => {
                sentry_anyhow::capture_anyhow(&source);
                tracing::error!(error = ?source, "{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<RankingsError> for ApiError {
    fn from(err: RankingsError) -> Self {
        match err {
            RankingsError::InvalidDate(_) => ApiError::BadRequest(err.to_string()),
            RankingsError::NotFound(_) => ApiError::NotFound(err.to_string()),
            RankingsError::NoCurrentSnapshot => ApiError::internal("no ranking files found", err),
            RankingsError::Io { .. }
            | RankingsError::Malformed { .. }
            | RankingsError::Invalid(_) => ApiError::internal("failed to fetch rankings", err),
        }
    }
}

impl From<VoteError> for ApiError {
    fn from(err: VoteError) -> Self {
        match err {
            VoteError::InvalidDate(_) | VoteError::UnknownTeam(_) => {
                ApiError::BadRequest(err.to_string())
            }
            VoteError::NotCurrent { .. } => ApiError::Forbidden(err.to_string()),
            VoteError::NoCurrentSnapshot => ApiError::Unavailable(err.to_string()),
            VoteError::Rankings(_) | VoteError::Store(_) | VoteError::Stats(_) => {
                ApiError::internal(err.to_string(), err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn maps_vote_errors_to_statuses() {
        let d = NaiveDate::from_ymd_opt(2025, 11, 12).unwrap();
        let cases = [
            (VoteError::InvalidDate("x".into()), StatusCode::BAD_REQUEST),
            (VoteError::UnknownTeam("DUKE".into()), StatusCode::BAD_REQUEST),
            (
                VoteError::NotCurrent {
                    requested: d.pred_opt().unwrap(),
                    current: d,
                },
                StatusCode::FORBIDDEN,
            ),
            (VoteError::NoCurrentSnapshot, StatusCode::SERVICE_UNAVAILABLE),
            (
                VoteError::Store(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }

    #[test]
    fn maps_rankings_errors_to_statuses() {
        let cases = [
            (RankingsError::InvalidDate("25-1-1".into()), StatusCode::BAD_REQUEST),
            (RankingsError::NotFound("rankings".into()), StatusCode::NOT_FOUND),
            (RankingsError::NoCurrentSnapshot, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), expected);
        }
    }
}
