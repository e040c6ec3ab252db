use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Every failure a request can end in. The HTTP layer picks status and
/// message from the variant.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Upstream(String),

    #[error("database connection error: {0}")]
    DbConnect(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("{0}")]
    Validation(String),
}

impl AppError {
    /// Message shown inline on HTML pages.
    pub fn page_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("Configuration error: {msg}"),
            Self::Upstream(msg) => msg.clone(),
            Self::DbConnect(_) => "Unable to connect to the database. \
                Please check your connection settings and that the database \
                is reachable from this host."
                .to_string(),
            Self::Database(msg) => format!("Database error: {msg}"),
            Self::Validation(msg) => msg.clone(),
        }
    }

    /// Whether the browser should keep the data locally instead.
    fn use_local_storage(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::DbConnect(_) | Self::Database(_)
        )
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::DbConnect(e.to_string()),
            sqlx::Error::Configuration(_) => Self::Config(e.to_string()),
            _ => Self::Database(e.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::DbConnect(_) | Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            Self::DbConnect(_) => "Database connection unavailable".to_string(),
            Self::Database(_) => "Database unavailable".to_string(),
            Self::Config(msg) | Self::Upstream(msg) | Self::Validation(msg) => msg.clone(),
        };

        let body = if self.use_local_storage() {
            json!({ "success": false, "error": error, "use_localStorage": true })
        } else {
            json!({ "success": false, "error": error })
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    async fn body_of(err: AppError) -> serde_json::Value {
        let bytes = to_bytes(err.error_response().into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn classifies_sqlx_errors() {
        assert!(matches!(
            AppError::from(sqlx::Error::PoolTimedOut),
            AppError::DbConnect(_)
        ));
        assert!(matches!(
            AppError::from(sqlx::Error::Io(std::io::Error::other("refused"))),
            AppError::DbConnect(_)
        ));
        assert!(matches!(
            AppError::from(sqlx::Error::RowNotFound),
            AppError::Database(_)
        ));
    }

    #[test]
    fn picks_status_per_kind() {
        assert_eq!(
            AppError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Upstream("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::DbConnect("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Database("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[actix_web::test]
    async fn database_errors_advise_local_storage() {
        let body = body_of(AppError::DbConnect("refused".into())).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Database connection unavailable");
        assert_eq!(body["use_localStorage"], true);

        let body = body_of(AppError::Database("syntax".into())).await;
        assert_eq!(body["error"], "Database unavailable");
    }

    #[actix_web::test]
    async fn validation_errors_do_not_advise_local_storage() {
        let body = body_of(AppError::Validation("Invalid currency".into())).await;
        assert_eq!(body["error"], "Invalid currency");
        assert!(body.get("use_localStorage").is_none());
    }

    #[test]
    fn page_messages_are_distinct() {
        let connect = AppError::DbConnect("refused".into()).page_message();
        let generic = AppError::Database("boom".into()).page_message();
        let config = AppError::Config("Missing database configuration: host".into()).page_message();
        assert!(connect.starts_with("Unable to connect to the database"));
        assert_eq!(generic, "Database error: boom");
        assert_eq!(config, "Configuration error: Missing database configuration: host");
    }
}
