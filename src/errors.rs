use actix_multipart::MultipartError;
use actix_web::{
    error::{PayloadError, ResponseError},
    http::{header, StatusCode},
    HttpResponse,
};
use derive_more::Display;
use serde::Serialize;

/// Every way a submission can end without being stored.
///
/// The `Display` text is exactly what the client sees in the `error` field, so
/// variants carrying detail (`InternalFault`) keep it out of the message.
#[derive(Debug, Display)]
pub enum ContactError {
    #[display("Method Not Allowed")]
    MethodNotAllowed,

    #[display("Too many requests. Please try again later.")]
    RateLimited { retry_after_secs: u64 },

    #[display("CAPTCHA verification failed")]
    CaptchaFailed,

    #[display("Missing required fields")]
    MissingFields,

    #[display("Invalid email format")]
    InvalidEmail,

    #[display("Database error")]
    PersistenceFailed,

    #[display("Internal server error")]
    InternalFault(String),
}

impl std::error::Error for ContactError {}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ResponseError for ContactError {
    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());

        if let ContactError::RateLimited { retry_after_secs } = self {
            builder.insert_header((header::RETRY_AFTER, retry_after_secs.to_string()));
        }

        builder.json(ErrorBody {
            success: false,
            error: self.to_string(),
        })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ContactError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ContactError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ContactError::CaptchaFailed => StatusCode::BAD_REQUEST,
            ContactError::MissingFields => StatusCode::BAD_REQUEST,
            ContactError::InvalidEmail => StatusCode::BAD_REQUEST,
            ContactError::PersistenceFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ContactError::InternalFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PayloadError> for ContactError {
    fn from(err: PayloadError) -> Self {
        ContactError::InternalFault(format!("Request body error: {}", err))
    }
}

impl From<MultipartError> for ContactError {
    fn from(err: MultipartError) -> Self {
        ContactError::InternalFault(format!("Multipart error: {}", err))
    }
}

impl From<RepositoryError> for ContactError {
    fn from(_: RepositoryError) -> Self {
        ContactError::PersistenceFailed
    }
}

/// Failures of the shared rate-limit counter store.
#[derive(Debug, Display)]
pub enum StoreError {
    #[display("Store connection failed: {_0}")]
    Connection(String),

    #[display("Store operation failed: {_0}")]
    Operation(String),

    #[display("Store call timed out after {_0:?}")]
    Timeout(std::time::Duration),
}

impl std::error::Error for StoreError {}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Operation(err.to_string())
    }
}

impl From<deadpool_redis::PoolError> for StoreError {
    fn from(err: deadpool_redis::PoolError) -> Self {
        StoreError::Connection(err.to_string())
    }
}

/// Failures talking to the captcha oracle.
#[derive(Debug, Display)]
pub enum CaptchaError {
    #[display("Missing captcha response token")]
    MissingToken,

    #[display("Captcha transport error: {_0}")]
    Transport(String),

    #[display("Captcha oracle returned status {_0}")]
    Status(u16),

    #[display("Captcha oracle returned an unreadable body: {_0}")]
    Decode(String),
}

impl std::error::Error for CaptchaError {}

impl From<reqwest::Error> for CaptchaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            CaptchaError::Decode(err.to_string())
        } else {
            CaptchaError::Transport(err.to_string())
        }
    }
}

/// Failures of the contact record store.
#[derive(Debug, Display)]
pub enum RepositoryError {
    #[display("Database error: {_0}")]
    Database(String),

    #[display("Insert affected no rows")]
    NotInserted,

    #[display("Database call timed out after {_0:?}")]
    Timeout(std::time::Duration),
}

impl std::error::Error for RepositoryError {}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Database(err.to_string())
    }
}
