use crate::error::BankError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// HTTP-facing wrapper that maps each [`BankError`] kind to a status code.
#[derive(Debug)]
pub struct ApiError(pub BankError);

impl From<BankError> for ApiError {
    fn from(err: BankError) -> Self {
        ApiError(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_account_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl ErrorBody {
    fn new(status: StatusCode, error: &'static str, message: String) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error,
            message,
            id: None,
            from_account_id: None,
            to_account_id: None,
            field: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let (status, body) = match &err {
            BankError::AccountNotFound(id) | BankError::TransferNotFound(id) => {
                let status = StatusCode::NOT_FOUND;
                let body = ErrorBody {
                    id: Some(*id),
                    ..ErrorBody::new(status, "Not Found", err.to_string())
                };
                (status, body)
            }
            BankError::TransferRejected {
                from_account_id,
                to_account_id,
                reason,
            } => {
                let status = StatusCode::BAD_REQUEST;
                let body = ErrorBody {
                    from_account_id: Some(*from_account_id),
                    to_account_id: Some(*to_account_id),
                    ..ErrorBody::new(status, "Transfer Rejected", reason.to_string())
                };
                (status, body)
            }
            BankError::InvalidAccountData { field, message } => {
                let status = StatusCode::BAD_REQUEST;
                let body = ErrorBody {
                    field: Some(*field),
                    ..ErrorBody::new(status, "Invalid Account Data", message.to_string())
                };
                (status, body)
            }
            BankError::DuplicateAccountNumber(_) | BankError::ConcurrentModification(_) => {
                let status = StatusCode::CONFLICT;
                (status, ErrorBody::new(status, "Conflict", err.to_string()))
            }
            _ => {
                tracing::error!(error = %err, "Request failed");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ErrorBody::new(
                    status,
                    "Internal Server Error",
                    "Unexpected error occurred".to_string(),
                );
                (status, body)
            }
        };
        (status, Json(body)).into_response()
    }
}
