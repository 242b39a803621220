use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use order_porter_engine::{transfers::TransferError, warehouse::WarehouseError, PorterError, WorkerError};
use thiserror::Error;
use vivid_tools::VividApiError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    Busy(String),
    #[error("{0}")]
    CannotTransfer(String),
    #[error("Too many requests. Vivid Seats asked us to slow down; wait a minute before trying again.")]
    RateLimited,
    #[error("Vivid Seats returned an error. {0}")]
    UpstreamError(String),
    #[error("Unavailable. {0}")]
    Unavailable(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Busy(_) => StatusCode::CONFLICT,
            Self::CannotTransfer(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<VividApiError> for ServerError {
    fn from(e: VividApiError) -> Self {
        match e {
            VividApiError::MissingCredential => Self::Unavailable(e.to_string()),
            VividApiError::RateLimited => Self::RateLimited,
            VividApiError::InvalidRequest(msg) => Self::InvalidRequestBody(msg),
            VividApiError::Initialization(msg) => Self::InitializeError(msg),
            e => Self::UpstreamError(e.to_string()),
        }
    }
}

impl From<PorterError> for ServerError {
    fn from(e: PorterError) -> Self {
        match e {
            PorterError::Vendor(e) => e.into(),
            PorterError::Worker(WorkerError::Vendor(e)) => e.into(),
            PorterError::Worker(WorkerError::Busy) => Self::Busy(WorkerError::Busy.to_string()),
            PorterError::Worker(e) => Self::BackendError(e.to_string()),
            PorterError::Transfer(TransferError::Vendor(e)) => e.into(),
            PorterError::Transfer(e @ TransferError::UnknownOrder(_)) => Self::NoRecordFound(e.to_string()),
            PorterError::Transfer(e @ TransferError::InvalidRequest(_)) => Self::InvalidRequestBody(e.to_string()),
            PorterError::Transfer(TransferError::Store(e)) => Self::BackendError(e.to_string()),
            PorterError::Transfer(e) => Self::CannotTransfer(e.to_string()),
            PorterError::Warehouse(e @ (WarehouseError::NotConfigured | WarehouseError::ConnectionError(_))) => {
                Self::Unavailable(e.to_string())
            },
            PorterError::Warehouse(e) => Self::BackendError(e.to_string()),
            PorterError::Store(e) => Self::BackendError(e.to_string()),
            PorterError::Export(e) => Self::BackendError(e.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn vendor_errors_map_to_statuses() {
        let status = |e: PorterError| ServerError::from(e).status_code();
        assert_eq!(status(PorterError::Vendor(VividApiError::RateLimited)), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            status(PorterError::Worker(WorkerError::Vendor(VividApiError::MissingCredential))),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status(PorterError::Vendor(VividApiError::ApiError { status: 401, message: "no".into() })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status(PorterError::Worker(WorkerError::Busy)), StatusCode::CONFLICT);
        assert_eq!(
            status(PorterError::Transfer(TransferError::NotTransferable("1".into()))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status(PorterError::Transfer(TransferError::UnknownOrder("1".into()))), StatusCode::NOT_FOUND);
        assert_eq!(status(PorterError::Warehouse(WarehouseError::NotConfigured)), StatusCode::SERVICE_UNAVAILABLE);
    }
}
