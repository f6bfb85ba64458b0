//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::OrderNotFound | Self::CardNotFound => StatusCode::NOT_FOUND,

            Self::AlreadyExists | Self::EmailAlreadyRegistered => StatusCode::CONFLICT,

            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,

            // Gateway failures surface as generic 500s
            Self::InternalError
            | Self::PaymentGatewayNotConfigured
            | Self::InvoiceCreationFailed => StatusCode::INTERNAL_SERVER_ERROR,

            Self::ValidationFailed
            | Self::InvalidRequest
            | Self::RequiredField
            | Self::OrderEmpty
            | Self::OrderInvalidStatus
            | Self::PaymentInvalidAmount
            | Self::CardInvalidPrice
            | Self::CardInvalidRarity => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::OrderNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::CardNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(
            ErrorCode::InvalidCredentials.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::EmailAlreadyRegistered.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_gateway_failures_are_internal() {
        assert_eq!(
            ErrorCode::InvoiceCreationFailed.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ErrorCode::PaymentGatewayNotConfigured.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_bad_request_status() {
        for code in [
            ErrorCode::ValidationFailed,
            ErrorCode::InvalidRequest,
            ErrorCode::RequiredField,
            ErrorCode::OrderEmpty,
            ErrorCode::PaymentInvalidAmount,
            ErrorCode::OrderInvalidStatus,
            ErrorCode::CardInvalidRarity,
        ] {
            assert_eq!(code.http_status(), StatusCode::BAD_REQUEST, "{code}");
        }
    }
}
