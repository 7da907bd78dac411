//! Conversions from external infrastructure errors into CRMDesk errors.

use std::time::Duration;

use crmdesk_domain::CrmDeskError;
use keyring::Error as KeyringError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;

use crate::api::ApiError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CrmDeskError);

impl From<InfraError> for CrmDeskError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CrmDeskError> for InfraError {
    fn from(value: CrmDeskError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → CrmDeskError */
/* -------------------------------------------------------------------------- */

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        use KeyringError::{
            Ambiguous, BadEncoding, Invalid, NoEntry, NoStorageAccess, PlatformFailure, TooLong,
        };

        let description = value.to_string();

        let mapped = match value {
            NoEntry => CrmDeskError::NotFound("keychain entry not found".into()),
            BadEncoding(_) => {
                CrmDeskError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => CrmDeskError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                CrmDeskError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => CrmDeskError::Storage(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => CrmDeskError::Storage(format!("keychain platform error: {err}")),
            NoStorageAccess(err) => {
                CrmDeskError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => CrmDeskError::Storage(description),
        };

        InfraError(mapped)
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → CrmDeskError */
/* -------------------------------------------------------------------------- */

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(CrmDeskError::Storage(format!("stored value is not valid JSON: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* CrmDeskError → ApiError */
/* -------------------------------------------------------------------------- */

impl From<CrmDeskError> for ApiError {
    fn from(value: CrmDeskError) -> Self {
        match value {
            CrmDeskError::Config(message) => ApiError::Config(message),
            CrmDeskError::Storage(message) | CrmDeskError::NotFound(message) => {
                ApiError::Storage(message)
            }
            CrmDeskError::Network(message) => ApiError::Network(message),
            CrmDeskError::Auth(message) => ApiError::Unauthorized(message),
            CrmDeskError::InvalidInput(message) => ApiError::BadRequest(message),
            CrmDeskError::Internal(message) => ApiError::Config(message),
        }
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ApiError */
/* -------------------------------------------------------------------------- */

/// Map a transport failure (no usable response) into the API taxonomy.
///
/// `timeout` is the configured deadline reported by `ApiError::Timeout`.
pub fn transport_error(err: &HttpError, timeout: Duration) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout(timeout);
    }

    if err.is_builder() {
        return ApiError::Config(format!("invalid request: {err}"));
    }

    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }

    if let Some(status) = err.status() {
        return ApiError::from_status(status.as_u16(), "");
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return ApiError::Network(format!("HTTP connection failure: {err}"));
    }

    ApiError::Network(err.to_string())
}
