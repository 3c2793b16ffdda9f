//! Status and body handling shared by every endpoint

use serde::de::DeserializeOwned;
use serde::Deserialize;

use flat_core::{AppError, Result};

/// Error body the backend sends with non-success statuses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Backend message from an error body, if it has one
pub fn error_detail(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    parsed.detail.or(parsed.error).filter(|d| !d.is_empty())
}

/// Fail on any non-2xx status
pub fn check_status(status: u16, body: &[u8]) -> Result<()> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(AppError::status(status, error_detail(body)))
    }
}

/// Check the status, then decode the JSON body
pub fn parse_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T> {
    check_status(status, body)?;

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(AppError::MalformedBody("empty response body".to_string()));
    }
    serde_json::from_slice(body).map_err(|e| AppError::MalformedBody(e.to_string()))
}

/// Value of one cookie in a `Cookie` header
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
