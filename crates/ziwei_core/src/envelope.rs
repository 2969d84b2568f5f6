//! Lookup response envelope
//!
//! Every lookup entry point returns `{ "success": bool, "data": {...} | null,
//! "error": string | null }` as a JSON string.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> LookupEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Unwrap the payload, enforcing `success == true` iff `data` is present.
    ///
    /// A stray `error` next to a successful payload is ignored.
    pub fn into_result(self) -> Result<T, DecodeError> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(DecodeError::MissingData),
            (false, _) => Err(DecodeError::Reported {
                error: self.error.unwrap_or_default(),
            }),
        }
    }
}

/// Why a lookup produced no data.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("lookup returned no string value")]
    NotText,

    #[error("malformed lookup envelope: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("lookup reported failure: {error}")]
    Reported { error: String },

    #[error("lookup reported success without data")]
    MissingData,
}

/// Decode the raw return value of a lookup call into its payload.
///
/// `raw` is `None` when the runtime returned something other than a string.
pub fn decode_envelope<T: DeserializeOwned>(raw: Option<&str>) -> Result<T, DecodeError> {
    let text = raw.ok_or(DecodeError::NotText)?;
    let envelope: LookupEnvelope<T> = serde_json::from_str(text)?;
    envelope.into_result()
}
