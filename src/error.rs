//! Crate error type

/// Errors surfaced by storage, configuration and browser glue.
///
/// Gameplay itself never fails: input with nothing held, merges against
/// removed bodies and similar cases are silently skipped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("local storage unavailable")]
    StorageUnavailable,

    #[error("storage access failed for key '{key}': {message}")]
    Storage { key: String, message: String },

    #[error("browser API error: {0}")]
    Browser(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(target_arch = "wasm32")]
impl From<wasm_bindgen::JsValue> for Error {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Error::Browser(format!("{:?}", value))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
