use wasm_bindgen::JsValue;

use hxbusy_core::ConfigError;

/// Errors raised by [`install`](crate::install).
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("no window or document available")]
    NoDocument,
    #[error("busy indicators are already installed")]
    AlreadyInstalled,
    #[error("invalid configuration object: {0}")]
    Deserialize(#[from] serde_wasm_bindgen::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("DOM call failed: {0}")]
    Dom(String),
}

impl InstallError {
    pub(crate) fn dom(err: JsValue) -> Self {
        Self::Dom(format!("{err:?}"))
    }
}

impl From<InstallError> for JsValue {
    fn from(err: InstallError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}
