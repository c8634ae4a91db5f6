use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("XML parse error: {0}")]
    Xml(String),
    #[error("registry returned {code}: {message}")]
    Api { code: String, message: String },
}

impl RegistryError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "http")]
            RegistryError::Http(_) => true,
            RegistryError::Server { status, .. } => *status == 429 || *status >= 500,
            RegistryError::Xml(_) | RegistryError::Api { .. } => false,
        }
    }
}
