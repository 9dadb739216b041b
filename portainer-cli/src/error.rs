use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {method} {url}: {source}")]
    Network {
        method: reqwest::Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("server returned {status}: {}", server_message(.message, .details))]
    Server {
        status: u16,
        message: String,
        details: String,
    },
    #[error("{0}")]
    Validation(String),
    #[error("can not find stack with name '{0}'")]
    NotFound(String),
    /// The deploy call failed and so did the update path it fell back to.
    #[error("deploy failed ({deploy}); update fallback failed: {fallback}")]
    DeployFallback {
        deploy: Box<Error>,
        fallback: Box<Error>,
    },
}

impl Error {
    pub fn is_server(&self) -> bool {
        matches!(self, Error::Server { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn server_message(message: &str, details: &str) -> String {
    match (message.trim(), details.trim()) {
        ("", "") => "no message".to_string(),
        (message, "") => message.to_string(),
        ("", details) => details.to_string(),
        (message, details) => format!("{message} ({details})"),
    }
}
