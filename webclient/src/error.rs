use std::time::Duration;

use reqwest::StatusCode;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to parse as URL '{url}'")]
    InvalidSyntaxUrl {
        url: String,

        #[source]
        source: url::ParseError,
    },

    #[error("Unexpected response code '{got}' while requesting to {requested_url}")]
    UnexpectedResponseCode {
        got: StatusCode,
        requested_url: String,
    },

    #[error("Malformed response from {requested_url}: {source}")]
    MalformedResponse {
        requested_url: String,

        #[source]
        source: serde_json::Error,
    },

    #[error("Missing field '{field}' in response from {requested_url}")]
    MissingField {
        field: &'static str,
        requested_url: String,
    },

    #[error("Request rejected by {requested_url}: {message}")]
    Rejected {
        message: String,
        requested_url: String,
    },

    #[error("Timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),

    #[error("Http error: {0}")]
    Http(#[from] reqwest::Error),
}
