use reqwest::StatusCode;

pub type Result<T> = ::std::result::Result<T, Error>;

/// Any failure of a request/response exchange with the runner service.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to parse as URL '{url}'")]
    InvalidSyntaxUrl {
        url: String,

        #[source]
        source: url::ParseError,
    },

    #[error("Invalid value for header '{name}'")]
    InvalidHeaderValue {
        name: reqwest::header::HeaderName,

        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    #[error("Unexpected response code '{got}' (expected '{expected}') while requesting to {requested_path}")]
    UnexpectedResponseCode {
        got: StatusCode,
        expected: StatusCode,
        requested_path: String,
    },

    #[error("Cannot decode response body of {requested_path} (status '{status}'): {body:?}")]
    UndecodableBody {
        status: StatusCode,
        body: String,
        requested_path: String,

        #[source]
        source: serde_json::Error,
    },

    #[error("Http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
