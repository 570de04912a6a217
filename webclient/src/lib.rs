// exported modules
pub mod client;
pub mod error;
pub mod http;
pub mod model;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// re-exports
pub use client::{RunnerClient, StagingAnomaly, Submission};
pub use error::*;
pub use http::{Endpoint, StatusCode, Transport};
pub use model::*;
pub use url::Url;

// internal modules
mod util;

pub use util::parse_url;
