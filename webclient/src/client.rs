use std::sync::Arc;

use base64::Engine as _;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::*,
    http::{self, Endpoint, HttpRequest, HttpResponse, StatusCode, Transport, ACCEPT, CONTENT_TYPE},
    model::*,
};

const MIME_JSON: &str = "application/json";
const MIME_JSON_UTF8: &str = "application/json; charset=utf-8";
const MIME_TEXT: &str = "text/plain";

const RUNS_PATH: &str = "/runs/";
const LANGUAGES_PATH: &str = "/languages";

fn file_path(file_id: &str) -> String {
    format!("/files/{}", file_id)
}

/// A file upload or presence check that did not confirm `204`.
///
/// Staging is best-effort: anomalies are reported but never abort a run.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StagingAnomaly {
    #[error("Put file '{file_id}' responded '{status}' (expected '204 No Content')")]
    UnexpectedPutStatus { file_id: String, status: StatusCode },

    #[error("Put file '{file_id}' failed: {reason}")]
    PutFailed { file_id: String, reason: String },

    #[error("Put file/check file failed ('{status}'): file '{file_id}' not found")]
    NotFound { file_id: String, status: StatusCode },

    #[error("Check file '{file_id}' failed: {reason}")]
    CheckFailed { file_id: String, reason: String },
}

/// Outcome of one accepted submission, together with any staging trouble
/// that preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub outcome: Outcome,
    pub anomalies: Vec<StagingAnomaly>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct PutFileRequest {
    file_contents: String,
}

/// Client of the runner service REST API.
///
/// Cheap to clone; clones share one [`Transport`] and may be used from
/// concurrent tasks.
#[derive(Clone)]
pub struct RunnerClient {
    transport: Arc<dyn Transport>,
}

impl RunnerClient {
    pub fn new(endpoint: Endpoint) -> Result<Self> {
        Ok(Self::with_transport(Arc::new(http::Client::new(endpoint)?)))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Upload `file` (base64-encoded) to `/files/{id}`.
    ///
    /// Returns the response status; a status other than `204` is not an error
    /// here, the following [`RunnerClient::check_file`] decides.
    pub async fn put_file(&self, file: &FileDescriptor) -> Result<StatusCode> {
        let body = PutFileRequest {
            file_contents: base64::engine::general_purpose::STANDARD.encode(&file.contents),
        };
        let req = HttpRequest::put(file_path(&file.id))
            .header(CONTENT_TYPE, MIME_JSON)?
            .header(ACCEPT, MIME_TEXT)?
            .json(&body)?;
        let resp = self.transport.send(req).await?;
        if resp.status != StatusCode::NO_CONTENT {
            log::debug!(
                "Response to putting {}: {} {:?}",
                file.id,
                resp.status,
                truncate(&resp.body, 4096)
            );
        }
        Ok(resp.status)
    }

    /// `204` means present and `404` absent; any status is returned as is.
    pub async fn check_file(&self, file_id: &str) -> Result<StatusCode> {
        let req = HttpRequest::head(file_path(file_id)).header(ACCEPT, MIME_TEXT)?;
        let resp = self.transport.send(req).await?;
        log::debug!("Status of file {}: {}", file_id, resp.status);
        Ok(resp.status)
    }

    /// Put then check each file in order, collecting anomalies instead of
    /// stopping at the first one.
    pub async fn stage_files(&self, files: &[FileDescriptor]) -> Vec<StagingAnomaly> {
        let mut anomalies = Vec::new();
        for file in files {
            let file_id = file.id.clone();
            match self.put_file(file).await {
                Ok(StatusCode::NO_CONTENT) => (),
                Ok(status) => anomalies.push(StagingAnomaly::UnexpectedPutStatus {
                    file_id: file_id.clone(),
                    status,
                }),
                Err(e) => anomalies.push(StagingAnomaly::PutFailed {
                    file_id: file_id.clone(),
                    reason: format!("{:#}", e),
                }),
            }
            match self.check_file(&file.id).await {
                Ok(StatusCode::NO_CONTENT) => (),
                Ok(status) => anomalies.push(StagingAnomaly::NotFound { file_id, status }),
                Err(e) => anomalies.push(StagingAnomaly::CheckFailed {
                    file_id,
                    reason: format!("{:#}", e),
                }),
            }
        }
        for a in &anomalies {
            log::warn!("{}", a);
        }
        anomalies
    }

    /// Stage the test's files, then run it and decode the outcome.
    ///
    /// Blocks until the server has finished executing the program.
    /// `204 No Content` yields an empty [`Outcome`].
    pub async fn submit(&self, testcase: &TestCase, debug: bool) -> Result<Submission> {
        let anomalies = self.stage_files(&testcase.files).await;

        let req = HttpRequest::post(RUNS_PATH)
            .header(CONTENT_TYPE, MIME_JSON_UTF8)?
            .header(ACCEPT, MIME_JSON)?
            .json(&RunRequest {
                run_spec: testcase.run_spec(debug),
            })?;
        let resp = self.transport.send(req).await?;
        let outcome = decode_json_or_default(resp, RUNS_PATH)?;

        Ok(Submission { outcome, anomalies })
    }

    pub async fn list_languages(&self) -> Result<Vec<LangVersion>> {
        let req = HttpRequest::get(LANGUAGES_PATH)
            .header(CONTENT_TYPE, MIME_JSON_UTF8)?
            .header(ACCEPT, MIME_JSON)?;
        let resp = self.transport.send(req).await?;
        if resp.status.is_client_error() || resp.status.is_server_error() {
            return Err(Error::UnexpectedResponseCode {
                got: resp.status,
                expected: StatusCode::OK,
                requested_path: LANGUAGES_PATH.to_owned(),
            });
        }
        decode_json_or_default(resp, LANGUAGES_PATH)
    }
}

/// `204` or an empty body decodes to `T::default()`.
fn decode_json_or_default<T>(resp: HttpResponse, requested_path: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    if resp.status == StatusCode::NO_CONTENT || resp.body.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&resp.body).map_err(|e| Error::UndecodableBody {
        status: resp.status,
        body: truncate(&resp.body, 4096).to_owned(),
        requested_path: requested_path.to_owned(),
        source: e,
    })
}

fn truncate(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
