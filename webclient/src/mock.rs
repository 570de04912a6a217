//! In-memory stand-in for the runner service.
//!
//! Understands just enough of the API to drive the client: file staging,
//! `c` programs made of `printf` calls, `sh` programs running `ls`, and the
//! language list.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use base64::Engine as _;
use serde::Deserialize;

use crate::{
    error::*,
    http::{HttpRequest, HttpResponse, Method, StatusCode, Transport},
    model::*,
};

#[derive(Debug, Default)]
struct Gauge {
    current: usize,
    max: usize,
    total: usize,
}

pub struct FakeRunner {
    files: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<HttpRequest>>,
    runs: Mutex<Gauge>,
    reject_uploads: bool,
    runs_response: Option<(StatusCode, String)>,
    line_delay: Duration,
    languages: Vec<LangVersion>,
}

#[derive(Deserialize)]
struct PutBody {
    file_contents: String,
}

#[derive(Deserialize)]
struct RunBody {
    run_spec: RunSpecBody,
}

#[derive(Deserialize)]
struct RunSpecBody {
    language_id: String,
    sourcecode: String,
    sourcefilename: String,
    #[serde(default)]
    file_list: Vec<FileRef>,
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            runs: Mutex::new(Gauge::default()),
            reject_uploads: false,
            runs_response: None,
            line_delay: Duration::ZERO,
            languages: vec![
                LangVersion::new("c", "11.4.0"),
                LangVersion::new("mvn", "3.6.3"),
                LangVersion::new("sh", "5.1.16"),
            ],
        }
    }

    /// Answer every `PUT /files/..` with `403` and store nothing.
    pub fn rejecting_uploads(mut self) -> Self {
        self.reject_uploads = true;
        self
    }

    /// Answer every `POST /runs/` with this canned response.
    pub fn responding_to_runs(mut self, status: StatusCode, body: impl Into<String>) -> Self {
        self.runs_response = Some((status, body.into()));
        self
    }

    /// Pause between two lines of program output, like a `sleep` in the program.
    pub fn line_delay(mut self, delay: Duration) -> Self {
        self.line_delay = delay;
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn staged_file(&self, file_id: &str) -> Option<String> {
        self.files.lock().unwrap().get(file_id).cloned()
    }

    /// Largest number of runs that were executing at the same time.
    pub fn max_concurrent_runs(&self) -> usize {
        self.runs.lock().unwrap().max
    }

    pub fn total_runs(&self) -> usize {
        self.runs.lock().unwrap().total
    }

    fn put_file(&self, file_id: &str, body: Option<&str>) -> HttpResponse {
        if self.reject_uploads {
            return HttpResponse::new(StatusCode::FORBIDDEN, r#""Forbidden""#);
        }
        let decoded = body
            .and_then(|b| serde_json::from_str::<PutBody>(b).ok())
            .and_then(|b| {
                base64::engine::general_purpose::STANDARD
                    .decode(b.file_contents)
                    .ok()
            })
            .and_then(|bytes| String::from_utf8(bytes).ok());
        match decoded {
            Some(contents) => {
                self.files
                    .lock()
                    .unwrap()
                    .insert(file_id.to_owned(), contents);
                HttpResponse::new(StatusCode::NO_CONTENT, "")
            }
            None => HttpResponse::new(StatusCode::BAD_REQUEST, r#""Bad file contents""#),
        }
    }

    fn check_file(&self, file_id: &str) -> HttpResponse {
        if self.files.lock().unwrap().contains_key(file_id) {
            HttpResponse::new(StatusCode::NO_CONTENT, "")
        } else {
            HttpResponse::new(StatusCode::NOT_FOUND, "")
        }
    }

    async fn run(&self, body: Option<&str>) -> Result<HttpResponse> {
        if let Some((status, body)) = &self.runs_response {
            return Ok(HttpResponse::new(*status, body.clone()));
        }
        let Some(RunBody { run_spec }) = body.and_then(|b| serde_json::from_str(b).ok()) else {
            return Ok(HttpResponse::new(StatusCode::BAD_REQUEST, r#""Bad run_spec""#));
        };

        {
            let mut g = self.runs.lock().unwrap();
            g.current += 1;
            g.total += 1;
            g.max = g.max.max(g.current);
        }
        let outcome = self.execute(&run_spec).await;
        self.runs.lock().unwrap().current -= 1;

        let resp = match outcome {
            Some(outcome) => HttpResponse::new(StatusCode::OK, serde_json::to_string(&outcome)?),
            None => HttpResponse::new(
                StatusCode::BAD_REQUEST,
                format!("\"Error: invalid language '{}'\"", run_spec.language_id),
            ),
        };
        Ok(resp)
    }

    async fn execute(&self, spec: &RunSpecBody) -> Option<Outcome> {
        let mut outcome = Outcome {
            cmpinfo: Some(String::new()),
            stdout: Some(String::new()),
            stderr: Some(String::new()),
            ..Default::default()
        };
        outcome
            .extra
            .insert("run_id".to_owned(), serde_json::Value::Null);

        match spec.language_id.as_str() {
            "c" => {
                if !spec.sourcecode.contains("main") {
                    outcome.outcome = Some(OutcomeCode::CompileError);
                    outcome.cmpinfo = Some("undefined reference to `main'".to_owned());
                    return Some(outcome);
                }
                let mut stdout = String::new();
                for (i, line) in printf_literals(&spec.sourcecode).into_iter().enumerate() {
                    if i > 0 && !self.line_delay.is_zero() {
                        tokio::time::sleep(self.line_delay).await;
                    }
                    stdout.push_str(&line);
                }
                outcome.outcome = Some(OutcomeCode::Success);
                outcome.stdout = Some(stdout);
            }
            "sh" => {
                if spec.sourcecode.trim() == "ls" {
                    let mut names: Vec<&str> = spec
                        .file_list
                        .iter()
                        .map(|FileRef(_, name)| name.as_str())
                        .chain([spec.sourcefilename.as_str()])
                        .collect();
                    names.sort_unstable();
                    outcome.outcome = Some(OutcomeCode::Success);
                    outcome.stdout = Some(names.iter().map(|n| format!("{}\n", n)).collect());
                } else {
                    outcome.outcome = Some(OutcomeCode::RuntimeError);
                    outcome.stderr = Some(format!("{}: command not found\n", spec.sourcecode));
                }
            }
            "mvn" => {
                outcome.outcome = Some(OutcomeCode::Success);
                outcome.stdout = Some("[INFO] Scanning for projects...\n".to_owned());
            }
            _ => return None,
        }
        Some(outcome)
    }
}

/// String literals passed to `printf`, with `\n` unescaped.
fn printf_literals(source: &str) -> Vec<String> {
    source
        .split("printf(\"")
        .skip(1)
        .filter_map(|rest| rest.split_once("\")"))
        .map(|(lit, _)| lit.replace("\\n", "\n"))
        .collect()
}

#[async_trait]
impl Transport for FakeRunner {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(req.clone());

        let body = req.body.as_deref();
        let resp = match (&req.method, req.path.as_str()) {
            (&Method::PUT, path) if path.starts_with("/files/") => {
                self.put_file(&path["/files/".len()..], body)
            }
            (&Method::HEAD, path) if path.starts_with("/files/") => {
                self.check_file(&path["/files/".len()..])
            }
            (&Method::POST, "/runs/") => self.run(body).await?,
            (&Method::GET, "/languages") => {
                HttpResponse::new(StatusCode::OK, serde_json::to_string(&self.language_pairs())?)
            }
            _ => HttpResponse::new(StatusCode::NOT_FOUND, ""),
        };
        Ok(resp)
    }
}

impl FakeRunner {
    fn language_pairs(&self) -> Vec<(&str, &str)> {
        self.languages
            .iter()
            .map(|l| (l.id.as_str(), l.version.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_printf_literals() {
        let src = r#"int main() { printf("Hello 1\n"); sleep(2); printf("Hello 2\n"); }"#;
        assert_eq!(printf_literals(src), vec!["Hello 1\n", "Hello 2\n"]);
        assert!(printf_literals("int main() {}").is_empty());
    }
}
