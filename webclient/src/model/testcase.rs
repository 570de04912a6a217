use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::outcome::OutcomeField;

/// Execution-limit options, e.g. `memorylimit`, `cputime`, `numprocs`.
pub type Parameters = BTreeMap<String, serde_json::Number>;

/// Expected value per outcome field.
pub type Expectations = BTreeMap<OutcomeField, Expectation>;

/// One code sample to submit plus what its outcome must look like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub comment: String,
    pub language_id: String,
    pub sourcecode: String,
    pub sourcefilename: String,

    #[serde(default)]
    pub parameters: Parameters,

    /// Standard input for the run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Staged files the run refers to, as `(file_id, filename)`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub file_list: Vec<FileRef>,

    /// Files to stage before the run, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileDescriptor>,

    pub expect: Expectations,
}

/// Auxiliary file to upload before a run.
///
/// `id` must be derived from `contents`; two descriptors with the same id and
/// different contents are a caller error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub id: String,
    pub contents: String,
}

impl FileDescriptor {
    pub fn new(id: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            contents: contents.into(),
        }
    }
}

/// `[file_id, filename]` entry of a run spec's `file_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef(pub String, pub String);

/// An integer is compared for equality; a string is searched for as a regex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Expectation {
    Code(i64),
    Pattern(String),
}

/// Wire-level run request derived from a [`TestCase`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSpec<'a> {
    pub language_id: &'a str,
    pub sourcecode: &'a str,
    pub sourcefilename: &'a str,
    pub parameters: &'a Parameters,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<&'a str>,

    #[serde(skip_serializing_if = "is_empty_slice")]
    pub file_list: &'a [FileRef],

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

fn is_empty_slice<T>(s: &&[T]) -> bool {
    s.is_empty()
}

/// JSON envelope of `POST /runs/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRequest<'a> {
    pub run_spec: RunSpec<'a>,
}

impl TestCase {
    /// Everything but `comment`, `expect` and `files` goes on the wire.
    pub fn run_spec(&self, debug: bool) -> RunSpec<'_> {
        RunSpec {
            language_id: &self.language_id,
            sourcecode: &self.sourcecode,
            sourcefilename: &self.sourcefilename,
            parameters: &self.parameters,
            input: self.input.as_deref(),
            file_list: &self.file_list,
            debug: debug.then_some(true),
        }
    }
}
