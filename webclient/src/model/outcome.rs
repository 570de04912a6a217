use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric code classifying how a submitted run concluded.
///
/// The set of known codes is closed; anything else the server sends is kept
/// verbatim in [`OutcomeCode::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum OutcomeCode {
    /// Code 0, also reported as a successful run.
    SuccessZero,
    CompileError,
    RuntimeError,
    TimeLimitExceeded,
    Success,
    MemoryLimitExceeded,
    IllegalSystemCall,
    InternalError,
    ServerOverload,
    Unknown(i64),
}

impl OutcomeCode {
    pub const fn code(&self) -> i64 {
        use OutcomeCode::*;
        match *self {
            SuccessZero => 0,
            CompileError => 11,
            RuntimeError => 12,
            TimeLimitExceeded => 13,
            Success => 15,
            MemoryLimitExceeded => 17,
            IllegalSystemCall => 19,
            InternalError => 20,
            ServerOverload => 21,
            Unknown(code) => code,
        }
    }

    pub const fn label(&self) -> &'static str {
        use OutcomeCode::*;
        match self {
            SuccessZero | Success => "Successful run",
            CompileError => "Compile error",
            RuntimeError => "Runtime error",
            TimeLimitExceeded => "Time limit exceeded",
            MemoryLimitExceeded => "Memory limit exceeded",
            IllegalSystemCall => "Illegal system call",
            InternalError => "Internal error, please report",
            ServerOverload => "Server overload. Excessive parallelism?",
            Unknown(_) => "Unknown outcome",
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, OutcomeCode::SuccessZero | OutcomeCode::Success)
    }
}

impl From<i64> for OutcomeCode {
    fn from(code: i64) -> Self {
        use OutcomeCode::*;
        match code {
            0 => SuccessZero,
            11 => CompileError,
            12 => RuntimeError,
            13 => TimeLimitExceeded,
            15 => Success,
            17 => MemoryLimitExceeded,
            19 => IllegalSystemCall,
            20 => InternalError,
            21 => ServerOverload,
            _ => Unknown(code),
        }
    }
}

impl From<OutcomeCode> for i64 {
    fn from(code: OutcomeCode) -> Self {
        code.code()
    }
}

impl fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

/// Decoded result of one run, as returned by `POST /runs/`.
///
/// Every field is optional: a `204 No Content` response decodes to an outcome
/// with no fields at all. Fields this crate doesn't model (e.g. `run_id`) are
/// kept in `extra` so the full response can be shown for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<OutcomeCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cmpinfo: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stdout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Outcome {
    pub fn is_empty(&self) -> bool {
        self.outcome.is_none()
            && self.cmpinfo.is_none()
            && self.stdout.is_none()
            && self.stderr.is_none()
            && self.extra.is_empty()
    }

    pub fn field(&self, field: OutcomeField) -> Option<FieldValue> {
        match field {
            OutcomeField::Outcome => self.outcome.map(|c| FieldValue::Code(c.code())),
            OutcomeField::Cmpinfo => self.cmpinfo.as_deref().map(FieldValue::Text),
            OutcomeField::Stdout => self.stdout.as_deref().map(FieldValue::Text),
            OutcomeField::Stderr => self.stderr.as_deref().map(FieldValue::Text),
        }
    }
}

/// Name of an [`Outcome`] field that test expectations may refer to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase", try_from = "String")]
#[strum(serialize_all = "lowercase")]
pub enum OutcomeField {
    Outcome,
    Cmpinfo,
    Stdout,
    Stderr,
}

impl TryFrom<String> for OutcomeField {
    type Error = strum::ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Code(i64),
    Text(&'a str),
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FieldValue::Code(code) => write!(f, "{}", code),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn known_codes_map_to_labels() {
        let table: [(i64, &str); 9] = [
            (0, "Successful run"),
            (11, "Compile error"),
            (12, "Runtime error"),
            (13, "Time limit exceeded"),
            (15, "Successful run"),
            (17, "Memory limit exceeded"),
            (19, "Illegal system call"),
            (20, "Internal error, please report"),
            (21, "Server overload. Excessive parallelism?"),
        ];
        for (code, label) in table {
            let c = OutcomeCode::from(code);
            assert_eq!(c.label(), label, "code {}", code);
            assert_eq!(c.code(), code);
            assert!(!matches!(c, OutcomeCode::Unknown(_)));
        }
    }

    #[test]
    fn unknown_code_is_kept() {
        let c = OutcomeCode::from(42_i64);
        assert_eq!(c, OutcomeCode::Unknown(42));
        assert_eq!(c.code(), 42);
        assert!(!c.is_success());
    }

    #[test]
    fn both_success_codes_are_success() {
        assert!(OutcomeCode::from(0_i64).is_success());
        assert!(OutcomeCode::from(15_i64).is_success());
        assert!(!OutcomeCode::from(11_i64).is_success());
    }

    #[test]
    fn decode_outcome_json() {
        let json = r#"{"run_id": null, "outcome": 15, "cmpinfo": "", "stdout": "Hello 1\nHello 2\n", "stderr": ""}"#;
        let o: Outcome = serde_json::from_str(json).unwrap();
        assert_eq!(o.outcome, Some(OutcomeCode::Success));
        assert_eq!(o.cmpinfo.as_deref(), Some(""));
        assert_eq!(o.stdout.as_deref(), Some("Hello 1\nHello 2\n"));
        assert_eq!(o.extra.get("run_id"), Some(&serde_json::Value::Null));

        assert_eq!(o.field(OutcomeField::Outcome), Some(FieldValue::Code(15)));
        assert_eq!(
            o.field(OutcomeField::Stdout),
            Some(FieldValue::Text("Hello 1\nHello 2\n"))
        );
    }

    #[test]
    fn decode_partial_outcome() {
        let o: Outcome = serde_json::from_str(r#"{"outcome": 11, "cmpinfo": "error: x"}"#).unwrap();
        assert_eq!(o.outcome, Some(OutcomeCode::CompileError));
        assert_eq!(o.field(OutcomeField::Stdout), None);
        assert!(!o.is_empty());
        assert!(Outcome::default().is_empty());
    }

    #[test]
    fn field_names_are_lowercase() {
        assert_eq!(OutcomeField::Cmpinfo.to_string(), "cmpinfo");
        let f: OutcomeField = serde_json::from_str(r#""stdout""#).unwrap();
        assert_eq!(f, OutcomeField::Stdout);
        assert!(serde_json::from_str::<OutcomeField>(r#""run_id""#).is_err());
    }
}
