use lazy_regex::Regex;
use runprobe_webclient::{Expectation, Expectations, FieldValue, Outcome, OutcomeField};
use serde::{Deserialize, Serialize};

/// How many expected fields must match for a test to pass.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
pub enum VerifyMode {
    /// Every expected field must be present, and one matching field is enough.
    #[default]
    #[serde(rename = "any")]
    #[strum(serialize = "any")]
    AnyMatch,

    /// Every expected field must be present and match.
    #[serde(rename = "all")]
    #[strum(serialize = "all")]
    AllMatch,
}

/// Field-by-field comparison of an outcome against expectations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    pub missing: Vec<OutcomeField>,
    pub matched: Vec<OutcomeField>,
    pub mismatched: Vec<OutcomeField>,
}

impl Verification {
    pub fn check(expect: &Expectations, actual: &Outcome) -> Self {
        let mut v = Self::default();
        for (&field, expectation) in expect {
            match actual.field(field) {
                None => v.missing.push(field),
                Some(value) if self::matches(expectation, value) => v.matched.push(field),
                Some(_) => v.mismatched.push(field),
            }
        }
        v
    }

    pub fn passes(&self, mode: VerifyMode) -> bool {
        if !self.missing.is_empty() {
            return false;
        }
        match mode {
            VerifyMode::AnyMatch => !self.matched.is_empty(),
            VerifyMode::AllMatch => !self.matched.is_empty() && self.mismatched.is_empty(),
        }
    }
}

/// True iff `actual` satisfies `expect` under `mode`.
///
/// An absent expected field fails regardless of mode. An empty `expect`
/// never passes.
pub fn verify(expect: &Expectations, actual: &Outcome, mode: VerifyMode) -> bool {
    let v = Verification::check(expect, actual);
    let passed = v.passes(mode);
    if passed && !v.mismatched.is_empty() {
        log::warn!(
            "Passed on a partial match; not matching: {}",
            join_fields(&v.mismatched)
        );
    }
    passed
}

/// Integers compare for equality; patterns are searched for anywhere in the value.
pub fn matches(expectation: &Expectation, value: FieldValue) -> bool {
    match (expectation, value) {
        (Expectation::Code(want), FieldValue::Code(got)) => *want == got,
        (Expectation::Code(want), FieldValue::Text(got)) => got == want.to_string(),
        (Expectation::Pattern(pat), value) => match Regex::new(pat) {
            Ok(re) => re.is_match(&value.to_string()),
            Err(e) => {
                log::warn!("Invalid pattern {:?}: {}", pat, e);
                false
            }
        },
    }
}

pub(crate) fn join_fields(fields: &[OutcomeField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod test {
    use maplit::btreemap;
    use runprobe_webclient::OutcomeCode;

    use super::*;

    fn pattern(s: &str) -> Expectation {
        Expectation::Pattern(s.to_owned())
    }

    fn outcome(code: i64, stdout: &str) -> Outcome {
        Outcome {
            outcome: Some(OutcomeCode::from(code)),
            cmpinfo: Some(String::new()),
            stdout: Some(stdout.to_owned()),
            stderr: Some(String::new()),
            ..Default::default()
        }
    }

    #[test]
    fn hello_outcome_is_good() {
        let expect = btreemap! {
            OutcomeField::Outcome => Expectation::Code(15),
            OutcomeField::Stdout => pattern("Hello 1\nHello 2\n"),
        };
        let actual = outcome(15, "Hello 1\nHello 2\n");
        assert!(verify(&expect, &actual, VerifyMode::AnyMatch));
        assert!(verify(&expect, &actual, VerifyMode::AllMatch));
    }

    #[test]
    fn pattern_is_a_search_not_full_match() {
        let expect = btreemap! { OutcomeField::Stdout => pattern(".*prog.sh.*") };
        let actual = outcome(15, "a.out\nprog.sh\nzzz\n");
        assert!(verify(&expect, &actual, VerifyMode::AllMatch));

        let expect = btreemap! { OutcomeField::Stdout => pattern("INFO") };
        let actual = outcome(15, "[INFO] Scanning for projects...\n");
        assert!(verify(&expect, &actual, VerifyMode::AllMatch));
    }

    #[test]
    fn any_match_passes_when_one_field_matches() {
        let expect = btreemap! {
            OutcomeField::Outcome => Expectation::Code(15),
            OutcomeField::Stdout => pattern("^Hello 3$"),
        };
        let actual = outcome(15, "Hello 1\nHello 2\n");
        assert!(verify(&expect, &actual, VerifyMode::AnyMatch));
        assert!(!verify(&expect, &actual, VerifyMode::AllMatch));
    }

    #[test]
    fn nothing_matching_fails_in_both_modes() {
        let expect = btreemap! {
            OutcomeField::Outcome => Expectation::Code(11),
            OutcomeField::Stdout => pattern("Goodbye"),
        };
        let actual = outcome(15, "Hello 1\nHello 2\n");
        assert!(!verify(&expect, &actual, VerifyMode::AnyMatch));
        assert!(!verify(&expect, &actual, VerifyMode::AllMatch));
    }

    #[test]
    fn absent_field_fails_regardless_of_other_fields() {
        let expect = btreemap! {
            OutcomeField::Outcome => Expectation::Code(15),
            OutcomeField::Stdout => pattern("Hello"),
        };
        let actual = Outcome {
            outcome: Some(OutcomeCode::Success),
            ..Default::default()
        };
        assert!(!verify(&expect, &actual, VerifyMode::AnyMatch));
        assert!(!verify(&expect, &actual, VerifyMode::AllMatch));

        let v = Verification::check(&expect, &actual);
        assert_eq!(v.missing, vec![OutcomeField::Stdout]);
        assert_eq!(v.matched, vec![OutcomeField::Outcome]);
    }

    #[test]
    fn empty_outcome_fails() {
        let expect = btreemap! { OutcomeField::Stdout => pattern(".*") };
        assert!(!verify(&expect, &Outcome::default(), VerifyMode::AnyMatch));
    }

    #[test]
    fn empty_expectations_never_pass() {
        let actual = outcome(15, "x");
        assert!(!verify(&Expectations::new(), &actual, VerifyMode::AnyMatch));
        assert!(!verify(&Expectations::new(), &actual, VerifyMode::AllMatch));
    }

    #[test]
    fn code_against_text_and_pattern_against_code() {
        assert!(matches(&Expectation::Code(15), FieldValue::Text("15")));
        assert!(!matches(&Expectation::Code(15), FieldValue::Text("150")));
        assert!(matches(&pattern("^1[0-9]$"), FieldValue::Code(15)));
        assert!(!matches(&pattern("^2"), FieldValue::Code(15)));
    }

    #[test]
    fn invalid_pattern_does_not_match() {
        assert!(!matches(&pattern("(unclosed"), FieldValue::Text("(unclosed")));
    }

    #[test]
    fn verify_mode_names() {
        assert_eq!(VerifyMode::AnyMatch.to_string(), "any");
        let m: VerifyMode = serde_json::from_str(r#""all""#).unwrap();
        assert_eq!(m, VerifyMode::AllMatch);
    }
}
