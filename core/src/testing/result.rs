use runprobe_webclient::{Outcome, StagingAnomaly};

use super::verify::Verification;

/// Classification of one test execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Verdict {
    /// The outcome satisfied the expectations.
    Good,
    /// The exchange succeeded but the outcome did not satisfy the expectations.
    Fail,
    /// The exchange itself failed (transport or decoding).
    Exception,
}

#[derive(Debug)]
pub enum TestResult {
    Good(Outcome),
    Fail {
        outcome: Outcome,
        verification: Verification,
    },
    Exception(runprobe_webclient::Error),
}

impl TestResult {
    pub fn verdict(&self) -> Verdict {
        match self {
            TestResult::Good(_) => Verdict::Good,
            TestResult::Fail { .. } => Verdict::Fail,
            TestResult::Exception(_) => Verdict::Exception,
        }
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            TestResult::Good(outcome) | TestResult::Fail { outcome, .. } => Some(outcome),
            TestResult::Exception(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct TestReport {
    pub comment: String,
    pub language_id: String,
    pub anomalies: Vec<StagingAnomaly>,
    pub result: TestResult,
}

impl TestReport {
    pub fn verdict(&self) -> Verdict {
        self.result.verdict()
    }
}

/// Pass/fail/exception counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub good: usize,
    pub fail: usize,
    pub exception: usize,
}

impl Tally {
    pub fn add(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Good => self.good += 1,
            Verdict::Fail => self.fail += 1,
            Verdict::Exception => self.exception += 1,
        }
    }

    pub fn merge(self, other: Tally) -> Tally {
        Tally {
            good: self.good + other.good,
            fail: self.fail + other.fail,
            exception: self.exception + other.exception,
        }
    }

    pub fn total(&self) -> usize {
        self.good + self.fail + self.exception
    }

    /// Failed plus exceptional tests; zero means everything passed.
    pub fn failures(&self) -> usize {
        self.fail + self.exception
    }

    pub fn all_good(&self) -> bool {
        self.failures() == 0
    }
}

impl<'a> FromIterator<&'a TestReport> for Tally {
    fn from_iter<I: IntoIterator<Item = &'a TestReport>>(iter: I) -> Self {
        iter.into_iter().fold(Tally::default(), |mut t, r| {
            t.add(r.verdict());
            t
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn verdict_names() {
        assert_eq!(Verdict::Good.to_string(), "GOOD");
        assert_eq!(Verdict::Fail.to_string(), "FAIL");
        assert_eq!(Verdict::Exception.to_string(), "EXCEPTION");
    }

    #[test]
    fn tally_counts_failures_and_exceptions() {
        let mut t = Tally::default();
        for v in [Verdict::Good, Verdict::Fail, Verdict::Exception, Verdict::Good] {
            t.add(v);
        }
        assert_eq!(t.total(), 4);
        assert_eq!(t.failures(), 2);
        assert!(!t.all_good());

        let merged = t.merge(Tally {
            good: 1,
            fail: 0,
            exception: 3,
        });
        assert_eq!(
            merged,
            Tally {
                good: 3,
                fail: 1,
                exception: 4,
            }
        );
    }
}
