//! Submitting test cases and classifying what comes back.
//!
//! Every failure of a single test is captured in its [`TestReport`]; none of
//! these functions return early because one test went wrong.

use std::sync::Arc;
use std::time::{Duration, Instant};

use runprobe_webclient::{RunnerClient, Submission, TestCase};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::RunConfig;
use crate::testing::{verify, Tally, TestReport, TestResult, Verification, VerifyMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub debug: bool,
    pub verify_mode: VerifyMode,
}

impl From<&RunConfig> for RunOptions {
    fn from(cfg: &RunConfig) -> Self {
        Self {
            debug: cfg.debug,
            verify_mode: cfg.verify_mode,
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            debug: true,
            verify_mode: VerifyMode::default(),
        }
    }
}

#[derive(Debug)]
pub struct BatchReport {
    pub reports: Vec<TestReport>,
    pub tally: Tally,
}

#[derive(Debug)]
pub struct ParallelReport {
    /// Ordered by child index, not by completion.
    pub reports: Vec<TestReport>,
    pub tally: Tally,
    pub elapsed: Duration,
}

/// Submit one test and classify the result as GOOD, FAIL or EXCEPTION.
pub async fn run_test(client: &RunnerClient, testcase: &TestCase, opts: &RunOptions) -> TestReport {
    log::debug!(
        "Submitting '{}' ({})",
        testcase.comment,
        testcase.language_id
    );

    let (anomalies, result) = match client.submit(testcase, opts.debug).await {
        Ok(Submission { outcome, anomalies }) => {
            let result = if verify(&testcase.expect, &outcome, opts.verify_mode) {
                TestResult::Good(outcome)
            } else {
                let verification = Verification::check(&testcase.expect, &outcome);
                TestResult::Fail {
                    outcome,
                    verification,
                }
            };
            (anomalies, result)
        }
        Err(e) => {
            log::debug!("'{}' raised: {:#}", testcase.comment, e);
            (Vec::new(), TestResult::Exception(e))
        }
    };

    TestReport {
        comment: testcase.comment.clone(),
        language_id: testcase.language_id.clone(),
        anomalies,
        result,
    }
}

/// Run `tests` one after another in the given order.
///
/// `on_report` sees each report as soon as its test has finished.
pub async fn run_batch(
    client: &RunnerClient,
    tests: &[&TestCase],
    opts: &RunOptions,
    mut on_report: impl FnMut(&TestReport),
) -> BatchReport {
    let mut reports = Vec::with_capacity(tests.len());
    for t in tests {
        let report = self::run_test(client, t, opts).await;
        on_report(&report);
        reports.push(report);
    }
    let tally = reports.iter().collect();
    BatchReport { reports, tally }
}

pub fn child_comment(comment: &str, i: usize) -> String {
    format!("{}. Child{}", comment, i)
}

/// The `i`-th copy of the parallel job: same program, tagged comment.
pub fn child_job(template: &TestCase, i: usize) -> TestCase {
    TestCase {
        comment: self::child_comment(&template.comment, i),
        ..template.clone()
    }
}

/// Submit `n` copies of `template` at once, at most `n` in flight.
///
/// Returns after every copy has finished. `on_done` is called in completion
/// order with the child index.
pub async fn run_parallel(
    client: &RunnerClient,
    template: &TestCase,
    n: usize,
    opts: &RunOptions,
    mut on_done: impl FnMut(usize, &TestReport),
) -> ParallelReport {
    let started = Instant::now();
    let gate = Arc::new(Semaphore::new(n.max(1)));
    let mut tasks = JoinSet::new();

    for i in 0..n {
        let job = self::child_job(template, i);
        let client = client.clone();
        let gate = gate.clone();
        let opts = *opts;
        tasks.spawn(async move {
            // The semaphore is never closed, so acquiring cannot fail.
            let _permit = gate.acquire_owned().await.ok();
            (i, self::run_test(&client, &job, &opts).await)
        });
    }

    let mut slots: Vec<Option<TestReport>> = (0..n).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((i, report)) => {
                on_done(i, &report);
                slots[i] = Some(report);
            }
            Err(e) => log::error!("A parallel submission task died: {}", e),
        }
    }

    let reports: Vec<TestReport> = slots.into_iter().flatten().collect();
    let tally = reports.iter().collect();
    ParallelReport {
        reports,
        tally,
        elapsed: started.elapsed(),
    }
}
