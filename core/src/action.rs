pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}
use std::time::Duration;

use colored::Colorize;
use error::*;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use runprobe_webclient::{LangVersion, RunnerClient, StatusCode, TestCase};

use crate::config::RunConfig;
use crate::harness::{self, ParallelReport, RunOptions};
use crate::style;
use crate::testing::{Selection, Tally, Verdict};

pub async fn fetch_languages(client: &RunnerClient) -> Result<Vec<LangVersion>> {
    client
        .list_languages()
        .await
        .context("Failed to fetch supported language list")
}

/// Print the server's languages. A failure is logged, never fatal.
pub async fn print_supported_languages(client: &RunnerClient) -> bool {
    match self::fetch_languages(client).await {
        Ok(langs) => {
            style::print_languages(&langs);
            true
        }
        Err(e) => {
            log::error!("{:#}", e);
            false
        }
    }
}

/// `true` iff the server has the file.
pub async fn check_file(client: &RunnerClient, file_id: &str) -> Result<bool> {
    let status = client
        .check_file(file_id)
        .await
        .with_context(|| format!("Failed to check file '{}'", file_id))?;
    match status {
        StatusCode::NO_CONTENT => Ok(true),
        StatusCode::NOT_FOUND => Ok(false),
        other => bail!("Unexpected status checking file '{}': {}", file_id, other),
    }
}

/// Languages, then the sequential tests and their summary, then the
/// parallel job and its summary.
///
/// Returns the tally of every test that ran.
pub async fn do_run(client: &RunnerClient, selection: &Selection<'_>, cfg: &RunConfig) -> Tally {
    let opts = RunOptions::from(cfg);
    self::print_supported_languages(client).await;
    println!();

    let batch = harness::run_batch(client, &selection.tests, &opts, |r| {
        style::print_report(r, cfg.verbose)
    })
    .await;
    println!();
    style::print_summary(&batch.tally);

    let mut total = batch.tally;
    match selection.parallel {
        Some(template) if cfg.parallel_submits > 0 => {
            let report = self::do_parallel(client, template, cfg.parallel_submits, &opts).await;
            style::print_summary(&report.tally);
            total = total.merge(report.tally);
        }
        Some(_) => log::info!("Parallel submissions disabled"),
        None => (),
    }
    total
}

async fn do_parallel(
    client: &RunnerClient,
    template: &TestCase,
    n: usize,
    opts: &RunOptions,
) -> ParallelReport {
    log::info!("Submitting {} copies of '{}' at once", n, template.comment);

    let style = ProgressStyle::default_spinner()
        .template("{spinner} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let progress_bar_container = MultiProgress::new();

    let bars: Vec<ProgressBar> = (0..n)
        .map(|i| {
            let bar = progress_bar_container
                .add(ProgressBar::new_spinner())
                .with_style(style.clone())
                .with_message(format!(
                    "{} ...",
                    harness::child_comment(&template.comment, i)
                ));
            bar.enable_steady_tick(Duration::from_millis(50));
            bar
        })
        .collect();

    let report = harness::run_parallel(client, template, n, opts, |i, r| {
        bars[i].finish_with_message(
            format!("{} ... {}", r.comment, style::verdict_icon(r.verdict()))
                .cyan()
                .to_string(),
        );
    })
    .await;
    println!();

    report
        .reports
        .iter()
        .filter(|r| r.verdict() != Verdict::Good)
        .for_each(|r| style::print_report(r, false));

    log::info!(
        "{} parallel submissions finished in {:.1}s",
        report.reports.len(),
        report.elapsed.as_secs_f64()
    );
    report
}
