use std::path::PathBuf;

use runprobe_core::{
    action,
    testing::{TestSet, VerifyMode},
    Config,
};

use super::SubcmdResult;
use crate::{config, util};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Languages to test; all languages of the test set when omitted.
    #[arg()] // positional argument
    pub langs: Vec<String>,

    /// TOML test set to use instead of the built-in one.
    #[arg(short, long)]
    pub testset: Option<PathBuf>,

    /// Require every expected field to match.
    #[arg(long)]
    pub strict: bool,

    /// Do not ask the server to keep run directories.
    #[arg(long)]
    pub no_debug: bool,

    /// Number of simultaneous copies of the parallel job.
    #[arg(short = 'n', long, conflicts_with = "no_parallel")]
    pub parallel: Option<usize>,

    #[arg(long)]
    pub no_parallel: bool,
}

pub async fn exec(args: &Args, cfg: &Config) -> SubcmdResult {
    let mut cfg = cfg.clone();
    if args.strict {
        cfg.run.verify_mode = VerifyMode::AllMatch;
    }
    if args.no_debug {
        cfg.run.debug = false;
    }
    if let Some(n) = args.parallel {
        cfg.run.parallel_submits = n;
    }
    if args.no_parallel {
        cfg.run.parallel_submits = 0;
    }

    let testset = match &args.testset {
        Some(path) => TestSet::from_toml_file(path)?,
        None => TestSet::builtin()?,
    };

    let selection = testset.select(&args.langs);
    for lang in &args.langs {
        if !testset.languages().contains(lang.as_str()) {
            log::warn!("No test for language '{}'", lang);
        }
    }

    let client = config::client(&cfg)?;
    log::debug!("Server: {}", cfg.server.base_url);

    let tally = action::do_run(&client, &selection, &cfg.run).await;
    Ok(util::exit_code(tally.failures()))
}
