pub mod check_file;
pub mod langs;
pub mod run;

use std::path::PathBuf;

use runprobe_core::Config;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    /// Config file; defaults to the nearest `runprobe.toml`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the runner's REST API.
    #[arg(long, global = true)]
    pub server: Option<String>,

    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    #[command(alias("r"))]
    Run(run::Args),

    Langs(langs::Args),

    CheckFile(check_file::Args),
}

/// Ok value is the process exit status.
pub type SubcmdResult = anyhow::Result<i32>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self, cfg: &Config) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Run(args) => run::exec(args, cfg).await,
            Langs(args) => langs::exec(args, cfg).await,
            CheckFile(args) => check_file::exec(args, cfg).await,
        }
    }
}

#[cfg(test)]
mod test {
    use clap::{CommandFactory, Parser};

    use super::*;

    #[test]
    fn verify_cli() {
        GlobalArgs::command().debug_assert();
    }

    #[test]
    fn parse_run_with_languages() {
        let args = GlobalArgs::parse_from([
            "runprobe", "--server", "http://h/api", "run", "c", "sh", "--strict", "--parallel", "3",
        ]);
        assert_eq!(args.server.as_deref(), Some("http://h/api"));
        let Subcommand::Run(run) = args.subcmd else {
            panic!("expected run subcommand")
        };
        assert_eq!(run.langs, vec!["c", "sh"]);
        assert!(run.strict);
        assert_eq!(run.parallel, Some(3));
        assert!(!run.no_parallel);
    }

    #[test]
    fn parse_check_file() {
        let args = GlobalArgs::parse_from(["runprobe", "check-file", "abc123", "-v"]);
        assert!(args.verbose);
        let Subcommand::CheckFile(a) = args.subcmd else {
            panic!("expected check-file subcommand")
        };
        assert_eq!(a.file_id, "abc123");
    }
}
