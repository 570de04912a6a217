use runprobe_core::Config;
use runprobe_webclient::{parse_url, RunnerClient};

use crate::{cmd::GlobalArgs, util};

/// Config file, then `RUNPROBE_*` variables, then command line flags.
pub fn resolve(args: &GlobalArgs) -> anyhow::Result<Config> {
    let cfg = Config::load(args.config.clone(), util::current_dir())?.with_env()?;
    self::with_args(cfg, args)
}

pub fn with_args(mut cfg: Config, args: &GlobalArgs) -> anyhow::Result<Config> {
    let GlobalArgs {
        subcmd: _,
        config: _,
        server,
        api_key,
        verbose,
    } = args;

    if let Some(url) = server {
        cfg.server.base_url = parse_url(url)?;
    }
    if let Some(key) = api_key {
        cfg.server.api_key = Some(key.clone());
    }
    cfg.run.verbose |= *verbose;
    Ok(cfg)
}

pub fn client(cfg: &Config) -> anyhow::Result<RunnerClient> {
    Ok(RunnerClient::new(cfg.server.clone())?)
}

#[cfg(test)]
mod test {
    use clap::Parser;

    use super::*;

    #[test]
    fn flags_override_config() {
        let args = GlobalArgs::parse_from([
            "runprobe",
            "--server",
            "http://flag.example/api",
            "--api-key",
            "from-flag",
            "langs",
        ]);
        let cfg = with_args(Config::default(), &args).unwrap();
        assert_eq!(cfg.server.base_url.as_str(), "http://flag.example/api");
        assert_eq!(cfg.server.api_key.as_deref(), Some("from-flag"));
        assert!(!cfg.run.verbose);
    }

    #[test]
    fn bad_server_flag_is_an_error() {
        let args = GlobalArgs::parse_from(["runprobe", "--server", "nope", "langs"]);
        assert!(with_args(Config::default(), &args).is_err());
    }
}
