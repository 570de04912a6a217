use std::io;

use runprobe_core::{action, style, Config};

use super::SubcmdResult;
use crate::config;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(short, long)]
    pub json: bool,
}

pub async fn exec(args: &Args, cfg: &Config) -> SubcmdResult {
    let client = config::client(cfg)?;

    let langs = action::fetch_languages(&client).await?;

    if args.json {
        serde_json::to_writer_pretty(io::stdout(), &langs)?;
        println!();
        return Ok(0);
    }

    style::print_languages(&langs);
    Ok(0)
}
