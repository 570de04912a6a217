use runprobe_core::{action, Config};

use super::SubcmdResult;
use crate::config;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg()] // positional argument
    pub file_id: String,
}

pub async fn exec(args: &Args, cfg: &Config) -> SubcmdResult {
    let client = config::client(cfg)?;

    if action::check_file(&client, &args.file_id).await? {
        println!("File '{}' is on the server", args.file_id);
        Ok(0)
    } else {
        println!("File '{}' not found", args.file_id);
        Ok(1)
    }
}
