use std::io::Write as _;

use colored::Colorize;
use runprobe_core::style::ColorTheme;

/// Route `log` records to stderr as `[LEVEL] message`.
///
/// `RUST_LOG` is honored; without it the level is `info`, or `debug` when
/// `verbose` is set.
pub fn init(verbose: bool) {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder
        .format(|buf, record| {
            let level = record.level();
            let tag = format!("[{}]", level).color(level.color()).bold();
            writeln!(buf, "{} {}", tag, record.args())
        })
        .init();
}
