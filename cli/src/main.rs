use clap::Parser;
use runprobe_cli::{cmd::GlobalArgs, config, logger};

#[tokio::main]
async fn main() {
    let app = GlobalArgs::parse();
    let cfg = config::resolve(&app).unwrap_or_else(|e| {
        eprintln!("Error: Invalid config: {:#}", e);
        std::process::exit(1);
    });
    logger::init(cfg.run.verbose);

    let code = app.exec_subcmd(&cfg).await.unwrap_or_else(|e| {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    });
    std::process::exit(code);
}
