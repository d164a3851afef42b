use clap::Parser;
use pogo_debugger::config::{Args, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    pogo_debugger::log::init(args.log_level.as_deref());

    let config = Config::load(&args)?;
    pogo_debugger::start(config).await
}
