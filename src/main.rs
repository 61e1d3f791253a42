use clap::Parser;
use ladder_processor::{args::Args, cli};
use tracing_subscriber::EnvFilter;

fn main() {
    dotenv::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(args.log_level.clone()))
        .init();

    std::process::exit(cli::run(args));
}
