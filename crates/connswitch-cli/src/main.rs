//! `connswitch` - switch connection strings between environments

mod cli;

use tracing_subscriber::EnvFilter;

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let matches = cli::build_cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let result = match cli::Options::from_matches(&matches) {
        Ok(options) => cli::run(&options, &mut std::io::stdout()).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::debug!("{:?}", e);
        println!("Error: {e}");
        std::process::exit(1);
    }
}
