#[macro_use]
extern crate tracing;

use std::env;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use sliding_drawer::cli::{Cli, Sub};
use sliding_drawer::controller::Options;
use sliding_drawer::replay::{self, Trace};
use sliding_drawer_config::Config;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let directives =
        env::var("RUST_LOG").unwrap_or_else(|_| "sliding_drawer=debug,info".to_owned());
    let env_filter = EnvFilter::builder().parse_lossy(directives);
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    let _client = tracy_client::Client::start();

    let path = cli
        .config
        .or_else(|| env::var_os("SLIDING_DRAWER_CONFIG").map(PathBuf::from));
    let config = match &path {
        // Render the miette report with its source snippet.
        Some(path) => Config::load(path).map_err(|err| anyhow!("{err:?}"))?,
        None => {
            debug!("no config file given, using the built-in one");
            Config::default()
        }
    };

    let options = Options::from_config(&config);

    match cli.subcommand {
        Sub::Validate => {
            options.validate()?;
            info!("config is valid");
        }
        Sub::Simulate { trace } => {
            let trace = Trace::load(&trace)?;
            for line in replay::simulate(&trace, options)? {
                println!("{line}");
            }
        }
        Sub::Replay { trace } => {
            let trace = Trace::load(&trace)?;
            for line in replay::replay(&trace, options)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}
