mod args;
mod client;

use clap::Parser;
use log::{debug, warn};
use snafu::{prelude::*, ErrorCompat};

use crate::args::Args;
use crate::client::config_reader::{read_config, ClientConfig};
use crate::client::*;

/// The settings from the file, overridden by the command line.
fn load_config(args: &Args) -> ClientResult<ClientConfig> {
    let mut config = match (&args.config, &args.base_url) {
        (Some(path), _) => read_config(path)?,
        (None, Some(base_url)) => ClientConfig::new(base_url, ""),
        (None, None) => whatever!("either --config or --base-url is required"),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(contest_path) = &args.contest_path {
        config.contest_path = contest_path.clone();
    }
    if let Some(cookie) = &args.cookie {
        config.session_cookie = Some(cookie.clone());
    }
    config.validate()?;
    debug!("config: {:?}", config);
    Ok(config)
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    let res = load_config(&args).and_then(|config| run_command(&config, &args.command));
    if let Err(e) = res {
        warn!("Error occured {:?}", e);
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
