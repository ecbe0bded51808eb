use clap::Parser;
use nxmisc::cli::dispatcher::Dispatcher;
use nxmisc::cli::main_types::Cli;
use nxmisc::storage::config::Config;
use nxmisc::utils::logging::{log_error, log_hint, print_verbose};
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load Config
    let config_path = cli
        .config_dir
        .as_ref()
        .map(|dir| PathBuf::from(dir).join("config.toml"));

    let config = match Config::load(config_path.clone()) {
        Ok(config) => config,
        Err(err) => {
            log_error(&format!("Error loading config: {}", err));
            std::process::exit(1);
        }
    };

    if let Some(config_dir) = &cli.config_dir {
        print_verbose(cli.verbose, &format!("Using config directory: {}", config_dir));
    }

    let dispatcher = Dispatcher::new(config, config_path, cli.format, cli.verbose);

    if let Err(e) = dispatcher.dispatch(cli.command).await {
        log_error(&e.display_friendly());
        if let Some(hint) = e.troubleshooting_hint() {
            log_hint(&hint);
        }
        print_verbose(
            cli.verbose,
            &format!("{} severity: {:?} ({})", e.severity().emoji(), e.severity(), e),
        );
        std::process::exit(1);
    }
}
