use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use sift::cli::commands::Cli;
use sift::io::config_io;
use sift::io::log::build_dispatch;
use sift::io::source::CommandSource;
use sift::tui::RunOptions;
use sift::tui::theme::Theme;
use tracing::Dispatch;

fn main() {
    let cli = Cli::parse();

    let config = match config_io::config_dir().and_then(|dir| config_io::read_config(&dir)) {
        Ok(config) => config,
        Err(e) => fail(e),
    };
    let state_dir = match config_io::state_dir(&config) {
        Ok(dir) => dir,
        Err(e) => fail(e),
    };

    // No cache dir means no log, not a failed start
    let dispatch = config_io::cache_dir()
        .map(|dir| build_dispatch(&dir))
        .unwrap_or_else(|_| Dispatch::none());

    let refresh_interval = Duration::from_secs(config.refresh_interval(cli.refresh_interval));
    let result = tracing::dispatcher::with_default(&dispatch, || {
        sift::tui::run(RunOptions {
            theme: Theme::from_config(&config.ui),
            source: Arc::new(CommandSource::from_config(&config.source.command)),
            state_dir,
            refresh_interval,
            dispatch: dispatch.clone(),
        })
    });
    if let Err(e) = result {
        fail(e);
    }
}

fn fail(e: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", e);
    process::exit(1);
}
