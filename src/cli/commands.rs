use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "sift", about = concat!("[⩒] sift v", env!("CARGO_PKG_VERSION"), " - rank your tasks one choice at a time"), version)]
pub struct Cli {
    /// Seconds between task list refreshes [default: 3]
    #[arg(short = 'i', long = "refresh-interval", value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_interval: Option<u64>,
}
