mod cli;
mod commands;
mod error;
mod hmc;
mod inventory;
mod output;
mod settings;

use clap::Parser;
use cli::Cli;
use commands::handle_inventory_command;
use output::print_error;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = handle_inventory_command(&cli) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

// stderr only; stdout belongs to the inventory document.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}
