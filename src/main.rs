use clap::Parser;
use log::{error, LevelFilter};

mod cmd;

use cmd::{Cli, Commands};

fn main() {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let res = match cli.command {
        Commands::Show(a) => a.run(),
        Commands::Evaluate(a) => a.run(),
        Commands::Netlist(a) => a.run(),
    };
    if let Err(e) = res {
        error!("{}", e);
        std::process::exit(1);
    }
}
