#![cfg(not(tarpaulin_include))]

mod commands;
mod error;
mod util;
use argh::FromArgs;
use core::error::Error;
use env_logger::Env;

#[derive(FromArgs, Debug)]
/// Mip generation, histogram normalization and KTX2 metadata tool
struct TopLevel {
    #[argh(subcommand)]
    command: Commands,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Commands {
    Process(commands::process::ProcessCmd),
    Inspect(commands::inspect::InspectCmd),
    Patch(commands::patch::PatchCmd),
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli: TopLevel = argh::from_env();

    match cli.command {
        Commands::Process(cmd) => {
            commands::process::handle_process_command(cmd)?;
        }
        Commands::Inspect(cmd) => {
            commands::inspect::handle_inspect_command(cmd)?;
        }
        Commands::Patch(cmd) => {
            commands::patch::handle_patch_command(cmd)?;
        }
    }

    Ok(())
}
