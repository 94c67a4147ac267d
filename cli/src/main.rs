mod commands;
mod export;
mod terminal;

use std::path::PathBuf;

use commands::{CommandLine, Commands, discover, info, scan};
use netsweep_common::config::Config;
use terminal::{input, logging, print};
use tokio_util::sync::CancellationToken;

use crate::terminal::print::GLOBAL_KEY_WIDTH;

/// Widest key printed by aligned lines.
const KEY_WIDTH: usize = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();
    logging::init_logging(commands.verbose)?;

    let cfg: Config = commands.to_config();
    let output: Option<PathBuf> = commands
        .output
        .as_deref()
        .map(|path| export::resolve_path(path, commands.output_dir.as_deref()));

    GLOBAL_KEY_WIDTH.set(KEY_WIDTH);
    print::banner(cfg.no_banner, cfg.quiet);

    let cancel = CancellationToken::new();
    input::cancel_on_ctrl_c(cancel.clone());

    match commands.command {
        Commands::Info => {
            print::header("about the tool", cfg.quiet);
            info::info(&cfg)
        }
        Commands::Discover { local } => {
            print::header("getting ready for discovery", cfg.quiet);
            discover::discover(local, &cfg, &cancel, output.as_deref()).await
        }
        Commands::Scan {
            target,
            range,
            local,
        } => {
            print::header("starting scanner", cfg.quiet);
            scan::scan(target, range, local, &cfg, &cancel, output.as_deref()).await
        }
    }
}
