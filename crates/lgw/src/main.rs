//! LGW - Entry Point
//!
//! Binary entry point for the provider gateway command line. Lives in the
//! `lgw` facade crate next to the library it drives.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lgw check-config` | Validate configuration and print the effective routing |
//! | `lgw route --task logistics --payload '{...}'` | Submit one provider request |
//! | `lgw search "container manifest"` | Run one document search |

use clap::Parser;
use lgw::cli::{Cli, execute, load_config};
use lgw::infrastructure::logging::init_logging;

/// Main entry point for the LGW command line
///
/// Loads configuration (file, `LGW__*` and flat environment overrides),
/// installs logging on stderr and runs the requested command.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config.logging)?;

    let mut stdout = std::io::stdout().lock();
    execute(cli.command, config, &mut stdout).await?;
    Ok(())
}
