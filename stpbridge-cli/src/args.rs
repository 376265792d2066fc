//! CLI argument parsing

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use stpbridge_core::stp_constants::DEFAULT_HELLO_MS;

#[derive(Parser, Debug)]
#[command(name = "stpbridge")]
#[command(version, about = "Simulated Ethernet bridge with VLANs and spanning tree", long_about = None)]
pub struct Cli {
    /// Switch identifier; selects `switch<ID>.cfg` in the config directory
    #[arg(value_name = "SWITCH_ID")]
    pub switch_id: String,

    /// Interfaces to bridge, in port order (defaults to the names in the config file)
    #[arg(value_name = "INTERFACES")]
    pub interfaces: Vec<String>,

    /// Directory holding the switch configuration files
    #[arg(short = 'c', long, value_name = "DIR", default_value = "configs")]
    pub config_dir: PathBuf,

    /// Root hello period in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_HELLO_MS)]
    pub hello_ms: u64,

    /// Verbose output (-v, -vv, -vvv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }

    pub fn hello_interval(&self) -> Duration {
        Duration::from_millis(self.hello_ms)
    }
}
