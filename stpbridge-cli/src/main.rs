use clap::Parser;
use std::process;
use std::sync::Arc;
use stpbridge_cli::Cli;
use stpbridge_core::{Result, SwitchConfig};
use stpbridge_link::RawLink;
use stpbridge_switch::{SchedulerConfig, Switch};
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level())
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = SwitchConfig::for_switch(&cli.config_dir, &cli.switch_id)?;

    let interfaces = if cli.interfaces.is_empty() {
        config.interface_names()
    } else {
        cli.interfaces.clone()
    };
    config.ensure_port_count(interfaces.len())?;

    let link = RawLink::open(&interfaces)?;
    info!(
        switch = %cli.switch_id,
        priority = %config.priority,
        mac = %stpbridge_core::Link::mac_address(&link),
        "Configuration loaded"
    );

    let scheduler = SchedulerConfig::new(cli.hello_interval())?;
    let switch = Switch::new(&config, Arc::new(link))?.with_scheduler(scheduler);

    switch.spawn().wait().await
}
