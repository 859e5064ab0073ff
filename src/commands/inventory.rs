use crate::cli::{Cli, Mode};
use crate::error::Result;
use crate::hmc::HmcSession;
use crate::inventory::{build_inventory, Inventory};
use crate::output::output_data;
use crate::settings::Settings;
use log::debug;

pub fn handle_inventory_command(cli: &Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let inventory = fetch_inventory(&settings)?;

    match cli.mode() {
        Mode::List => output_data(&inventory, &cli.format)?,
        Mode::Host(name) => {
            debug!("Host variables requested for {}", name);
            output_data(&inventory.host_vars(name), &cli.format)?;
        }
    }
    Ok(())
}

/// Log on, read managed systems and partitions, and always log off before
/// reporting the outcome.
pub fn fetch_inventory(settings: &Settings) -> Result<Inventory> {
    let session = HmcSession::logon(&settings.hmc)?;

    let fetched = session
        .managed_systems()
        .and_then(|systems| Ok((systems, session.logical_partitions()?)));
    session.logoff();

    let (systems, partitions) = fetched?;
    Ok(build_inventory(&partitions, &systems))
}
