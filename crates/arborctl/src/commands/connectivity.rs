//! Connectivity test handler.

use aps_api::{Action, Connector};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub async fn handle(connector: &mut Connector, global: &GlobalOpts) -> Result<(), CliError> {
    let report = connector.try_run(&Action::TestConnectivity).await?;
    if !global.quiet {
        eprintln!("{}", report.message);
    }
    Ok(())
}
