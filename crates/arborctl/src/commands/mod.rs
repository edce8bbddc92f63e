//! Command dispatch: bridges CLI args -> connector actions -> output
//! formatting.

pub mod connectivity;
pub mod hosts;
pub mod lists;
pub mod util;

use aps_api::{Connector, HostList};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    connector: &mut Connector,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Test => connectivity::handle(connector, global).await,
        Command::List(args) => lists::handle(connector, args, global).await,
        Command::Block(args) => hosts::handle_add(connector, HostList::Block, &args, global).await,
        Command::Unblock(args) => {
            hosts::handle_remove(connector, HostList::Block, &args, global).await
        }
        Command::Allow(args) => hosts::handle_add(connector, HostList::Allow, &args, global).await,
        Command::Unallow(args) => {
            hosts::handle_remove(connector, HostList::Allow, &args, global).await
        }
    }
}
