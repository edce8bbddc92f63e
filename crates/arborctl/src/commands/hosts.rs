//! Block/unblock/allow/unallow command handlers.

use serde_json::Value;

use aps_api::{Action, AddressSpec, Connector, HostList};

use crate::cli::{GlobalOpts, IpArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(entry: &Value) -> String {
    [
        format!(
            "Host:    {}",
            entry.get("hostAddress").and_then(Value::as_str).unwrap_or("-")
        ),
        format!(
            "Updated: {}",
            entry
                .get("updatetimeISO")
                .and_then(Value::as_str)
                .unwrap_or("-")
        ),
    ]
    .join("\n")
}

fn entry_id(entry: &Value) -> String {
    entry
        .get("hostAddress")
        .and_then(Value::as_str)
        .unwrap_or("-")
        .to_owned()
}

pub async fn handle_add(
    connector: &mut Connector,
    list: HostList,
    args: &IpArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // Validate before dispatch so a typo never reaches the network.
    AddressSpec::validated(&args.ip)?;

    let action = match list {
        HostList::Block => Action::BlockIp { ip: args.ip.clone() },
        HostList::Allow => Action::AllowIp { ip: args.ip.clone() },
    };
    let report = connector.try_run(&action).await?;

    if let Some(entry) = report.data.first() {
        let out = output::render_single(&global.output, entry, detail, entry_id);
        output::print_output(&out, global.quiet);
    }
    if !global.quiet {
        eprintln!("{}", report.message);
    }
    Ok(())
}

pub async fn handle_remove(
    connector: &mut Connector,
    list: HostList,
    args: &IpArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    AddressSpec::validated(&args.ip)?;

    if !util::confirm(&format!("Remove {} from the {list}?", args.ip), global.yes)? {
        return Ok(());
    }

    let action = match list {
        HostList::Block => Action::UnblockIp { ip: args.ip.clone() },
        HostList::Allow => Action::UnallowIp { ip: args.ip.clone() },
    };
    let report = connector.try_run(&action).await?;

    if !global.quiet {
        eprintln!("{}", report.message);
    }
    Ok(())
}
