//! Host list command handler.

use serde_json::Value;
use tabled::Tabled;

use aps_api::{Action, Connector};

use crate::cli::{GlobalOpts, ListArgs};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

/// The appliance reports collection entries either as bare address strings
/// or as full entry objects, depending on version.
fn host_row(value: &Value) -> HostRow {
    match value {
        Value::String(address) => HostRow {
            host: address.clone(),
            updated: "-".into(),
        },
        Value::Object(entry) => HostRow {
            host: entry
                .get("hostAddress")
                .and_then(Value::as_str)
                .unwrap_or("-")
                .to_owned(),
            updated: entry
                .get("updateTime")
                .and_then(Value::as_i64)
                .map_or_else(|| "-".into(), |t| t.to_string()),
        },
        other => HostRow {
            host: other.to_string(),
            updated: "-".into(),
        },
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    connector: &mut Connector,
    args: ListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let report = connector
        .try_run(&Action::ListIps {
            list: args.list.into(),
        })
        .await?;

    let hosts: Vec<Value> = report
        .data
        .first()
        .and_then(|d| d.get("hosts"))
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    let out = output::render_list(&global.output, &hosts, host_row, |v| host_row(v).host);
    output::print_output(&out, global.quiet);
    if !global.quiet {
        eprintln!("{}", report.message);
    }
    Ok(())
}
