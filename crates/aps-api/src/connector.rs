// Action dispatch.
//
// A `Connector` is built once per invocation, runs any number of actions
// sequentially, and is torn down with `finish`. Mirroring the appliance's
// session model, every action starts with a fresh login; `finish` logs the
// last session out exactly once, whatever the actions did.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::cidr::AddressSpec;
use crate::error::Error;
use crate::hosts::HostList;
use crate::session::{ApsSession, Credentials};

/// The operations the connector exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    TestConnectivity,
    ListIps { list: HostList },
    BlockIp { ip: String },
    UnblockIp { ip: String },
    AllowIp { ip: String },
    UnallowIp { ip: String },
}

/// Outcome of one action: status, human-readable message, structured data
/// rows, and a summary map.
#[derive(Debug, Serialize)]
pub struct ActionReport {
    pub success: bool,
    pub message: String,
    pub data: Vec<Value>,
    pub summary: serde_json::Map<String, Value>,
}

impl ActionReport {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Vec::new(),
            summary: serde_json::Map::new(),
        }
    }

    /// A failed action, carrying the error's message.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: Vec::new(),
            summary: serde_json::Map::new(),
        }
    }

    fn with_data(mut self, row: impl Serialize) -> Self {
        self.data
            .push(serde_json::to_value(row).expect("serialization should not fail"));
        self
    }

    fn with_summary(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.summary.insert(key.to_owned(), value.into());
        self
    }
}

/// Runs actions against one appliance for the lifetime of one invocation.
pub struct Connector {
    credentials: Credentials,
    session: Option<ApsSession>,
}

impl Connector {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            session: None,
        }
    }

    /// Run one action, reporting its outcome.
    ///
    /// A failure aborts the remaining steps of this action only; the
    /// connector stays usable for further actions.
    pub async fn run(&mut self, action: &Action) -> ActionReport {
        match self.try_run(action).await {
            Ok(report) => report,
            Err(err) => ActionReport::fail(err.to_string()),
        }
    }

    /// Like [`Connector::run`], but surfaces the typed error instead of
    /// flattening it into a failed report.
    pub async fn try_run(&mut self, action: &Action) -> Result<ActionReport, Error> {
        match action {
            Action::TestConnectivity => self.test_connectivity().await,
            Action::ListIps { list } => self.list_ips(*list).await,
            Action::BlockIp { ip } => self.add_to_list(HostList::Block, ip).await,
            Action::UnblockIp { ip } => self.remove_from_list(HostList::Block, ip).await,
            Action::AllowIp { ip } => self.add_to_list(HostList::Allow, ip).await,
            Action::UnallowIp { ip } => self.remove_from_list(HostList::Allow, ip).await,
        }
    }

    /// Tear the connector down, logging out the last session.
    ///
    /// Call exactly once after all actions have run; a logout failure is
    /// reported in the result but the session is closed regardless.
    pub async fn finish(&mut self) -> Result<(), Error> {
        match self.session.take() {
            Some(mut session) => session.logout().await,
            None => Ok(()),
        }
    }

    /// Open a fresh session and log in. Each action re-authenticates; the
    /// previous session object, if any, is simply replaced.
    async fn login(&mut self) -> Result<(), Error> {
        let mut session = ApsSession::new(self.credentials.clone())?;
        session.login().await?;
        self.session = Some(session);
        Ok(())
    }

    fn session(&self) -> Result<&ApsSession, Error> {
        self.session.as_ref().ok_or_else(|| Error::Authentication {
            message: "session is not authenticated".to_owned(),
        })
    }

    async fn test_connectivity(&mut self) -> Result<ActionReport, Error> {
        info!("Querying endpoint to verify the credentials provided");

        if let Err(err) = self.login().await {
            info!("Test Connectivity Failed.");
            return Err(err);
        }

        info!("Test Connectivity Passed");
        Ok(ActionReport::ok("Test Connectivity Passed"))
    }

    async fn list_ips(&mut self, list: HostList) -> Result<ActionReport, Error> {
        self.login().await?;
        let response = self.session()?.list_hosts(list).await?;

        let num_ips = response
            .get("hosts")
            .and_then(Value::as_array)
            .map_or(0, Vec::len);

        Ok(
            ActionReport::ok(format!("Retrieved {num_ips} hosts from the {list}"))
                .with_data(response)
                .with_summary("num_ips", num_ips),
        )
    }

    /// Check-then-add. Best-effort idempotence only: nothing guards against
    /// the list changing between the lookup and the write.
    async fn add_to_list(&mut self, list: HostList, ip: &str) -> Result<ActionReport, Error> {
        let spec = AddressSpec::validated(ip)?;
        self.login().await?;
        let session = self.session()?;

        if let Some(entry) = session.get_host(list, spec.host_key()).await? {
            return Ok(ActionReport::ok(format!("IP already on the {list}"))
                .with_data(entry.with_iso_timestamp()));
        }

        let entry = session.add_host(list, spec.host_key()).await?;
        Ok(ActionReport::ok(format!("IP added to the {list}"))
            .with_data(entry.with_iso_timestamp()))
    }

    /// Check-then-remove, same best-effort idempotence as `add_to_list`.
    async fn remove_from_list(&mut self, list: HostList, ip: &str) -> Result<ActionReport, Error> {
        let spec = AddressSpec::validated(ip)?;
        self.login().await?;
        let session = self.session()?;

        if session.get_host(list, spec.host_key()).await?.is_none() {
            return Ok(ActionReport::ok(format!("IP already absent from the {list}")));
        }

        session.remove_host(list, spec.host_key()).await?;
        Ok(ActionReport::ok(format!("IP removed from the {list}")))
    }
}
