// On-the-fly host list endpoints.
//
// List, lookup, add, and remove entries on the appliance's allow/block
// lists. The API still speaks the legacy blacklist/whitelist vocabulary;
// `HostList` maps the public names onto it in one place.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::Error;
use crate::session::{ApsSession, Method};

/// Which of the two appliance-side host lists to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostList {
    Block,
    Allow,
}

impl HostList {
    /// Parse a public list name. The legacy spellings are accepted as
    /// aliases.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "blocklist" | "blacklist" => Some(Self::Block),
            "allowlist" | "whitelist" => Some(Self::Allow),
            _ => None,
        }
    }

    /// Collection endpoint on the appliance.
    pub fn collection_endpoint(self) -> &'static str {
        match self {
            Self::Block => "/api/aps/v1/otf/blacklisted-hosts/",
            Self::Allow => "/api/aps/v1/otf/whitelisted-hosts/",
        }
    }

    /// Field name the appliance uses for the host array in collection
    /// responses, regardless of the public list name.
    pub fn legacy_field(self) -> &'static str {
        match self {
            Self::Block => "blacklisted-hosts",
            Self::Allow => "whitelisted-hosts",
        }
    }
}

impl std::fmt::Display for HostList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Block => "blocklist",
            Self::Allow => "allowlist",
        })
    }
}

/// One allow/block-listed host as the appliance reports it.
///
/// `updatetimeISO` is derived client-side for display and never sent back;
/// undocumented server fields land in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEntry {
    #[serde(rename = "hostAddress", default)]
    pub host_address: String,
    #[serde(rename = "updateTime", default)]
    pub update_time: i64,
    #[serde(rename = "updatetimeISO", default, skip_serializing_if = "Option::is_none")]
    pub update_time_iso: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl HostEntry {
    /// Attach the RFC3339 UTC rendering of `updateTime`.
    pub fn with_iso_timestamp(mut self) -> Self {
        self.update_time_iso = DateTime::from_timestamp(self.update_time, 0)
            .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string());
        self
    }
}

impl ApsSession {
    /// Fetch a whole host list.
    ///
    /// `GET /api/aps/v1/otf/{black|white}listed-hosts/`
    ///
    /// The legacy-named host array in the response is renamed to `hosts`
    /// before the caller sees it.
    pub async fn list_hosts(&self, list: HostList) -> Result<Value, Error> {
        debug!("listing {} hosts", list);
        let mut response = self
            .request(Method::Get, list.collection_endpoint(), None)
            .await?;

        let Some(object) = response.as_object_mut() else {
            return Err(Error::Protocol {
                message: format!("Unexpected {list} response: not a JSON object"),
            });
        };
        let Some(hosts) = object.remove(list.legacy_field()) else {
            return Err(Error::Protocol {
                message: format!(
                    "Unexpected {list} response: missing the '{}' field",
                    list.legacy_field()
                ),
            });
        };
        object.insert("hosts".to_owned(), hosts);

        Ok(response)
    }

    /// Look up a single host entry by its identifier (bare address or CIDR).
    ///
    /// `GET /api/aps/v1/otf/{black|white}listed-hosts/{key}/`
    ///
    /// The appliance answers an absent entry with an empty body, which the
    /// classifier turns into an empty object; both map to `None` here.
    pub async fn get_host(&self, list: HostList, key: &str) -> Result<Option<HostEntry>, Error> {
        let endpoint = format!("{}{}/", list.collection_endpoint(), key);
        debug!(key, "looking up {} entry", list);
        let response = self.request(Method::Get, &endpoint, None).await?;

        if response.is_null() || response.as_object().is_some_and(serde_json::Map::is_empty) {
            return Ok(None);
        }

        let entry = serde_json::from_value(response).map_err(|e| Error::Protocol {
            message: format!("Unable to parse host entry: {e}"),
        })?;
        Ok(Some(entry))
    }

    /// Add a host to a list.
    ///
    /// `POST /api/aps/v1/otf/{black|white}listed-hosts/?hostAddress={key}`
    pub async fn add_host(&self, list: HostList, key: &str) -> Result<HostEntry, Error> {
        debug!(key, "adding {} entry", list);
        let response = self
            .request(
                Method::Post,
                list.collection_endpoint(),
                Some(&[("hostAddress", key)]),
            )
            .await?;

        serde_json::from_value(response).map_err(|e| Error::Protocol {
            message: format!("Unable to parse host entry: {e}"),
        })
    }

    /// Remove a host from a list.
    ///
    /// `DELETE /api/aps/v1/otf/{black|white}listed-hosts/?hostAddress={key}`
    pub async fn remove_host(&self, list: HostList, key: &str) -> Result<(), Error> {
        debug!(key, "removing {} entry", list);
        self.request(
            Method::Delete,
            list.collection_endpoint(),
            Some(&[("hostAddress", key)]),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn epoch_zero_renders_as_rfc3339_utc() {
        let entry = HostEntry {
            host_address: "1.2.3.4".to_owned(),
            update_time: 0,
            update_time_iso: None,
            extra: serde_json::Map::new(),
        }
        .with_iso_timestamp();
        assert_eq!(entry.update_time_iso.as_deref(), Some("1970-01-01T00:00:00Z"));
    }

    #[test]
    fn iso_timestamp_matches_the_update_time() {
        let entry = HostEntry {
            host_address: "1.2.3.4".to_owned(),
            update_time: 1_500_000_000,
            update_time_iso: None,
            extra: serde_json::Map::new(),
        }
        .with_iso_timestamp();
        assert_eq!(entry.update_time_iso.as_deref(), Some("2017-07-14T02:40:00Z"));
    }

    #[test]
    fn list_names_accept_legacy_aliases() {
        assert_eq!(HostList::parse("blocklist"), Some(HostList::Block));
        assert_eq!(HostList::parse("blacklist"), Some(HostList::Block));
        assert_eq!(HostList::parse("allowlist"), Some(HostList::Allow));
        assert_eq!(HostList::parse("whitelist"), Some(HostList::Allow));
        assert_eq!(HostList::parse("greylist"), None);
    }
}
