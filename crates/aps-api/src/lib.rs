// aps-api: Async Rust client for the Arbor Networks APS on-the-fly list API

pub mod cidr;
pub mod connector;
pub mod error;
pub mod hosts;
mod response;
pub mod session;
pub mod transport;

pub use cidr::AddressSpec;
pub use connector::{Action, ActionReport, Connector};
pub use error::Error;
pub use hosts::{HostEntry, HostList};
pub use session::{ApsSession, Credentials, Method};
