//! CLI-owned configuration: TOML profiles and credential resolution.
//!
//! The api crate never sees these types -- it receives a pre-built
//! `Credentials`.

use std::collections::HashMap;
use std::path::PathBuf;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use aps_api::Credentials;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── TOML config structs ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name (used when --profile is not specified).
    pub default_profile: Option<String>,

    /// Named appliance profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// One appliance profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Appliance base URL (e.g., "https://aps.example.net").
    pub server_url: Option<String>,

    /// Username for session login.
    pub username: Option<String>,

    /// Password (plaintext -- prefer keyring or env var).
    pub password: Option<String>,

    /// Verify the appliance's TLS certificate. Off by default: appliances
    /// commonly run with self-signed certificates.
    pub verify_server_cert: Option<bool>,
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "arborctl", "arborctl")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("arborctl");
            p.push("config.toml");
            p
        })
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, CliError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path()))
        .merge(Env::prefixed("ARBORCTL_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Credential resolution ────────────────────────────────────────────

/// Resolve appliance credentials from CLI flags, environment, keyring, and
/// the active profile, in that order of precedence.
pub fn resolve_credentials(global: &GlobalOpts) -> Result<Credentials, CliError> {
    let config = load_config().unwrap_or_default();

    let profile_name = global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into());
    let profile = config.profiles.get(&profile_name);

    // 1. Server URL (flag/env > profile)
    let server = global
        .server
        .clone()
        .or_else(|| profile.and_then(|p| p.server_url.clone()))
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;

    // Reject unparseable URLs before any network contact.
    let _: url::Url = server.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {server}"),
    })?;

    // 2. Username (flag/env > profile)
    let username = global
        .username
        .clone()
        .or_else(|| profile.and_then(|p| p.username.clone()))
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.clone(),
        })?;

    // 3. Password (flag/env > keyring > profile)
    let password = resolve_password(global, profile, &profile_name)?;

    // 4. TLS verification (--insecure wins; profile default is off)
    let verify_tls = if global.insecure {
        false
    } else {
        profile.and_then(|p| p.verify_server_cert).unwrap_or(false)
    };

    Ok(Credentials::new(&server, username, password, verify_tls))
}

fn resolve_password(
    global: &GlobalOpts,
    profile: Option<&Profile>,
    profile_name: &str,
) -> Result<SecretString, CliError> {
    // 1. CLI flag / ARBOR_PASSWORD
    if let Some(ref password) = global.password {
        return Ok(SecretString::from(password.clone()));
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("arborctl", &format!("{profile_name}/password")) {
        if let Ok(password) = entry.get_password() {
            return Ok(SecretString::from(password));
        }
    }

    // 3. Plaintext in config
    if let Some(password) = profile.and_then(|p| p.password.clone()) {
        return Ok(SecretString::from(password));
    }

    Err(CliError::NoCredentials {
        profile: profile_name.into(),
    })
}
