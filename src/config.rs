//! Bridge configuration.
//!
//! A [`Config`] is built once at startup, either from command line flags or
//! from a JSON5 file, validated, and then immutable for the life of the
//! process.

use std::fmt;
use std::net::{IpAddr, SocketAddr};

use serde::{Deserialize, Serialize};

use crate::args::Args;
use crate::error::{Error, Result};
use crate::gnmi::Path;
use crate::path;

/// Collector address with its optional VRF qualifier.
///
/// The VRF name is parsed and retained for forward compatibility but is not
/// applied when dialing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorAddr {
    pub vrf: Option<String>,
    pub host_port: String,
}

impl CollectorAddr {
    /// Parse `[vrf-name/]host:port`.
    pub fn parse(s: &str) -> Result<Self> {
        let (vrf, host_port) = match s.split_once('/') {
            Some((vrf, rest)) => (Some(vrf.to_string()), rest),
            None => (None, s),
        };

        if vrf.as_deref() == Some("") {
            return Err(Error::Config(format!("empty VRF name in collector address {s:?}")));
        }

        let (host, port) = host_port
            .rsplit_once(':')
            .ok_or_else(|| Error::Config(format!("collector address {s:?} is missing a port")))?;
        if host.is_empty() {
            return Err(Error::Config(format!("collector address {s:?} is missing a host")));
        }
        port.parse::<u16>()
            .map_err(|_| Error::Config(format!("invalid port in collector address {s:?}")))?;

        Ok(Self {
            vrf,
            host_port: host_port.to_string(),
        })
    }
}

impl fmt::Display for CollectorAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.vrf {
            Some(vrf) => write!(f, "{}/{}", vrf, self.host_port),
            None => write!(f, "{}", self.host_port),
        }
    }
}

/// TLS settings for the collector connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsSettings {
    /// Enable TLS
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Skip certificate verification (insecure)
    #[serde(default)]
    pub skip_verify: bool,

    /// Path to CA certificate file; empty means the host's root CA set
    #[serde(default)]
    pub ca_cert: Option<String>,

    /// Path to client certificate file
    #[serde(default)]
    pub client_cert: Option<String>,

    /// Path to client key file
    #[serde(default)]
    pub client_key: Option<String>,
}

impl Default for TlsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_verify: false,
            ca_cert: None,
            client_cert: None,
            client_key: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Raw, file-loadable form of the configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawConfig {
    #[serde(default = "default_target_addr")]
    pub target_addr: String,

    #[serde(default)]
    pub collector_addr: String,

    /// Value for the target field of the Subscribe prefix.
    #[serde(default)]
    pub target_value: String,

    /// Path expressions to subscribe to, in order.
    #[serde(default)]
    pub subscribe: Vec<String>,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Source address for the collector connection (validated, unused).
    #[serde(default)]
    pub source_addr: Option<String>,

    #[serde(default)]
    pub tls: TlsSettings,
}

fn default_target_addr() -> String {
    "127.0.0.1:6030".to_string()
}

/// Validated, immutable session configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub target_addr: String,
    pub collector: CollectorAddr,
    pub target_value: String,
    /// Subscription paths, duplicates permitted, operator order preserved.
    pub paths: Vec<Path>,
    pub username: String,
    pub password: String,
    pub source_addr: Option<String>,
    pub tls: TlsSettings,
}

impl RawConfig {
    /// Load the raw configuration from a JSON5 file.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read config file {path:?}: {e}")))?;
        let raw: Self = json5::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse config file {path:?}: {e}")))?;
        Ok(raw)
    }

    /// Validate the raw configuration into an immutable [`Config`].
    pub fn validate(self) -> Result<Config> {
        if self.target_addr.is_empty() {
            return Err(Error::Config("target address must not be empty".into()));
        }

        let collector = CollectorAddr::parse(&self.collector_addr)?;

        if self.subscribe.is_empty() {
            return Err(Error::Config(
                "at least one --subscribe path is required".into(),
            ));
        }
        let paths = self.subscribe.iter().map(|s| path::parse(s)).collect();

        if let Some(ref addr) = self.source_addr {
            if addr.parse::<IpAddr>().is_err() && addr.parse::<SocketAddr>().is_err() {
                return Err(Error::Config(format!(
                    "source address {addr:?} is not an IP or socket address"
                )));
            }
        }

        Ok(Config {
            target_addr: self.target_addr,
            collector,
            target_value: self.target_value,
            paths,
            username: self.username,
            password: self.password,
            source_addr: self.source_addr,
            tls: self.tls,
        })
    }
}

impl From<Args> for RawConfig {
    fn from(args: Args) -> Self {
        Self {
            target_addr: args.target_addr,
            collector_addr: args.collector_addr,
            target_value: args.target_value,
            subscribe: args.subscribe,
            username: args.username,
            password: args.password,
            source_addr: args.source_addr,
            tls: TlsSettings {
                enabled: args.collector_tls,
                skip_verify: args.collector_tls_skipverify,
                ca_cert: args.collector_cafile,
                client_cert: args.collector_certfile,
                client_key: args.collector_keyfile,
            },
        }
    }
}

impl Config {
    /// Build the configuration from parsed flags, or from the JSON5 file named
    /// by `--config` when given.
    pub fn from_args(args: Args) -> Result<Self> {
        let raw = match &args.config {
            Some(file) => RawConfig::load_from_file(file)?,
            None => RawConfig::from(args),
        };
        raw.validate()
    }
}
