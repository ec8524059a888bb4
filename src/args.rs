//! Command line flags.
//!
//! Flag-for-flag equivalent of the original configuration surface; a JSON5
//! configuration file can be used instead via `--config`.

use clap::Parser;

/// Reverse gNMI telemetry bridge
#[derive(Parser, Debug, Clone)]
#[command(name = "gnmi-reverse-bridge")]
#[command(about = "Subscribe to a gNMI target and push its telemetry to a collector")]
pub struct Args {
    /// Address of the gNMI target
    #[arg(long, default_value = "127.0.0.1:6030", value_name = "HOST:PORT")]
    pub target_addr: String,

    /// Address of the collector, in the form [vrf-name/]host:port
    #[arg(long, default_value = "", value_name = "[VRF/]HOST:PORT")]
    pub collector_addr: String,

    /// Value to use in the target field of the Subscribe prefix
    #[arg(long, default_value = "")]
    pub target_value: String,

    /// Path to subscribe to. This option can be repeated multiple times.
    #[arg(long = "subscribe", value_name = "PATH")]
    pub subscribe: Vec<String>,

    /// Username to authenticate with the target
    #[arg(long, default_value = "")]
    pub username: String,

    /// Password to authenticate with the target
    #[arg(long, default_value = "")]
    pub password: String,

    /// Address to use as source in the connection to the collector
    /// (accepted and validated, not yet applied to dialing)
    #[arg(long, value_name = "ADDR")]
    pub source_addr: Option<String>,

    /// Path to TLS certificate file to authenticate with the collector
    #[arg(long, value_name = "FILE")]
    pub collector_certfile: Option<String>,

    /// Path to TLS key file to authenticate with the collector
    #[arg(long, value_name = "FILE")]
    pub collector_keyfile: Option<String>,

    /// Path to TLS CA file to verify the collector
    /// (leave empty to use the host's root CA set)
    #[arg(long, value_name = "FILE")]
    pub collector_cafile: Option<String>,

    /// Use TLS in the connection with the collector
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set, value_name = "BOOL")]
    pub collector_tls: bool,

    /// Don't verify the collector's certificate (insecure)
    #[arg(long)]
    pub collector_tls_skipverify: bool,

    /// Load configuration from a JSON5 file instead of the flags above
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,

    /// Log level (overridden by RUST_LOG if set)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_surface() {
        let args = Args::parse_from(["gnmi-reverse-bridge"]);
        assert_eq!(args.target_addr, "127.0.0.1:6030");
        assert!(args.collector_tls);
        assert!(!args.collector_tls_skipverify);
        assert!(args.subscribe.is_empty());
    }

    #[test]
    fn subscribe_flag_repeats_in_order() {
        let args = Args::parse_from([
            "gnmi-reverse-bridge",
            "--subscribe",
            "/a/b",
            "--subscribe",
            "/c",
            "--subscribe",
            "/a/b",
        ]);
        assert_eq!(args.subscribe, vec!["/a/b", "/c", "/a/b"]);
    }

    #[test]
    fn tls_flag_takes_explicit_value() {
        let args = Args::parse_from(["gnmi-reverse-bridge", "--collector-tls", "false"]);
        assert!(!args.collector_tls);
    }
}
