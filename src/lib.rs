//! Reverse gNMI telemetry bridge.
//!
//! Subscribes to a gNMI target over one outbound stream and pushes every
//! update, unmodified and in order, to a gNMIReverse collector over another
//! outbound stream. Useful when the collector sits where it cannot dial the
//! target (NAT, firewall): the bridge dials both sides.

pub mod args;
pub mod bridge;
pub mod config;
pub mod error;
pub mod path;
pub mod publish;
pub mod subscribe;
pub mod tls;

// Include the generated protobuf code
pub mod gnmi_ext {
    tonic::include_proto!("gnmi_ext");
}

pub mod gnmi {
    tonic::include_proto!("gnmi");
}

pub mod gnmireverse {
    tonic::include_proto!("gnmireverse");
}

pub use bridge::{Bridge, Immediate, RestartPolicy};
pub use config::{CollectorAddr, Config, TlsSettings};
pub use error::{Error, Result};
pub use tls::TransportSecurity;
