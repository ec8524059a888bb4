//! Publish session: one outbound gNMIReverse Publish stream to the collector.
//!
//! Relays whatever arrives on the handoff channel onto the stream. The
//! response side is never read: from this bridge's perspective the collector
//! is a one-directional telemetry sink.

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;
use tonic::Request;

use crate::error::{Error, Result};
use crate::gnmi::SubscribeResponse;
use crate::gnmireverse::g_nmi_reverse_client::GNmiReverseClient;

/// Run the publish session for one retry iteration.
///
/// The receiver itself is the outbound message stream, so each channel
/// message is sent as soon as the transport accepts it. Cancellation wins the
/// race against the RPC and drops it, along with the channel receiver.
pub async fn run(
    channel: Channel,
    rx: mpsc::Receiver<SubscribeResponse>,
    token: CancellationToken,
) -> Result<()> {
    let mut client = GNmiReverseClient::new(channel);
    let outbound = ReceiverStream::new(rx);

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        res = client.publish(Request::new(outbound)) => {
            res?;
            // The outbound stream ended because the subscribe side dropped its
            // sender; the iteration is over either way.
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tonic::transport::Endpoint;

    #[tokio::test]
    async fn cancellation_exits_before_any_send() {
        let channel = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        let (_tx, rx) = mpsc::channel(1);
        let token = CancellationToken::new();
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), run(channel, rx, token))
            .await
            .expect("publish must observe cancellation promptly");
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[tokio::test]
    async fn unreachable_collector_is_a_stream_error() {
        // Port 1 on localhost refuses connections; the lazily-dialed channel
        // surfaces that on the first RPC.
        let channel = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        let (tx, rx) = mpsc::channel(1);
        drop(tx);
        let token = CancellationToken::new();

        let result = tokio::time::timeout(Duration::from_secs(5), run(channel, rx, token))
            .await
            .expect("publish must fail, not hang");
        assert!(result.is_err());
    }
}
