//! Subscribe session: one outbound gNMI Subscribe stream against the target.
//!
//! Sends a single subscription request covering every configured path, then
//! forwards each incoming update message to the handoff channel untouched.
//! Runs for one retry iteration; any failure (including a clean stream close
//! by the target) ends the iteration.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;
use tonic::Request;
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gnmi::g_nmi_client::GNmiClient;
use crate::gnmi::{
    subscribe_request, subscription_list, Path, SubscribeRequest, SubscribeResponse, Subscription,
    SubscriptionList, SubscriptionMode,
};

/// Run the subscribe session for one retry iteration.
pub async fn run(
    channel: Channel,
    config: Arc<Config>,
    tx: mpsc::Sender<SubscribeResponse>,
    token: CancellationToken,
) -> Result<()> {
    let mut client = GNmiClient::new(channel);

    let request = authenticated(
        Request::new(tokio_stream::once(build_request(&config))),
        &config,
    )?;

    let response = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(Error::Cancelled),
        res = client.subscribe(request) => res?,
    };
    let stream = response.into_inner();

    info!(target = %config.target_addr, "gNMI subscription established");

    forward(stream, tx, token).await
}

/// Build the single SubscribeRequest: a STREAM-mode subscription list with the
/// target identifier as prefix and one TARGET_DEFINED entry per configured
/// path, in configured order.
fn build_request(config: &Config) -> SubscribeRequest {
    let subscription = config
        .paths
        .iter()
        .map(|path| Subscription {
            path: Some(path.clone()),
            mode: SubscriptionMode::TargetDefined as i32,
            ..Default::default()
        })
        .collect();

    let subscription_list = SubscriptionList {
        prefix: Some(Path {
            target: config.target_value.clone(),
            ..Default::default()
        }),
        subscription,
        mode: subscription_list::Mode::Stream as i32,
        ..Default::default()
    };

    SubscribeRequest {
        request: Some(subscribe_request::Request::Subscribe(subscription_list)),
        extension: vec![],
    }
}

/// Attach username/password request metadata when a username is configured.
/// The password may be empty; it is only sent alongside a non-empty username.
fn authenticated<T>(mut request: Request<T>, config: &Config) -> Result<Request<T>> {
    if !config.username.is_empty() {
        request
            .metadata_mut()
            .insert("username", config.username.parse()?);
        request
            .metadata_mut()
            .insert("password", config.password.parse()?);
    }
    Ok(request)
}

/// Forward every update message to the handoff channel, racing both the
/// receive and the send against cancellation.
pub(crate) async fn forward<S>(
    mut stream: S,
    tx: mpsc::Sender<SubscribeResponse>,
    token: CancellationToken,
) -> Result<()>
where
    S: Stream<Item = std::result::Result<SubscribeResponse, tonic::Status>> + Unpin,
{
    loop {
        let message = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Error::Cancelled),
            next = stream.next() => match next {
                Some(Ok(message)) => message,
                Some(Err(status)) => return Err(Error::Stream(status)),
                None => return Err(Error::StreamClosed),
            },
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => return Err(Error::Cancelled),
            sent = tx.send(message) => {
                // A closed channel means the publish side is gone; the
                // orchestrator is already tearing this iteration down.
                if sent.is_err() {
                    return Err(Error::Cancelled);
                }
            }
        }
    }
}
