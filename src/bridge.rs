//! Bridge orchestrator.
//!
//! Supervises one subscribe session and one publish session per retry
//! iteration, coupled by a fresh rendezvous channel under a fresh cancellation
//! scope. The instant either session exits, the scope is cancelled, the
//! sibling unwinds, and the pair is restarted according to the
//! [`RestartPolicy`]. The default policy restarts immediately and forever.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;
use tracing::error;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::{publish, subscribe};

/// Policy consulted between retry iterations.
///
/// `next_delay` receives the 1-based count of completed iterations and
/// returns how long to wait before the next one; `None` stops the supervision
/// loop. The production default never stops and never waits.
pub trait RestartPolicy {
    fn next_delay(&mut self, attempt: u64) -> Option<Duration>;
}

impl<P: RestartPolicy + ?Sized> RestartPolicy for &mut P {
    fn next_delay(&mut self, attempt: u64) -> Option<Duration> {
        (**self).next_delay(attempt)
    }
}

/// Restart immediately, forever.
#[derive(Debug, Default, Clone, Copy)]
pub struct Immediate;

impl RestartPolicy for Immediate {
    fn next_delay(&mut self, _attempt: u64) -> Option<Duration> {
        Some(Duration::ZERO)
    }
}

/// The dual-stream bridge.
///
/// Both gRPC channels are dialed once at startup and reused across
/// iterations; only the protocol sessions on top of them are recreated.
pub struct Bridge {
    config: Arc<Config>,
    target: Channel,
    collector: Channel,
}

impl Bridge {
    pub fn new(config: Config, target: Channel, collector: Channel) -> Self {
        Self {
            config: Arc::new(config),
            target,
            collector,
        }
    }

    /// Supervision loop: run session pairs until the policy says stop (the
    /// default policy never does).
    pub async fn run<P: RestartPolicy>(&self, mut policy: P) -> Result<()> {
        let mut attempt: u64 = 0;
        loop {
            let err = self.run_once().await;
            attempt += 1;
            error!(error = %err, attempt, "session pair exited, restarting");

            match policy.next_delay(attempt) {
                Some(delay) if delay.is_zero() => {}
                Some(delay) => tokio::time::sleep(delay).await,
                None => return Ok(()),
            }
        }
    }

    /// One retry iteration: fresh cancellation scope, fresh handoff channel,
    /// fresh session pair. Returns the error that ended the iteration.
    pub async fn run_once(&self) -> Error {
        let token = CancellationToken::new();
        // Capacity 1 is the closest tokio gets to a rendezvous channel: the
        // subscribe side stalls whenever the publish side is not keeping up,
        // which is the bridge's only flow-control mechanism.
        let (tx, rx) = mpsc::channel(1);

        let mut sub = tokio::spawn(subscribe::run(
            self.target.clone(),
            Arc::clone(&self.config),
            tx,
            token.clone(),
        ));
        let mut publ = tokio::spawn(publish::run(self.collector.clone(), rx, token.clone()));

        let (first, second) = tokio::select! {
            res = &mut sub => {
                token.cancel();
                let other = (&mut publ).await;
                (flatten(res), flatten(other))
            }
            res = &mut publ => {
                token.cancel();
                let other = (&mut sub).await;
                (flatten(res), flatten(other))
            }
        };

        primary_error(first, second)
    }
}

fn flatten(joined: std::result::Result<Result<()>, tokio::task::JoinError>) -> Result<()> {
    match joined {
        Ok(res) => res,
        Err(join_err) => Err(Error::Join(join_err)),
    }
}

/// Pick the error that triggered the teardown: the first session's own fault
/// if it has one, otherwise whatever the sibling reported. Cancellation is
/// propagation, not a primary fault.
fn primary_error(first: Result<()>, second: Result<()>) -> Error {
    match (first, second) {
        (Err(e), _) if !matches!(e, Error::Cancelled) => e,
        (_, Err(e)) => e,
        (Err(e), Ok(())) => e,
        (Ok(()), Ok(())) => Error::Cancelled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CollectorAddr, TlsSettings};
    use crate::path;
    use tonic::transport::Endpoint;

    /// Stops after a fixed number of iterations, recording each one.
    struct Bounded {
        remaining: u64,
        observed: Vec<u64>,
    }

    impl RestartPolicy for Bounded {
        fn next_delay(&mut self, attempt: u64) -> Option<Duration> {
            self.observed.push(attempt);
            if self.remaining == 0 {
                return None;
            }
            self.remaining -= 1;
            Some(Duration::ZERO)
        }
    }

    fn dead_end_bridge() -> Bridge {
        let config = Config {
            target_addr: "127.0.0.1:1".to_string(),
            collector: CollectorAddr {
                vrf: None,
                host_port: "127.0.0.1:1".to_string(),
            },
            target_value: String::new(),
            paths: vec![path::parse("/interfaces/interface/state/counters")],
            username: String::new(),
            password: String::new(),
            source_addr: None,
            tls: TlsSettings::default(),
        };
        // Port 1 refuses connections; lazy channels fail at RPC time, which
        // is exactly the per-iteration failure the orchestrator recovers from.
        let target = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        let collector = Endpoint::from_static("http://127.0.0.1:1").connect_lazy();
        Bridge::new(config, target, collector)
    }

    #[tokio::test]
    async fn iteration_returns_error_without_panicking() {
        let bridge = dead_end_bridge();
        let err = tokio::time::timeout(Duration::from_secs(10), bridge.run_once())
            .await
            .expect("iteration must end when both endpoints are dead");
        assert!(!err.is_fatal(), "iteration errors are retryable: {err}");
    }

    #[tokio::test]
    async fn restart_loop_runs_once_more_than_the_policy_allows() {
        let bridge = dead_end_bridge();
        // N induced failures -> N+1 start attempts: the policy sees attempts
        // 1..=N+1 and stops on the last one.
        let induced_failures = 3;

        let mut policy = Bounded {
            remaining: induced_failures,
            observed: Vec::new(),
        };
        tokio::time::timeout(Duration::from_secs(30), bridge.run(&mut policy))
            .await
            .expect("bounded policy must terminate the loop")
            .unwrap();

        assert_eq!(policy.observed, vec![1, 2, 3, 4]);
    }

    #[test]
    fn primary_error_prefers_the_real_fault() {
        let fault = Error::StreamClosed;
        let err = primary_error(Err(Error::Cancelled), Err(fault));
        assert!(matches!(err, Error::StreamClosed));

        let err = primary_error(Err(Error::StreamClosed), Err(Error::Cancelled));
        assert!(matches!(err, Error::StreamClosed));

        let err = primary_error(Ok(()), Err(Error::Cancelled));
        assert!(matches!(err, Error::Cancelled));
    }

    #[test]
    fn immediate_policy_never_stops_or_waits() {
        let mut policy = Immediate;
        for attempt in 1..=1000 {
            assert_eq!(policy.next_delay(attempt), Some(Duration::ZERO));
        }
    }
}
