//! Fan-out of tag notifications to every connected client
//!
//! A broadcast pass works on a registry snapshot and hands the frame to every
//! session at once. A session whose queue is full is waited on for up to the
//! delivery timeout, so a slow reader still gets every frame. A session that
//! cannot take the frame is logged and skipped; it stays registered until its
//! own session loop notices the dead socket and unregisters.

use std::sync::Arc;
use std::time::Duration;

use futures::future;

use super::registry::ClientRegistry;
use crate::error::RegistryError;

/// Outcome of a single broadcast pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Delivers frames to all registered sessions
#[derive(Clone)]
pub struct BroadcastHub {
    registry: ClientRegistry,
    delivery_timeout: Duration,
}

impl BroadcastHub {
    pub fn new(registry: ClientRegistry, delivery_timeout: Duration) -> Self {
        Self {
            registry,
            delivery_timeout,
        }
    }

    /// How long a single session's full queue is waited on
    pub fn delivery_timeout(&self) -> Duration {
        self.delivery_timeout
    }

    /// Send one frame to every session in the current registry snapshot
    pub async fn send(&self, frame: Arc<str>) -> Result<BroadcastReport, RegistryError> {
        let sessions = self.registry.snapshot().await?;
        let results = future::join_all(
            sessions
                .iter()
                .map(|session| session.deliver(Arc::clone(&frame), self.delivery_timeout)),
        )
        .await;

        let mut report = BroadcastReport::default();
        for (session, result) in sessions.iter().zip(results) {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        peer = %session.peer,
                        session_id = session.id,
                        error = %e,
                        "could not send message to client"
                    );
                }
            }
        }

        tracing::debug!(
            delivered = report.delivered,
            failed = report.failed,
            "broadcast"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::websocket::registry::ClientSession;
    use tokio::sync::mpsc;

    const WAIT: Duration = Duration::from_secs(5);

    async fn connect(
        registry: &ClientRegistry,
        buffer: usize,
    ) -> (u64, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(buffer);
        let id = registry.next_id();
        registry
            .register(ClientSession::new(id, format!("10.0.0.{id}:9000"), tx))
            .await
            .unwrap();
        (id, rx)
    }

    #[tokio::test]
    async fn test_fan_out_to_all_sessions() {
        let registry = ClientRegistry::spawn();
        let hub = BroadcastHub::new(registry.clone(), WAIT);
        let mut receivers = Vec::new();
        for _ in 0..3 {
            receivers.push(connect(&registry, 8).await.1);
        }

        let report = hub.send(Arc::from("hello")).await.unwrap();
        assert_eq!(report, BroadcastReport { delivered: 3, failed: 0 });

        for rx in &mut receivers {
            assert_eq!(&*rx.recv().await.unwrap(), "hello");
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn test_unregistered_session_gets_nothing() {
        let registry = ClientRegistry::spawn();
        let hub = BroadcastHub::new(registry.clone(), WAIT);
        let (_, mut live) = connect(&registry, 8).await;
        let (gone_id, mut gone) = connect(&registry, 8).await;
        registry.unregister(gone_id).await.unwrap();

        hub.send(Arc::from("update")).await.unwrap();

        assert_eq!(&*live.recv().await.unwrap(), "update");
        assert!(gone.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_dead_session_does_not_block_others() {
        let registry = ClientRegistry::spawn();
        let hub = BroadcastHub::new(registry.clone(), WAIT);
        let (_, mut first) = connect(&registry, 8).await;
        let (dead_id, dead) = connect(&registry, 8).await;
        let (_, mut last) = connect(&registry, 8).await;
        drop(dead);

        let report = hub.send(Arc::from("update")).await.unwrap();
        assert_eq!(report, BroadcastReport { delivered: 2, failed: 1 });
        assert_eq!(&*first.recv().await.unwrap(), "update");
        assert_eq!(&*last.recv().await.unwrap(), "update");

        // Cleanup is left to the session's own loop
        let ids: Vec<u64> = registry.snapshot().await.unwrap().iter().map(|s| s.id).collect();
        assert!(ids.contains(&dead_id));
    }

    #[tokio::test]
    async fn test_slow_session_receives_every_frame() {
        let registry = ClientRegistry::spawn();
        let hub = BroadcastHub::new(registry.clone(), WAIT);
        let (_, mut fast) = connect(&registry, 8).await;
        let (_, mut slow) = connect(&registry, 1).await;

        let reader = tokio::spawn(async move {
            let mut frames = Vec::new();
            for _ in 0..3 {
                tokio::time::sleep(Duration::from_millis(10)).await;
                frames.push(slow.recv().await.unwrap().to_string());
            }
            frames
        });

        for frame in ["1", "2", "3"] {
            let report = hub.send(Arc::from(frame)).await.unwrap();
            assert_eq!(report, BroadcastReport { delivered: 2, failed: 0 });
        }

        assert_eq!(reader.await.unwrap(), vec!["1", "2", "3"]);
        for expected in ["1", "2", "3"] {
            assert_eq!(&*fast.recv().await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_stalled_session_times_out_without_blocking_others() {
        let registry = ClientRegistry::spawn();
        let hub = BroadcastHub::new(registry.clone(), Duration::from_millis(50));
        let (_, mut live) = connect(&registry, 8).await;
        let (stalled_id, _stalled) = connect(&registry, 1).await;

        assert_eq!(hub.send(Arc::from("1")).await.unwrap().delivered, 2);
        let report = hub.send(Arc::from("2")).await.unwrap();
        assert_eq!(report, BroadcastReport { delivered: 1, failed: 1 });

        assert_eq!(&*live.recv().await.unwrap(), "1");
        assert_eq!(&*live.recv().await.unwrap(), "2");
        let ids: Vec<u64> = registry.snapshot().await.unwrap().iter().map(|s| s.id).collect();
        assert!(ids.contains(&stalled_id));
    }

    #[tokio::test]
    async fn test_broadcast_with_no_clients() {
        let hub = BroadcastHub::new(ClientRegistry::spawn(), WAIT);
        assert_eq!(
            hub.send(Arc::from("x")).await.unwrap(),
            BroadcastReport::default()
        );
    }
}
