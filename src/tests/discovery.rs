// Discovery Surface Tests
// Custom record factories and aggregation of sources behind the common trait

#[cfg(test)]
mod tests {
    use crate::network::{
        Bootstrap, BootstrapConfig, DiagnosticKind, DiscoveryError, DiscoveryEvent,
        DiscoverySource, PeerRecord, RecordFactory, TAG,
    };
    use async_trait::async_trait;
    use libp2p::PeerId;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::broadcast::error::TryRecvError;

    const INTERVAL_MS: u64 = 10_000;

    // =========================================================================
    // HELPER FUNCTIONS
    // =========================================================================

    fn create_peer_id() -> PeerId {
        let keypair = libp2p::identity::Keypair::generate_ed25519();
        PeerId::from(keypair.public())
    }

    fn bootnode(peer_id: &PeerId) -> String {
        format!("/ip4/10.0.0.1/tcp/4001/p2p/{}", peer_id)
    }

    fn config(peers: &[PeerId]) -> BootstrapConfig {
        BootstrapConfig::new(peers.iter().map(bootnode).collect()).with_interval_ms(INTERVAL_MS)
    }

    /// Refuses one peer, builds plain records for everyone else
    struct RejectingFactory {
        rejected: PeerId,
    }

    #[async_trait]
    impl RecordFactory for RejectingFactory {
        async fn create(&self, peer_id: PeerId) -> Result<PeerRecord, DiscoveryError> {
            if peer_id == self.rejected {
                return Err(DiscoveryError::RecordConstructionFailure(format!(
                    "{}: refused",
                    peer_id
                )));
            }
            Ok(PeerRecord::new(peer_id))
        }
    }

    /// Takes a fixed time per record and counts calls
    struct SlowFactory {
        delay: Duration,
        calls: AtomicUsize,
    }

    impl SlowFactory {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordFactory for SlowFactory {
        async fn create(&self, peer_id: PeerId) -> Result<PeerRecord, DiscoveryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            Ok(PeerRecord::new(peer_id))
        }
    }

    // =========================================================================
    // RECORD FACTORIES
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_factory_failure_skips_only_that_candidate() {
        let good = create_peer_id();
        let bad = create_peer_id();

        let factory = Arc::new(RejectingFactory { rejected: bad });
        let mut bootstrap = Bootstrap::with_factory(config(&[bad, good]), factory);
        let mut rx = bootstrap.subscribe();
        let mut diagnostics = bootstrap.diagnostics();

        bootstrap.start();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.record().id, good);

        let diagnostic = diagnostics.recv().await.unwrap();
        assert_eq!(diagnostic.candidate, bootnode(&bad));
        assert_eq!(diagnostic.kind(), DiagnosticKind::RecordConstructionFailure);

        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(bootstrap.stats().peers_emitted, 1);
        assert_eq!(bootstrap.stats().candidates_rejected, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_factory_records_get_address_attached() {
        let peer = create_peer_id();
        let factory = Arc::new(RejectingFactory {
            rejected: create_peer_id(),
        });
        let mut bootstrap = Bootstrap::with_factory(config(&[peer]), factory);
        let mut rx = bootstrap.subscribe();

        bootstrap.start();

        let record = rx.recv().await.unwrap().record().clone();
        assert_eq!(record.addresses.len(), 1);
        assert_eq!(record.addresses[0].to_string(), bootnode(&peer));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_factory_does_not_block_pass() {
        let peers: Vec<PeerId> = (0..3).map(|_| create_peer_id()).collect();
        let factory = Arc::new(SlowFactory::new(Duration::from_millis(500)));

        let mut bootstrap = Bootstrap::with_factory(config(&peers), factory.clone());
        let mut rx = bootstrap.subscribe();

        let started = tokio::time::Instant::now();
        bootstrap.start();

        let mut ids = HashSet::new();
        for _ in 0..peers.len() {
            ids.insert(rx.recv().await.unwrap().record().id);
        }

        // Constructions run side by side, not one after another
        assert_eq!(ids.len(), peers.len());
        assert!(started.elapsed() < Duration::from_millis(1000));
        assert_eq!(factory.calls.load(Ordering::SeqCst), peers.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_records_still_emitted_after_stop() {
        let peer = create_peer_id();
        let factory = Arc::new(SlowFactory::new(Duration::from_millis(500)));

        let mut bootstrap = Bootstrap::with_factory(config(&[peer]), factory);
        let mut rx = bootstrap.subscribe();

        bootstrap.start();
        bootstrap.stop();
        assert!(!bootstrap.is_running());

        // The construction started by the immediate pass completes anyway
        let event = rx.recv().await.unwrap();
        assert_eq!(event.record().id, peer);

        // But no further pass is scheduled
        tokio::time::sleep(Duration::from_millis(3 * INTERVAL_MS)).await;
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(bootstrap.stats().passes, 1);
    }

    // =========================================================================
    // AGGREGATION
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_sources_aggregate_behind_trait() {
        let first = create_peer_id();
        let second = create_peer_id();

        let mut sources: Vec<Box<dyn DiscoverySource>> = vec![
            Box::new(Bootstrap::new(config(&[first]))),
            Box::new(Bootstrap::new(config(&[second]))),
        ];

        let mut receivers: Vec<_> = sources.iter().map(|s| s.subscribe()).collect();
        for source in sources.iter_mut() {
            assert_eq!(source.tag(), TAG);
            source.start();
            assert!(source.is_running());
        }

        let mut found = Vec::new();
        for (source, rx) in sources.iter().zip(receivers.iter_mut()) {
            let DiscoveryEvent::PeerDiscovered(record) = rx.recv().await.unwrap();
            found.push((source.tag(), record.id));
        }

        assert_eq!(found, vec![("bootstrap", first), ("bootstrap", second)]);

        for source in sources.iter_mut() {
            source.stop();
            assert!(!source.is_running());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_subscriber_receives_every_event() {
        let peer = create_peer_id();
        let mut bootstrap = Bootstrap::new(config(&[peer]));
        let mut a = bootstrap.subscribe();
        let mut b = bootstrap.subscribe();

        bootstrap.start();

        assert_eq!(a.recv().await.unwrap().record().id, peer);
        assert_eq!(b.recv().await.unwrap().record().id, peer);
    }
}
