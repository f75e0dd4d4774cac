//! Unit tests for the SessionBus - run lifecycle fan-out.

#[cfg(test)]
mod bus_tests {
    use crate::bus::SessionBus;
    use crate::events::SessionEvent;
    use crate::session::SessionState;
    use chrono::Utc;
    use uuid::Uuid;

    fn state_changed(state: SessionState) -> SessionEvent {
        SessionEvent::StateChanged {
            run_id: Uuid::new_v4(),
            state,
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers() {
        let bus = SessionBus::new(8);
        // Nobody listening is fine
        assert_eq!(bus.publish(state_changed(SessionState::Submitting)), 0);
    }

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = SessionBus::new(8);
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish(state_changed(SessionState::AwaitingResult)), 1);

        match rx.recv().await.unwrap() {
            SessionEvent::StateChanged { state, .. } => assert_eq!(state, SessionState::AwaitingResult),
            other => panic!("Expected StateChanged, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = SessionBus::new(8);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        let run_id = Uuid::new_v4();

        let delivered = bus.publish(SessionEvent::RunCompleted {
            run_id,
            trades: 3,
            at: Utc::now(),
        });

        assert_eq!(delivered, 2);
        assert_eq!(rx1.recv().await.unwrap().run_id(), run_id);
        assert_eq!(rx2.recv().await.unwrap().run_id(), run_id);
    }

    #[tokio::test]
    async fn test_clone_shares_channel() {
        let bus = SessionBus::new(8);
        let mut rx = bus.subscribe();
        let clone = bus.clone();

        clone.publish(state_changed(SessionState::Idle));

        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let bus = SessionBus::new(8);
        let _keep = bus.subscribe();
        bus.publish(state_changed(SessionState::Submitting));

        let mut late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }
}
