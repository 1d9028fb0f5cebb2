//! # Identity Flows
//!
//! Logging in and out through the client moves the engine's role-channel
//! subscriptions. The guest channel stays subscribed throughout.

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pc_01_authentication::AuthenticationStateEvent;
    use pc_02_process_engine::{EngineEvent, EventFilter, EventKind};
    use shared_bus::MessagePublisher;

    use crate::integration::fixtures::{form_task, harness, user_task_message};

    fn channels(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[tokio::test]
    async fn test_anonymous_client_listens_on_guest_only() {
        let h = harness();
        assert_eq!(h.client.engine().subscribed_channels(), channels(&["/role/guest"]));
        assert_eq!(h.bus.channels(), vec!["/role/guest".to_string()]);
        assert!(h.client.get_identity().is_none());
    }

    #[tokio::test]
    async fn test_login_switch_and_logout() {
        let h = harness();
        let mut state = h.client.subscribe_auth_state();

        h.client.login("alice", "secret").await.unwrap();
        assert_eq!(
            h.client.engine().subscribed_channels(),
            channels(&["/role/clerk", "/role/guest", "/role/reviewer"])
        );
        assert!(matches!(
            state.try_recv(),
            Ok(AuthenticationStateEvent::Login(identity)) if identity.name == "alice"
        ));

        // Switching users keeps the shared role and swaps the rest
        h.client.login("bob", "hunter2").await.unwrap();
        assert_eq!(
            h.client.engine().subscribed_channels(),
            channels(&["/role/admin", "/role/guest", "/role/reviewer"])
        );
        assert!(!h.bus.is_subscribed("/role/clerk"));
        assert_eq!(h.bus.subscriber_count("/role/reviewer"), 1);

        h.client.logout().await.unwrap();
        assert_eq!(h.client.engine().subscribed_channels(), channels(&["/role/guest"]));
        assert!(!h.client.has_token());
    }

    #[tokio::test]
    async fn test_dropped_role_no_longer_delivers() {
        let h = harness();
        let mut tasks = h
            .client
            .subscribe_events(EventFilter::kinds(vec![EventKind::RenderUserTask]));

        h.client.login("alice", "secret").await.unwrap();
        h.bus
            .publish("/role/clerk", user_task_message(form_task("t1", "pi-1")))
            .await
            .unwrap();
        assert!(matches!(
            tasks.try_recv().unwrap(),
            Some(EngineEvent::RenderUserTask(_))
        ));

        h.client.logout().await.unwrap();
        let receivers = h
            .bus
            .publish("/role/clerk", user_task_message(form_task("t2", "pi-2")))
            .await
            .unwrap();

        assert_eq!(receivers, 0);
        assert_eq!(tasks.try_recv().unwrap(), None);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_subscriptions() {
        let h = harness();
        h.client.login("alice", "secret").await.unwrap();
        let before = h.client.engine().subscribed_channels();

        assert!(h.client.login("bob", "wrong").await.is_err());

        assert_eq!(h.client.engine().subscribed_channels(), before);
        assert_eq!(h.client.get_identity().map(|i| i.id), Some("u1".to_string()));
    }

    #[tokio::test]
    async fn test_participant_channels_survive_identity_change() {
        let h = harness();
        h.client.login("alice", "secret").await.unwrap();
        let process_instance_id = h.client.start_process_by_key("order").await.unwrap();
        let participant_id = h.client.engine().participant_id(&process_instance_id).unwrap();

        h.client.logout().await.unwrap();

        assert!(h.bus.is_subscribed(&format!("/participant/{participant_id}")));
        assert_eq!(h.client.engine().correlation_count(), 1);
    }
}
