//! # Process Flows
//!
//! A client starts a process, receives tasks over role and participant
//! channels, answers them and observes the process end.
//!
//! ## Channels exercised
//!
//! - `/role/{role}`: task broadcasts for every identity holding the role
//! - `/participant/{participant_id}`: replies scoped to one process instance
//! - `/processengine/node/{task_id}`: results and events sent back to the engine

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;
    use pc_02_process_engine::{
        EngineEvent, EventFilter, EventKind, MockProcessEngineRepository, UserTaskProceedAction,
        WidgetType,
    };
    use serde_json::json;
    use shared_bus::{Message, MessagePublisher};
    use shared_types::RepositoryError;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use crate::integration::fixtures::{
        capture, confirm_task, end_event_message, form_task, harness, harness_with, task_data,
        user_task_message,
    };
    use consumer_client::ClientError;
    use pc_02_process_engine::EngineError;

    // =========================================================================
    // START → TASK → PROCEED → CANCEL
    // =========================================================================

    /// Two tasks of unrelated instances are answered under distinct
    /// participant ids, each on its own node channel.
    #[tokio::test]
    async fn test_start_proceed_and_cancel_use_distinct_participants() {
        let h = harness();
        h.client.login("alice", "secret").await.unwrap();
        let mut tasks = h
            .client
            .subscribe_events(EventFilter::kinds(vec![EventKind::RenderUserTask]));
        let proceeded = capture(&h.bus, "/processengine/node/t1");
        let cancelled = capture(&h.bus, "/processengine/node/t2");

        // Start: the engine learns the participant id the client listens on
        let process_instance_id = h.client.start_process_by_key("order").await.unwrap();
        let started_with = h.client.engine().participant_id(&process_instance_id).unwrap();
        assert_eq!(h.engine.started()[0].participant_id, started_with);
        assert!(h.bus.is_subscribed(&format!("/participant/{started_with}")));

        // The engine broadcasts the first task to the clerk role
        h.bus
            .publish("/role/clerk", user_task_message(form_task("t1", &process_instance_id)))
            .await
            .unwrap();
        let Some(EngineEvent::RenderUserTask(mut first)) = tasks.try_recv().unwrap() else {
            panic!("expected the first task to render");
        };
        assert_eq!(first.widget_type(), Some(WidgetType::Form));
        assert!(first.set_field_value("amount", json!(42)));
        assert!(first.set_field_value("currency", json!("eur")));
        h.client.proceed_user_task(&first, None).await.unwrap();

        // A second, unrelated task is cancelled
        h.bus
            .publish("/role/reviewer", user_task_message(confirm_task("t2", "pi-foreign")))
            .await
            .unwrap();
        let Some(EngineEvent::RenderUserTask(second)) = tasks.try_recv().unwrap() else {
            panic!("expected the second task to render");
        };
        h.client.cancel_user_task(&second).await.unwrap();

        let foreign = h.client.engine().participant_id("pi-foreign").unwrap();
        assert_ne!(started_with, foreign);

        let proceeded = proceeded.lock();
        assert_eq!(proceeded.len(), 1);
        assert_eq!(
            proceeded[0].data,
            json!({ "action": "proceed", "token": { "amount": 42, "currency": "eur" } })
        );
        assert_eq!(proceeded[0].participant_id(), Some(&started_with));

        let cancelled = cancelled.lock();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(
            cancelled[0].data,
            json!({ "action": "event", "eventType": "cancel" })
        );
        assert_eq!(cancelled[0].participant_id(), Some(&foreign));

        let metrics = h.client.engine_metrics();
        assert_eq!(metrics.tasks_rendered, 2);
        assert_eq!(metrics.tasks_proceeded, 1);
        assert_eq!(metrics.tasks_cancelled, 1);
    }

    #[tokio::test]
    async fn test_confirm_task_decline_sends_decline_key() {
        let h = harness();
        let published = capture(&h.bus, "/processengine/node/t3");
        let task = pc_02_process_engine::derive_task_config(&task_data(confirm_task("t3", "pi-3")));

        let actions = &task.confirm().unwrap().actions;
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1].action, Some(UserTaskProceedAction::Cancel));

        h.client
            .proceed_user_task(&task, Some(UserTaskProceedAction::Cancel))
            .await
            .unwrap();

        assert_eq!(
            published.lock()[0].data,
            json!({ "action": "proceed", "token": { "key": "decline" } })
        );
    }

    // =========================================================================
    // PROCESS END
    // =========================================================================

    #[tokio::test]
    async fn test_end_event_on_participant_channel_ends_instance() {
        let h = harness();
        let mut ends = h
            .client
            .subscribe_events(EventFilter::kinds(vec![EventKind::ProcessEnd]));

        let process_instance_id = h.client.start_process_by_id("d2").await.unwrap();
        let participant_id = h.client.engine().participant_id(&process_instance_id).unwrap();
        let channel = format!("/participant/{participant_id}");

        h.bus.publish(&channel, end_event_message()).await.unwrap();

        assert_eq!(
            ends.try_recv().unwrap(),
            Some(EngineEvent::ProcessEnd(Some(process_instance_id.clone())))
        );
        assert!(h.client.engine().participant_id(&process_instance_id).is_none());
        assert!(!h.bus.is_subscribed(&channel));
        assert_eq!(h.client.engine().correlation_count(), 0);

        // A late duplicate reaches nobody
        assert_eq!(h.bus.publish(&channel, end_event_message()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_end_event_on_role_channel_is_undetermined() {
        let h = harness();
        let process_instance_id = h.client.start_process_by_key("order").await.unwrap();
        let mut ends = h
            .client
            .subscribe_events(EventFilter::kinds(vec![EventKind::ProcessEnd]));

        h.bus
            .publish("/role/guest", end_event_message())
            .await
            .unwrap();

        assert_eq!(ends.try_recv().unwrap(), Some(EngineEvent::ProcessEnd(None)));
        // Nothing is guessed: the started instance keeps its participant
        assert!(h.client.engine().participant_id(&process_instance_id).is_some());
        assert_eq!(h.client.engine_metrics().processes_ended_undetermined, 1);
    }

    #[tokio::test]
    async fn test_task_answered_after_process_end_gets_new_participant() {
        let h = harness();
        let process_instance_id = h.client.start_process_by_key("order").await.unwrap();
        let first = h.client.engine().participant_id(&process_instance_id).unwrap();

        h.bus
            .publish(&format!("/participant/{first}"), end_event_message())
            .await
            .unwrap();
        let task = pc_02_process_engine::derive_task_config(&task_data(form_task(
            "t4",
            &process_instance_id,
        )));
        h.client.proceed_user_task(&task, None).await.unwrap();

        let second = h.client.engine().participant_id(&process_instance_id).unwrap();
        assert_ne!(first, second);
    }

    // =========================================================================
    // EVENT SURFACE
    // =========================================================================

    #[tokio::test]
    async fn test_named_channel_listener_sees_raw_messages() {
        let h = harness();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        h.client.add_listener(
            EventFilter::named("/role/guest"),
            Arc::new(move |event: &EngineEvent| sink.lock().push(event.name().to_string())),
        );

        h.bus
            .publish("/role/guest", Message::new(json!("maintenance at noon")))
            .await
            .unwrap();
        h.bus
            .publish("/role/guest", user_task_message(form_task("t5", "pi-5")))
            .await
            .unwrap();

        // The task renders; only the raw message is a channel event
        assert_eq!(*seen.lock(), vec!["/role/guest".to_string()]);
    }

    #[tokio::test]
    async fn test_event_stream_delivers_in_order() {
        let h = harness();
        let mut stream = h.client.event_stream(EventFilter::all());

        h.bus
            .publish("/role/guest", user_task_message(form_task("t6", "pi-6")))
            .await
            .unwrap();
        h.bus
            .publish("/role/guest", end_event_message())
            .await
            .unwrap();

        let first = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout waiting for event")
            .expect("stream closed");
        let second = timeout(Duration::from_millis(100), stream.next())
            .await
            .expect("timeout waiting for event")
            .expect("stream closed");

        assert!(matches!(first, EngineEvent::RenderUserTask(task) if task.id == "t6"));
        assert_eq!(second, EngineEvent::ProcessEnd(None));
    }

    #[tokio::test]
    async fn test_listener_proceeds_task_it_was_handed() {
        let h = harness();
        let published = capture(&h.bus, "/processengine/node/t8");

        // Listeners run synchronously; hand the task to a spawned answer
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        h.client.add_listener(
            EventFilter::kinds(vec![EventKind::RenderUserTask]),
            Arc::new(move |event: &EngineEvent| {
                if let EngineEvent::RenderUserTask(task) = event {
                    let _ = tx.send(task.clone());
                }
            }),
        );

        h.bus
            .publish("/role/guest", user_task_message(form_task("t8", "pi-8")))
            .await
            .unwrap();
        let task = rx.recv().await.unwrap();
        h.client.proceed_user_task(&task, None).await.unwrap();

        assert_eq!(
            published.lock()[0].data,
            json!({ "action": "proceed", "token": { "amount": null, "currency": null } })
        );
    }

    // =========================================================================
    // FAILURES
    // =========================================================================

    #[tokio::test]
    async fn test_failed_start_leaves_only_guest_channel() {
        let h = harness_with(MockProcessEngineRepository::new().failing());

        let result = h.client.start_process_by_key("order").await;

        assert!(matches!(
            result,
            Err(ClientError::Engine(EngineError::Repository(
                RepositoryError::Transport(_)
            )))
        ));
        assert_eq!(h.bus.channels(), vec!["/role/guest".to_string()]);
        assert_eq!(h.client.engine().correlation_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_task_passes_through() {
        let h = harness();
        let mut events = h.client.subscribe_events(EventFilter::all());

        h.bus
            .publish(
                "/role/guest",
                Message::new(json!({ "action": "userTask", "data": { "nope": true } })),
            )
            .await
            .unwrap();

        assert!(matches!(
            events.try_recv().unwrap(),
            Some(EngineEvent::Channel { channel, .. }) if channel == "/role/guest"
        ));
        assert_eq!(h.client.engine_metrics().tasks_rendered, 0);
    }

    #[tokio::test]
    async fn test_metrics_exposed_after_flow() {
        let h = harness();
        h.client.start_process_by_key("order").await.unwrap();

        let text = consumer_telemetry::gather_metrics().unwrap();
        assert!(text.contains("pc_engine_processes_started_total"));
        assert!(text.contains("pc_engine_operation_duration_seconds"));
    }
}
