//! Integration flows across authentication, process engine and client.

pub mod flows;
pub mod identity_flows;

#[cfg(test)]
pub(crate) mod fixtures {
    use consumer_client::{ConsumerClient, ConsumerConfig};
    use parking_lot::Mutex;
    use pc_01_authentication::MockAuthenticationRepository;
    use pc_02_process_engine::MockProcessEngineRepository;
    use serde_json::{json, Value};
    use shared_bus::{ChannelSubscriber, InMemoryMessageBus, Message, MessageHandler};
    use shared_types::{Identity, UserTaskMessageData};
    use std::sync::Arc;

    pub type TestClient = ConsumerClient<MockAuthenticationRepository, MockProcessEngineRepository>;

    pub struct Harness {
        pub client: TestClient,
        pub bus: Arc<InMemoryMessageBus>,
        pub engine: Arc<MockProcessEngineRepository>,
    }

    pub fn harness() -> Harness {
        harness_with(
            MockProcessEngineRepository::new()
                .with_process_def("d1", "order", "Order")
                .with_process_def("d2", "leave", "Leave request"),
        )
    }

    pub fn harness_with(engine: MockProcessEngineRepository) -> Harness {
        let bus = Arc::new(InMemoryMessageBus::new());
        let auth = MockAuthenticationRepository::new()
            .with_user("alice", "secret", Identity::new("u1", "alice", ["clerk", "reviewer"]))
            .with_user("bob", "hunter2", Identity::new("u2", "bob", ["reviewer", "admin"]));
        let engine = Arc::new(engine);

        let client = ConsumerClient::new(
            ConsumerConfig::default(),
            Arc::new(auth),
            engine.clone(),
            bus.clone(),
        )
        .unwrap();
        client.initialize().unwrap();

        Harness { client, bus, engine }
    }

    /// Everything published on `channel` from now on.
    pub fn capture(bus: &InMemoryMessageBus, channel: &str) -> Arc<Mutex<Vec<Message>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: Arc<dyn MessageHandler> = Arc::new(move |_: &str, message: &Message| {
            sink.lock().push(message.clone());
        });
        bus.subscribe(channel, handler).unwrap();
        seen
    }

    pub fn form_task(id: &str, process_instance_id: &str) -> Value {
        json!({
            "userTaskEntity": {
                "id": id,
                "name": "Enter amount",
                "process": { "id": process_instance_id },
                "nodeDef": {
                    "extensions": {
                        "formFields": [
                            { "id": "amount", "label": "Amount", "type": "long", "defaultValue": 0 },
                            {
                                "id": "currency",
                                "label": "Currency",
                                "type": "enumeration",
                                "formValues": [
                                    { "id": "eur", "name": "Euro" },
                                    { "id": "usd", "name": "Dollar" }
                                ]
                            }
                        ]
                    }
                }
            },
            "uiName": "Form"
        })
    }

    pub fn confirm_task(id: &str, process_instance_id: &str) -> Value {
        json!({
            "userTaskEntity": {
                "id": id,
                "name": "Approve",
                "process": { "id": process_instance_id }
            },
            "uiName": "Confirm",
            "uiConfig": {
                "message": "Approve the request?",
                "layout": [
                    { "key": "confirm", "label": "OK" },
                    { "key": "other", "label": "No", "isCancel": true }
                ]
            }
        })
    }

    pub fn task_data(value: Value) -> UserTaskMessageData {
        serde_json::from_value(value).unwrap()
    }

    pub fn user_task_message(task: Value) -> Message {
        Message::new(json!({ "action": "userTask", "data": task }))
    }

    pub fn end_event_message() -> Message {
        Message::new(json!({ "action": "endEvent" }))
    }
}
