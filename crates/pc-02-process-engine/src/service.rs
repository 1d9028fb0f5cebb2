//! Process Engine Service
//!
//! Implements [`ProcessEngineApi`] over a [`ProcessEngineRepository`] and a
//! message bus, and exposes the engine's event surface.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use shared_bus::{actions, MessageBus, CANCEL_EVENT_TYPE};
use shared_types::{
    roles_of, HookId, Identity, IdentityStore, Pagination, ParticipantId, ProcessDefEntity,
    ProcessInstanceId, UserTaskEntity,
};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    build_task_result, derive_task_config, node_channel, EngineConfig, UserTaskConfig,
    UserTaskProceedAction,
};
use crate::error::{EngineError, EngineResult};
use crate::events::{EngineEventListener, EventFilter, EventStream, Subscription};
use crate::metrics::MetricsSnapshot;
use crate::ports::{ProcessEngineApi, ProcessEngineRepository};
use crate::router::{BindOutcome, EngineRouter};

enum StartTarget<'a> {
    Id(&'a str),
    Key(&'a str),
}

/// Process engine service.
pub struct ProcessEngineService<R: ProcessEngineRepository> {
    config: EngineConfig,
    repository: Arc<R>,
    identity_store: Arc<dyn IdentityStore>,
    router: Arc<EngineRouter>,
    initialized: AtomicBool,
    identity_hook: Mutex<Option<HookId>>,
}

impl<R: ProcessEngineRepository> ProcessEngineService<R> {
    pub fn new(
        config: EngineConfig,
        repository: Arc<R>,
        bus: Arc<dyn MessageBus>,
        identity_store: Arc<dyn IdentityStore>,
    ) -> EngineResult<Self> {
        config.validate()?;
        let router = EngineRouter::new(bus, config.event_channel_capacity);
        Ok(Self {
            config,
            repository,
            identity_store,
            router,
            initialized: AtomicBool::new(false),
            identity_hook: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Register a synchronous listener. Listeners run in registration order
    /// on the delivering thread and may call back into the engine.
    pub fn add_listener(&self, filter: EventFilter, listener: Arc<dyn EngineEventListener>) {
        self.router.emitter().add_listener(filter, listener);
    }

    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        self.router.emitter().subscribe(filter)
    }

    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.router.emitter().event_stream(filter)
    }

    /// Participant id currently correlated with a process instance.
    pub fn participant_id(&self, process_instance_id: &str) -> Option<ParticipantId> {
        self.router.participant_id(process_instance_id)
    }

    pub fn correlation_count(&self) -> usize {
        self.router.correlation_count()
    }

    /// Role and participant channels the engine is subscribed to.
    pub fn subscribed_channels(&self) -> BTreeSet<String> {
        self.router.subscribed_channels()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.router.metrics().snapshot()
    }

    fn page(&self, limit: Option<u64>, offset: Option<u64>) -> (u64, u64) {
        (
            limit.unwrap_or(self.config.default_page_size),
            offset.unwrap_or(0),
        )
    }

    async fn start_process(&self, target: StartTarget<'_>) -> EngineResult<ProcessInstanceId> {
        let participant_id = self.router.open_participant()?;

        let started = match target {
            StartTarget::Id(process_def_id) => {
                self.repository
                    .start_process_by_id(process_def_id, &participant_id)
                    .await
            }
            StartTarget::Key(process_def_key) => {
                self.repository
                    .start_process_by_key(process_def_key, &participant_id)
                    .await
            }
        };

        let process_instance_id = match started {
            Ok(id) => id,
            Err(e) => {
                self.router.abandon_participant(&participant_id);
                warn!(error = %e, "Process start failed");
                return Err(e.into());
            }
        };

        match self
            .router
            .bind_participant(process_instance_id.clone(), participant_id.clone())
        {
            BindOutcome::Bound | BindOutcome::AlreadyEnded => {}
            BindOutcome::Conflict => {
                self.router.abandon_participant(&participant_id);
                return Err(EngineError::CorrelationConflict {
                    process_instance_id,
                    participant_id,
                });
            }
        }

        self.router.metrics().record_process_started();
        info!(
            process_instance_id = %process_instance_id,
            participant_id = %participant_id,
            "Process started"
        );
        Ok(process_instance_id)
    }

    /// Publish a data message to a task's node channel, tagged with the
    /// participant id of the task's process.
    async fn publish_to_task(&self, task: &UserTaskConfig, data: Value) -> EngineResult<()> {
        let process_instance_id = task.process_instance_id();
        let (participant_id, created) = self.router.participant_for(process_instance_id)?;

        let bus = self.router.bus();
        let message = bus.create_data_message(data, &participant_id);
        let channel = node_channel(&task.id);

        if let Err(e) = bus.publish(&channel, message).await {
            if created {
                self.router.release(process_instance_id);
            }
            return Err(e.into());
        }

        debug!(
            channel = %channel,
            participant_id = %participant_id,
            "Task message published"
        );
        Ok(())
    }
}

impl<R: ProcessEngineRepository> Drop for ProcessEngineService<R> {
    fn drop(&mut self) {
        if let Some(hook_id) = self.identity_hook.get_mut().take() {
            self.identity_store.remove_identity_hook(hook_id);
        }
    }
}

#[async_trait]
impl<R: ProcessEngineRepository> ProcessEngineApi for ProcessEngineService<R> {
    fn initialize(&self) -> EngineResult<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("Process engine already initialized");
            return Ok(());
        }

        if let Err(e) = self.router.subscribe_guest() {
            self.initialized.store(false, Ordering::SeqCst);
            return Err(e.into());
        }

        // Hook first, so a change racing this call is not lost
        let router = Arc::downgrade(&self.router);
        let hook_id = self.identity_store.on_identity_change(Arc::new(
            move |old: Option<&Identity>, new: Option<&Identity>| {
                if let Some(router) = router.upgrade() {
                    router.on_identity_change(old, new);
                }
            },
        ));
        *self.identity_hook.lock() = Some(hook_id);

        let current = self.identity_store.get_identity();
        if current.is_some() {
            self.router.on_identity_change(None, current.as_ref());
        }

        info!(
            roles = roles_of(current.as_ref()).len(),
            channels = self.router.subscribed_channels().len(),
            "Process engine initialized"
        );
        Ok(())
    }

    async fn get_process_def_list(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<Pagination<ProcessDefEntity>> {
        let (limit, offset) = self.page(limit, offset);
        Ok(self.repository.get_process_def_list(limit, offset).await?)
    }

    async fn start_process_by_id(&self, process_def_id: &str) -> EngineResult<ProcessInstanceId> {
        self.start_process(StartTarget::Id(process_def_id)).await
    }

    async fn start_process_by_key(&self, process_def_key: &str) -> EngineResult<ProcessInstanceId> {
        self.start_process(StartTarget::Key(process_def_key)).await
    }

    async fn get_user_task_list(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<Pagination<UserTaskEntity>> {
        let (limit, offset) = self.page(limit, offset);
        Ok(self.repository.get_user_task_list(limit, offset).await?)
    }

    async fn get_user_task_list_by_process_def_id(
        &self,
        process_def_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<Pagination<UserTaskEntity>> {
        let (limit, offset) = self.page(limit, offset);
        Ok(self
            .repository
            .get_user_task_list_by_process_def_id(process_def_id, limit, offset)
            .await?)
    }

    async fn get_user_task_list_by_process_instance_id(
        &self,
        process_instance_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<Pagination<UserTaskEntity>> {
        let (limit, offset) = self.page(limit, offset);
        Ok(self
            .repository
            .get_user_task_list_by_process_instance_id(process_instance_id, limit, offset)
            .await?)
    }

    async fn get_user_task_config(&self, user_task_id: &str) -> EngineResult<UserTaskConfig> {
        let data = self.repository.get_user_task_data(user_task_id).await?;
        Ok(derive_task_config(&data))
    }

    async fn proceed_user_task(
        &self,
        task: &UserTaskConfig,
        action: Option<UserTaskProceedAction>,
    ) -> EngineResult<()> {
        let result = build_task_result(task, action);
        let data = json!({
            "action": actions::PROCEED,
            "token": result,
        });

        self.publish_to_task(task, data).await?;
        self.router.metrics().record_task_proceeded();
        info!(user_task_id = %task.id, action = ?action, "User task proceeded");
        Ok(())
    }

    async fn cancel_user_task(&self, task: &UserTaskConfig) -> EngineResult<()> {
        let data = json!({
            "action": actions::EVENT,
            "eventType": CANCEL_EVENT_TYPE,
        });

        self.publish_to_task(task, data).await?;
        self.router.metrics().record_task_cancelled();
        info!(user_task_id = %task.id, "User task cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EngineEvent, EventKind};
    use crate::ports::MockProcessEngineRepository;
    use parking_lot::{Mutex, RwLock};
    use shared_bus::{
        BusError, ChannelSubscriber, InMemoryMessageBus, Message, MessageHandler,
        MessagePublisher, SubscriptionError,
    };
    use shared_types::{IdentityChangeHook, RepositoryError, UserTaskMessageData};
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Identity store with synchronous hooks.
    #[derive(Default)]
    struct TestIdentityStore {
        identity: RwLock<Option<Identity>>,
        hooks: RwLock<Vec<(HookId, IdentityChangeHook)>>,
        next_hook_id: AtomicU64,
    }

    impl TestIdentityStore {
        fn hook_count(&self) -> usize {
            self.hooks.read().len()
        }
    }

    impl IdentityStore for TestIdentityStore {
        fn get_identity(&self) -> Option<Identity> {
            self.identity.read().clone()
        }

        fn set_identity(&self, identity: Option<Identity>) {
            let old = std::mem::replace(&mut *self.identity.write(), identity.clone());
            let hooks: Vec<IdentityChangeHook> =
                self.hooks.read().iter().map(|(_, hook)| hook.clone()).collect();
            for hook in &hooks {
                hook(old.as_ref(), identity.as_ref());
            }
        }

        fn on_identity_change(&self, hook: IdentityChangeHook) -> HookId {
            let id = HookId(self.next_hook_id.fetch_add(1, Ordering::Relaxed));
            self.hooks.write().push((id, hook));
            id
        }

        fn remove_identity_hook(&self, id: HookId) -> bool {
            let mut hooks = self.hooks.write();
            let before = hooks.len();
            hooks.retain(|(hook_id, _)| *hook_id != id);
            hooks.len() != before
        }
    }

    /// Bus whose publishes always fail. Subscriptions reach the inner bus.
    struct FailingBus {
        inner: Arc<InMemoryMessageBus>,
    }

    impl ChannelSubscriber for FailingBus {
        fn subscribe(
            &self,
            channel: &str,
            handler: Arc<dyn MessageHandler>,
        ) -> Result<(), SubscriptionError> {
            self.inner.subscribe(channel, handler)
        }

        fn unsubscribe(
            &self,
            channel: &str,
            handler: &Arc<dyn MessageHandler>,
        ) -> Result<(), SubscriptionError> {
            self.inner.unsubscribe(channel, handler)
        }
    }

    #[async_trait]
    impl MessagePublisher for FailingBus {
        async fn publish(&self, channel: &str, _message: Message) -> Result<usize, BusError> {
            Err(BusError::PublishFailed {
                channel: channel.to_string(),
                reason: "link down".to_string(),
            })
        }

        fn messages_published(&self) -> u64 {
            0
        }
    }

    type TestService = ProcessEngineService<MockProcessEngineRepository>;

    fn task_data(id: &str, process_instance_id: &str, ui_name: &str) -> UserTaskMessageData {
        serde_json::from_value(json!({
            "userTaskEntity": {
                "id": id,
                "name": id,
                "process": { "id": process_instance_id },
                "nodeDef": {
                    "extensions": {
                        "formFields": [{ "id": "amount", "label": "Amount", "type": "long" }]
                    }
                }
            },
            "uiName": ui_name
        }))
        .unwrap()
    }

    fn create_test_service_with(
        repository: MockProcessEngineRepository,
    ) -> (Arc<TestService>, Arc<InMemoryMessageBus>, Arc<TestIdentityStore>) {
        let bus = Arc::new(InMemoryMessageBus::new());
        let store = Arc::new(TestIdentityStore::default());
        let service = ProcessEngineService::new(
            EngineConfig::default(),
            Arc::new(repository),
            bus.clone(),
            store.clone(),
        )
        .unwrap();
        (Arc::new(service), bus, store)
    }

    fn create_test_service_on(
        bus: Arc<dyn MessageBus>,
        repository: MockProcessEngineRepository,
    ) -> (Arc<TestService>, Arc<TestIdentityStore>) {
        let store = Arc::new(TestIdentityStore::default());
        let service = ProcessEngineService::new(
            EngineConfig::default(),
            Arc::new(repository),
            bus,
            store.clone(),
        )
        .unwrap();
        (Arc::new(service), store)
    }

    fn create_test_service() -> (Arc<TestService>, Arc<InMemoryMessageBus>, Arc<TestIdentityStore>)
    {
        create_test_service_with(
            MockProcessEngineRepository::new()
                .with_process_def("d1", "order", "Order")
                .with_user_task(task_data("t1", "pi-1", "Form")),
        )
    }

    /// Capture everything published on a channel.
    fn capture(bus: &InMemoryMessageBus, channel: &str) -> Arc<Mutex<Vec<Message>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: Arc<dyn MessageHandler> = Arc::new(move |_: &str, message: &Message| {
            sink.lock().push(message.clone());
        });
        bus.subscribe(channel, handler).unwrap();
        seen
    }

    fn record_events(service: &TestService) -> Arc<Mutex<Vec<EngineEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        service.add_listener(
            EventFilter::all(),
            Arc::new(move |event: &EngineEvent| sink.lock().push(event.clone())),
        );
        events
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ProcessEngineService::new(
            EngineConfig {
                default_page_size: 0,
                ..Default::default()
            },
            Arc::new(MockProcessEngineRepository::new()),
            Arc::new(InMemoryMessageBus::new()),
            Arc::new(TestIdentityStore::default()),
        );
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_initialize_subscribes_guest_once() {
        let (service, bus, store) = create_test_service();

        service.initialize().unwrap();
        service.initialize().unwrap();

        assert!(service.is_initialized());
        assert!(bus.is_subscribed("/role/guest"));
        assert_eq!(bus.subscriber_count("/role/guest"), 1);
        assert_eq!(store.hook_count(), 1);
    }

    #[test]
    fn test_initialize_follows_current_identity() {
        let (service, bus, store) = create_test_service();
        *store.identity.write() = Some(Identity::new("u1", "alice", ["admin"]));

        service.initialize().unwrap();

        assert!(bus.is_subscribed("/role/admin"));
        assert!(bus.is_subscribed("/role/guest"));
    }

    #[test]
    fn test_identity_changes_reconcile_roles() {
        let (service, bus, store) = create_test_service();
        service.initialize().unwrap();

        store.set_identity(Some(Identity::new("u1", "alice", ["admin", "user"])));
        assert_eq!(
            bus.channels(),
            vec!["/role/admin", "/role/guest", "/role/user"]
        );

        store.set_identity(Some(Identity::new("u2", "bob", ["user"])));
        assert!(!bus.is_subscribed("/role/admin"));

        store.set_identity(None);
        assert_eq!(bus.channels(), vec!["/role/guest"]);
    }

    #[tokio::test]
    async fn test_start_process_correlates_participant() {
        let (service, bus, _) = create_test_service();
        service.initialize().unwrap();

        let process_instance_id = service.start_process_by_key("order").await.unwrap();

        let participant_id = service.participant_id(&process_instance_id).unwrap();
        assert!(bus.is_subscribed(&format!("/participant/{participant_id}")));
        assert_eq!(service.metrics().processes_started, 1);
    }

    #[tokio::test]
    async fn test_failed_start_leaves_no_trace() {
        let (service, bus, _) = create_test_service();
        service.initialize().unwrap();

        let result = service.start_process_by_id("missing").await;

        assert!(matches!(
            result,
            Err(EngineError::Repository(RepositoryError::NotFound(_)))
        ));
        assert_eq!(service.correlation_count(), 0);
        assert_eq!(bus.channels(), vec!["/role/guest"]);
    }

    #[tokio::test]
    async fn test_user_task_on_role_channel_renders() {
        let (service, bus, _) = create_test_service();
        service.initialize().unwrap();
        let events = record_events(&service);
        let mut tasks = service.subscribe(EventFilter::kinds(vec![EventKind::RenderUserTask]));

        let data = serde_json::to_value(task_data("t9", "pi-9", "Form")).unwrap();
        bus.publish(
            "/role/guest",
            Message::new(json!({ "action": "userTask", "data": data })),
        )
        .await
        .unwrap();

        let events = events.lock();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], EngineEvent::RenderUserTask(config) if config.id == "t9"));
        assert!(matches!(tasks.try_recv(), Ok(Some(EngineEvent::RenderUserTask(_)))));
        assert_eq!(service.metrics().tasks_rendered, 1);
    }

    #[tokio::test]
    async fn test_end_on_participant_channel_reports_instance() {
        let (service, bus, _) = create_test_service();
        service.initialize().unwrap();
        let events = record_events(&service);

        let process_instance_id = service.start_process_by_key("order").await.unwrap();
        let participant_id = service.participant_id(&process_instance_id).unwrap();
        let channel = format!("/participant/{participant_id}");

        bus.publish(&channel, Message::new(json!({ "action": "endEvent" })))
            .await
            .unwrap();

        assert_eq!(
            *events.lock(),
            vec![EngineEvent::ProcessEnd(Some(process_instance_id.clone()))]
        );
        assert!(service.participant_id(&process_instance_id).is_none());
        assert!(!bus.is_subscribed(&channel));
    }

    #[tokio::test]
    async fn test_end_on_role_channel_is_undetermined() {
        let (service, bus, _) = create_test_service();
        service.initialize().unwrap();
        let events = record_events(&service);

        bus.publish("/role/guest", Message::new(json!({ "action": "endEvent" })))
            .await
            .unwrap();

        assert_eq!(*events.lock(), vec![EngineEvent::ProcessEnd(None)]);
        assert_eq!(service.metrics().processes_ended_undetermined, 1);
    }

    #[tokio::test]
    async fn test_raw_message_passes_through() {
        let (service, bus, _) = create_test_service();
        service.initialize().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        service.add_listener(
            EventFilter::named("/role/guest"),
            Arc::new(move |event: &EngineEvent| sink.lock().push(event.name().to_string())),
        );

        bus.publish("/role/guest", Message::new(json!("ping")))
            .await
            .unwrap();

        assert_eq!(*seen.lock(), vec!["/role/guest".to_string()]);
    }

    #[tokio::test]
    async fn test_proceed_publishes_tagged_result() {
        let (service, bus, _) = create_test_service();
        service.initialize().unwrap();
        let process_instance_id = service.start_process_by_key("order").await.unwrap();
        let published = capture(&bus, "/processengine/node/t1");

        let mut task = service.get_user_task_config("t1").await.unwrap();
        assert_eq!(task.process_instance_id(), &process_instance_id);
        task.set_field_value("amount", json!(12));
        service.proceed_user_task(&task, None).await.unwrap();

        let published = published.lock();
        assert_eq!(published.len(), 1);
        assert_eq!(
            published[0].data,
            json!({ "action": "proceed", "token": { "amount": 12 } })
        );
        assert_eq!(
            published[0].participant_id(),
            service.participant_id(&process_instance_id).as_ref()
        );
    }

    #[tokio::test]
    async fn test_cancel_creates_correlation_on_first_use() {
        let (service, bus, _) = create_test_service();
        service.initialize().unwrap();
        let published = capture(&bus, "/processengine/node/t7");
        let task = derive_task_config(&task_data("t7", "foreign", "Confirm"));

        service.cancel_user_task(&task).await.unwrap();

        let participant_id = service.participant_id("foreign").unwrap();
        assert!(bus.is_subscribed(&format!("/participant/{participant_id}")));
        let published = published.lock();
        assert_eq!(
            published[0].data,
            json!({ "action": "event", "eventType": "cancel" })
        );
        assert_eq!(published[0].participant_id(), Some(&participant_id));
        assert_eq!(service.metrics().tasks_cancelled, 1);
    }

    #[tokio::test]
    async fn test_listener_may_reenter_engine() {
        let (service, bus, _) = create_test_service();
        service.initialize().unwrap();
        let observed = Arc::new(Mutex::new(None));

        let engine = Arc::downgrade(&service);
        let sink = observed.clone();
        service.add_listener(
            EventFilter::kinds(vec![EventKind::ProcessEnd]),
            Arc::new(move |_: &EngineEvent| {
                if let Some(engine) = engine.upgrade() {
                    *sink.lock() = Some(engine.subscribed_channels().len());
                }
            }),
        );

        bus.publish("/role/guest", Message::new(json!({ "action": "endEvent" })))
            .await
            .unwrap();

        assert_eq!(*observed.lock(), Some(1));
    }

    #[tokio::test]
    async fn test_listings_use_default_page() {
        let (service, _, _) = create_test_service();

        let defs = service.get_process_def_list(None, None).await.unwrap();
        assert_eq!(defs.limit, EngineConfig::default().default_page_size);
        assert_eq!(defs.offset, 0);
        assert_eq!(defs.data.len(), 1);

        let tasks = service
            .get_user_task_list_by_process_instance_id("pi-1", Some(5), Some(0))
            .await
            .unwrap();
        assert_eq!(tasks.limit, 5);
        assert_eq!(tasks.data[0].id, "t1");
    }

    #[tokio::test]
    async fn test_listing_failure_surfaces() {
        let (service, _, _) = create_test_service_with(MockProcessEngineRepository::new().failing());
        assert!(matches!(
            service.get_user_task_list(None, None).await,
            Err(EngineError::Repository(RepositoryError::Transport(_)))
        ));
    }

    // =========================================================================
    // CORRELATION CLEANUP
    // =========================================================================

    #[tokio::test]
    async fn test_failed_publish_releases_new_correlation() {
        let inner = Arc::new(InMemoryMessageBus::new());
        let (service, _) = create_test_service_on(
            Arc::new(FailingBus {
                inner: inner.clone(),
            }),
            MockProcessEngineRepository::new(),
        );
        service.initialize().unwrap();
        let task = derive_task_config(&task_data("t7", "foreign", "Confirm"));

        let result = service.cancel_user_task(&task).await;

        assert!(matches!(
            result,
            Err(EngineError::Bus(BusError::PublishFailed { .. }))
        ));
        assert_eq!(service.correlation_count(), 0);
        assert!(service.participant_id("foreign").is_none());
        assert_eq!(inner.channels(), vec!["/role/guest"]);
        assert_eq!(service.metrics().tasks_cancelled, 0);
    }

    #[tokio::test]
    async fn test_failed_publish_keeps_existing_correlation() {
        let inner = Arc::new(InMemoryMessageBus::new());
        let (service, _) = create_test_service_on(
            Arc::new(FailingBus {
                inner: inner.clone(),
            }),
            MockProcessEngineRepository::new()
                .with_process_def("d1", "order", "Order")
                .with_user_task(task_data("t1", "pi-1", "Form")),
        );
        service.initialize().unwrap();
        let process_instance_id = service.start_process_by_key("order").await.unwrap();
        let participant_id = service.participant_id(&process_instance_id).unwrap();
        let task = service.get_user_task_config("t1").await.unwrap();

        assert!(service.proceed_user_task(&task, None).await.is_err());

        assert_eq!(service.participant_id(&process_instance_id), Some(participant_id.clone()));
        assert!(inner.is_subscribed(&format!("/participant/{participant_id}")));
    }

    #[tokio::test]
    async fn test_conflicting_instance_id_abandons_participant() {
        let (service, bus, _) = create_test_service_with(
            MockProcessEngineRepository::new()
                .with_process_def("d1", "order", "Order")
                .with_instance_id("pi-fixed"),
        );
        service.initialize().unwrap();
        let first = service.start_process_by_key("order").await.unwrap();
        let kept = service.participant_id(&first).unwrap();

        let result = service.start_process_by_key("order").await;

        assert!(matches!(
            result,
            Err(EngineError::CorrelationConflict { ref process_instance_id, ref participant_id })
                if process_instance_id == "pi-fixed" && *participant_id != kept
        ));
        assert_eq!(service.correlation_count(), 1);
        assert_eq!(service.participant_id("pi-fixed"), Some(kept.clone()));
        assert_eq!(
            bus.channels(),
            vec![format!("/participant/{kept}"), "/role/guest".to_string()]
        );
        assert_eq!(service.metrics().processes_started, 1);
    }

    #[tokio::test]
    async fn test_process_ending_before_start_returns_leaves_no_correlation() {
        let bus = Arc::new(InMemoryMessageBus::new());
        let (service, _) = create_test_service_on(
            bus.clone(),
            MockProcessEngineRepository::new()
                .with_process_def("d1", "order", "Order")
                .ending_on_start(bus.clone()),
        );
        service.initialize().unwrap();
        let events = record_events(&service);

        let process_instance_id = service.start_process_by_key("order").await.unwrap();

        assert_eq!(*events.lock(), vec![EngineEvent::ProcessEnd(None)]);
        assert!(service.participant_id(&process_instance_id).is_none());
        assert_eq!(service.correlation_count(), 0);
        assert_eq!(bus.channels(), vec!["/role/guest"]);
        assert_eq!(service.metrics().processes_started, 1);
    }

    #[tokio::test]
    async fn test_dropped_service_unregisters_identity_hook() {
        let (service, bus, store) = create_test_service();
        service.initialize().unwrap();
        assert_eq!(store.hook_count(), 1);

        drop(service);

        assert_eq!(store.hook_count(), 0);
        store.set_identity(Some(Identity::new("u1", "alice", ["admin"])));
        assert!(!bus.is_subscribed("/role/admin"));
    }
}
