//! # Consumer Client
//!
//! Facade over the authentication and process engine subsystems. Both share
//! one token repository, so the engine's role subscriptions follow the
//! logged-in identity without any glue in application code.

use consumer_telemetry::{
    log_event, metric_inc, register_metrics, time_operation, AUTH_LOGINS, OPERATION_ERRORS,
    PROCESSES_STARTED, USER_TASKS_COMPLETED,
};
use pc_01_authentication::{
    AuthenticationApi, AuthenticationRepository, AuthenticationService, AuthenticationStateEvent,
    InMemoryTokenRepository, LoginResult, LogoutResult,
};
use pc_02_process_engine::{
    EngineEventListener, EventFilter, EventStream, MetricsSnapshot, ProcessEngineApi,
    ProcessEngineRepository, ProcessEngineService, Subscription, UserTaskConfig,
    UserTaskProceedAction,
};
use shared_bus::MessageBus;
use shared_types::{Identity, Pagination, ProcessDefEntity, ProcessInstanceId, UserTaskEntity};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::ConsumerConfig;
use crate::error::ClientError;
use crate::listener::TelemetryListener;
use crate::SUBSYSTEM;

/// Process-consumer client.
pub struct ConsumerClient<A: AuthenticationRepository, E: ProcessEngineRepository> {
    config: ConsumerConfig,
    auth: AuthenticationService<A>,
    engine: ProcessEngineService<E>,
    listener_installed: AtomicBool,
}

impl<A: AuthenticationRepository, E: ProcessEngineRepository> ConsumerClient<A, E> {
    pub fn new(
        config: ConsumerConfig,
        auth_repository: Arc<A>,
        engine_repository: Arc<E>,
        bus: Arc<dyn MessageBus>,
    ) -> Result<Self, ClientError> {
        config.validate()?;

        let tokens = Arc::new(InMemoryTokenRepository::new());
        let auth = AuthenticationService::new(auth_repository, tokens.clone());
        let engine =
            ProcessEngineService::new(config.engine.clone(), engine_repository, bus, tokens)?;

        Ok(Self {
            config,
            auth,
            engine,
            listener_installed: AtomicBool::new(false),
        })
    }

    pub fn config(&self) -> &ConsumerConfig {
        &self.config
    }

    /// Register metrics, subscribe the guest channel and start following
    /// the session identity. Safe to call more than once.
    pub fn initialize(&self) -> Result<(), ClientError> {
        register_metrics()?;
        track("initialize", self.engine.initialize())?;

        if !self.listener_installed.swap(true, Ordering::SeqCst) {
            self.engine
                .add_listener(EventFilter::all(), Arc::new(TelemetryListener));
        }

        log_event!(
            info,
            SUBSYSTEM,
            "Client initialized",
            processengine = %self.config.processengine_url,
            iam = %self.config.iam_url
        );
        Ok(())
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult, ClientError> {
        let _timer = time_operation!("login");
        let result = self.auth.login(username, password).await;
        let outcome = if result.is_ok() { "success" } else { "failure" };
        metric_inc!(AUTH_LOGINS, &[outcome]);
        track("login", result)
    }

    pub async fn logout(&self) -> Result<LogoutResult, ClientError> {
        let _timer = time_operation!("logout");
        track("logout", self.auth.logout().await)
    }

    pub fn get_identity(&self) -> Option<Identity> {
        self.auth.get_identity()
    }

    pub fn get_token(&self) -> Option<String> {
        self.auth.get_token()
    }

    pub fn has_token(&self) -> bool {
        self.auth.has_token()
    }

    pub fn subscribe_auth_state(&self) -> broadcast::Receiver<AuthenticationStateEvent> {
        self.auth.subscribe_state()
    }

    // =========================================================================
    // Process engine
    // =========================================================================

    pub async fn get_process_def_list(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Pagination<ProcessDefEntity>, ClientError> {
        let _timer = time_operation!("get_process_def_list");
        track(
            "get_process_def_list",
            self.engine.get_process_def_list(limit, offset).await,
        )
    }

    pub async fn start_process_by_id(
        &self,
        process_def_id: &str,
    ) -> Result<ProcessInstanceId, ClientError> {
        let _timer = time_operation!("start_process");
        let process_instance_id = track(
            "start_process",
            self.engine.start_process_by_id(process_def_id).await,
        )?;
        metric_inc!(PROCESSES_STARTED);
        Ok(process_instance_id)
    }

    pub async fn start_process_by_key(
        &self,
        process_def_key: &str,
    ) -> Result<ProcessInstanceId, ClientError> {
        let _timer = time_operation!("start_process");
        let process_instance_id = track(
            "start_process",
            self.engine.start_process_by_key(process_def_key).await,
        )?;
        metric_inc!(PROCESSES_STARTED);
        Ok(process_instance_id)
    }

    pub async fn get_user_task_list(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Pagination<UserTaskEntity>, ClientError> {
        let _timer = time_operation!("get_user_task_list");
        track(
            "get_user_task_list",
            self.engine.get_user_task_list(limit, offset).await,
        )
    }

    pub async fn get_user_task_list_by_process_def_id(
        &self,
        process_def_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Pagination<UserTaskEntity>, ClientError> {
        let _timer = time_operation!("get_user_task_list");
        track(
            "get_user_task_list",
            self.engine
                .get_user_task_list_by_process_def_id(process_def_id, limit, offset)
                .await,
        )
    }

    pub async fn get_user_task_list_by_process_instance_id(
        &self,
        process_instance_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<Pagination<UserTaskEntity>, ClientError> {
        let _timer = time_operation!("get_user_task_list");
        track(
            "get_user_task_list",
            self.engine
                .get_user_task_list_by_process_instance_id(process_instance_id, limit, offset)
                .await,
        )
    }

    pub async fn get_user_task_config(
        &self,
        user_task_id: &str,
    ) -> Result<UserTaskConfig, ClientError> {
        let _timer = time_operation!("get_user_task_config");
        track(
            "get_user_task_config",
            self.engine.get_user_task_config(user_task_id).await,
        )
    }

    pub async fn proceed_user_task(
        &self,
        task: &UserTaskConfig,
        action: Option<UserTaskProceedAction>,
    ) -> Result<(), ClientError> {
        let _timer = time_operation!("proceed_user_task");
        track(
            "proceed_user_task",
            self.engine.proceed_user_task(task, action).await,
        )?;
        metric_inc!(USER_TASKS_COMPLETED, &["proceed"]);
        Ok(())
    }

    pub async fn cancel_user_task(&self, task: &UserTaskConfig) -> Result<(), ClientError> {
        let _timer = time_operation!("cancel_user_task");
        track("cancel_user_task", self.engine.cancel_user_task(task).await)?;
        metric_inc!(USER_TASKS_COMPLETED, &["cancel"]);
        Ok(())
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn add_listener(&self, filter: EventFilter, listener: Arc<dyn EngineEventListener>) {
        self.engine.add_listener(filter, listener);
    }

    pub fn subscribe_events(&self, filter: EventFilter) -> Subscription {
        self.engine.subscribe(filter)
    }

    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.engine.event_stream(filter)
    }

    pub fn engine_metrics(&self) -> MetricsSnapshot {
        self.engine.metrics()
    }

    /// The underlying engine, for routing diagnostics.
    pub fn engine(&self) -> &ProcessEngineService<E> {
        &self.engine
    }
}

/// Count and log a failed operation.
fn track<T, Err>(operation: &'static str, result: Result<T, Err>) -> Result<T, ClientError>
where
    ClientError: From<Err>,
{
    result.map_err(|e| {
        let error = ClientError::from(e);
        metric_inc!(OPERATION_ERRORS, &[operation]);
        log_event!(warn, SUBSYSTEM, "Operation failed", operation = operation, error = %error);
        error
    })
}
