//! Driving Ports (API - Inbound)

use async_trait::async_trait;
use shared_types::{Pagination, ProcessDefEntity, ProcessInstanceId, UserTaskEntity};

use crate::domain::{UserTaskConfig, UserTaskProceedAction};
use crate::error::EngineResult;

/// Primary Process Engine API
///
/// Listing operations take an optional page: a missing `limit` uses the
/// configured default page size, a missing `offset` starts at 0.
#[async_trait]
pub trait ProcessEngineApi: Send + Sync {
    /// Subscribe the guest channel and start following identity changes.
    fn initialize(&self) -> EngineResult<()>;

    async fn get_process_def_list(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<Pagination<ProcessDefEntity>>;

    /// Start a process instance by definition id.
    ///
    /// The instance's participant channel is live before the engine is asked
    /// to start it, so no reply is missed.
    async fn start_process_by_id(&self, process_def_id: &str) -> EngineResult<ProcessInstanceId>;

    /// Start a process instance by definition key.
    async fn start_process_by_key(&self, process_def_key: &str) -> EngineResult<ProcessInstanceId>;

    async fn get_user_task_list(
        &self,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<Pagination<UserTaskEntity>>;

    async fn get_user_task_list_by_process_def_id(
        &self,
        process_def_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<Pagination<UserTaskEntity>>;

    async fn get_user_task_list_by_process_instance_id(
        &self,
        process_instance_id: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<Pagination<UserTaskEntity>>;

    /// Fetch a task and derive its widget configuration.
    async fn get_user_task_config(&self, user_task_id: &str) -> EngineResult<UserTaskConfig>;

    /// Submit the task's result to its node channel.
    ///
    /// # Arguments
    /// * `task` - Task as returned by `get_user_task_config` or a
    ///   `RenderUserTask` event, with form values filled in
    /// * `action` - Decision for confirm tasks; proceed when absent
    async fn proceed_user_task(
        &self,
        task: &UserTaskConfig,
        action: Option<UserTaskProceedAction>,
    ) -> EngineResult<()>;

    /// Raise the cancel event on the task's node channel.
    async fn cancel_user_task(&self, task: &UserTaskConfig) -> EngineResult<()>;
}
