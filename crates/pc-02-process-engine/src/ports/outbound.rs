//! Driven Ports (SPI - Outbound)
//!
//! The transport to the remote process engine.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use shared_bus::{actions, Message, MessageBus};
use shared_types::{
    Pagination, ParticipantId, ProcessDefEntity, ProcessDefId, ProcessInstanceId,
    RepositoryError, UserTaskEntity, UserTaskMessageData,
};
use std::sync::Arc;

use crate::domain::participant_channel;

/// Remote process engine.
#[async_trait]
pub trait ProcessEngineRepository: Send + Sync {
    async fn get_process_def_list(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Pagination<ProcessDefEntity>, RepositoryError>;

    /// Start an instance. The engine addresses replies for it to
    /// `participant_id`.
    async fn start_process_by_id(
        &self,
        process_def_id: &str,
        participant_id: &ParticipantId,
    ) -> Result<ProcessInstanceId, RepositoryError>;

    async fn start_process_by_key(
        &self,
        process_def_key: &str,
        participant_id: &ParticipantId,
    ) -> Result<ProcessInstanceId, RepositoryError>;

    async fn get_user_task_list(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Pagination<UserTaskEntity>, RepositoryError>;

    async fn get_user_task_list_by_process_def_id(
        &self,
        process_def_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Pagination<UserTaskEntity>, RepositoryError>;

    async fn get_user_task_list_by_process_instance_id(
        &self,
        process_instance_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Pagination<UserTaskEntity>, RepositoryError>;

    /// Raw data of one task, including its UI kind.
    async fn get_user_task_data(
        &self,
        user_task_id: &str,
    ) -> Result<UserTaskMessageData, RepositoryError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// A process instance started on [`MockProcessEngineRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedProcess {
    pub process_instance_id: ProcessInstanceId,
    pub process_def_id: ProcessDefId,
    pub participant_id: ParticipantId,
}

/// Mock process engine for testing.
#[derive(Default)]
pub struct MockProcessEngineRepository {
    /// Deployed definitions.
    pub process_defs: Vec<ProcessDefEntity>,
    /// Pending tasks.
    pub user_tasks: Vec<UserTaskMessageData>,
    /// Should fail?
    pub should_fail: bool,
    /// Instance id reported by every start instead of a generated one.
    pub instance_id: Option<ProcessInstanceId>,
    /// Bus the instance's end event is published on before a start returns.
    end_on_start: Option<Arc<dyn MessageBus>>,
    started: Mutex<Vec<StartedProcess>>,
}

impl MockProcessEngineRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process_def(mut self, id: &str, key: &str, name: &str) -> Self {
        self.process_defs.push(ProcessDefEntity {
            id: id.to_string(),
            key: key.to_string(),
            name: name.to_string(),
        });
        self
    }

    pub fn with_user_task(mut self, data: UserTaskMessageData) -> Self {
        self.user_tasks.push(data);
        self
    }

    pub fn failing(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn with_instance_id(mut self, process_instance_id: &str) -> Self {
        self.instance_id = Some(process_instance_id.to_string());
        self
    }

    /// Processes end immediately: the end event reaches the participant
    /// channel before the start call returns.
    pub fn ending_on_start(mut self, bus: Arc<dyn MessageBus>) -> Self {
        self.end_on_start = Some(bus);
        self
    }

    /// Instances started so far, in order.
    pub fn started(&self) -> Vec<StartedProcess> {
        self.started.lock().clone()
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.should_fail {
            return Err(RepositoryError::Transport("Mock failure".to_string()));
        }
        Ok(())
    }

    async fn start(
        &self,
        process_def_id: ProcessDefId,
        participant_id: &ParticipantId,
    ) -> ProcessInstanceId {
        let process_instance_id = {
            let mut started = self.started.lock();
            let process_instance_id = self
                .instance_id
                .clone()
                .unwrap_or_else(|| format!("pi-{}", started.len() + 1));
            started.push(StartedProcess {
                process_instance_id: process_instance_id.clone(),
                process_def_id,
                participant_id: participant_id.clone(),
            });
            process_instance_id
        };

        if let Some(bus) = &self.end_on_start {
            let message = Message::new(json!({ "action": actions::END_EVENT }));
            // Delivery is the bus's concern, as on a real engine
            let _ = bus.publish(&participant_channel(participant_id), message).await;
        }
        process_instance_id
    }

    fn tasks_where(&self, keep: impl Fn(&UserTaskEntity) -> bool) -> Vec<UserTaskEntity> {
        self.user_tasks
            .iter()
            .map(|data| &data.user_task_entity)
            .filter(|&entity| keep(entity))
            .cloned()
            .collect()
    }
}

fn page<T>(items: Vec<T>, limit: u64, offset: u64) -> Pagination<T> {
    let count = items.len() as u64;
    let data = items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect();
    Pagination {
        count,
        offset,
        limit,
        data,
    }
}

#[async_trait]
impl ProcessEngineRepository for MockProcessEngineRepository {
    async fn get_process_def_list(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Pagination<ProcessDefEntity>, RepositoryError> {
        self.check()?;
        Ok(page(self.process_defs.clone(), limit, offset))
    }

    async fn start_process_by_id(
        &self,
        process_def_id: &str,
        participant_id: &ParticipantId,
    ) -> Result<ProcessInstanceId, RepositoryError> {
        self.check()?;
        let def = self
            .process_defs
            .iter()
            .find(|def| def.id == process_def_id)
            .ok_or_else(|| RepositoryError::NotFound(process_def_id.to_string()))?;
        Ok(self.start(def.id.clone(), participant_id).await)
    }

    async fn start_process_by_key(
        &self,
        process_def_key: &str,
        participant_id: &ParticipantId,
    ) -> Result<ProcessInstanceId, RepositoryError> {
        self.check()?;
        let def = self
            .process_defs
            .iter()
            .find(|def| def.key == process_def_key)
            .ok_or_else(|| RepositoryError::NotFound(process_def_key.to_string()))?;
        Ok(self.start(def.id.clone(), participant_id).await)
    }

    async fn get_user_task_list(
        &self,
        limit: u64,
        offset: u64,
    ) -> Result<Pagination<UserTaskEntity>, RepositoryError> {
        self.check()?;
        Ok(page(self.tasks_where(|_| true), limit, offset))
    }

    async fn get_user_task_list_by_process_def_id(
        &self,
        process_def_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Pagination<UserTaskEntity>, RepositoryError> {
        self.check()?;
        let instances: Vec<ProcessInstanceId> = self
            .started
            .lock()
            .iter()
            .filter(|started| started.process_def_id == process_def_id)
            .map(|started| started.process_instance_id.clone())
            .collect();
        let tasks = self.tasks_where(|entity| instances.contains(&entity.process.id));
        Ok(page(tasks, limit, offset))
    }

    async fn get_user_task_list_by_process_instance_id(
        &self,
        process_instance_id: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Pagination<UserTaskEntity>, RepositoryError> {
        self.check()?;
        let tasks = self.tasks_where(|entity| entity.process.id == process_instance_id);
        Ok(page(tasks, limit, offset))
    }

    async fn get_user_task_data(
        &self,
        user_task_id: &str,
    ) -> Result<UserTaskMessageData, RepositoryError> {
        self.check()?;
        self.user_tasks
            .iter()
            .find(|data| data.user_task_entity.id == user_task_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(user_task_id.to_string()))
    }
}
