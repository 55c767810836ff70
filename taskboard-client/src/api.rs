use taskboard_core::{NewTask, Task, TaskId, TaskPatch};
use tracing::debug;

use crate::errors::ClientError;

/// Thin JSON client for the remote task service. Any transport failure or
/// non-2xx status surfaces as [`ClientError::Remote`]; callers treat them
/// all as "remote unreachable".
#[derive(Clone)]
pub struct RemoteApi {
    http: reqwest::Client,
    base_url: String,
}

impl RemoteApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}/tasks", self.base_url)
    }

    fn task_url(&self, id: &TaskId) -> String {
        format!("{}/tasks/{}", self.base_url, id)
    }

    /// `GET /tasks`: the authoritative full collection.
    pub async fn fetch_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let tasks = self
            .http
            .get(self.tasks_url())
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<Task>>()
            .await?;

        debug!(count = tasks.len(), "fetched remote tasks");
        Ok(tasks)
    }

    /// `POST /tasks`: returns the stored task with its server-assigned id.
    pub async fn create_task(&self, new_task: &NewTask) -> Result<Task, ClientError> {
        let task = self
            .http
            .post(self.tasks_url())
            .json(new_task)
            .send()
            .await?
            .error_for_status()?
            .json::<Task>()
            .await?;

        debug!(id = %task.id, "task created remotely");
        Ok(task)
    }

    /// `PATCH /tasks/{id}`: response body ignored, only the status matters.
    pub async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), ClientError> {
        self.http
            .patch(self.task_url(id))
            .json(patch)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// `DELETE /tasks/{id}`.
    pub async fn delete_task(&self, id: &TaskId) -> Result<(), ClientError> {
        self.http
            .delete(self.task_url(id))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
