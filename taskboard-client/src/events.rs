use std::sync::Mutex;

use taskboard_core::{Connectivity, Task, TaskId};
use tracing::error;

/// State changes surfaced to presentation code.
#[derive(Debug, Clone)]
pub enum ClientEvent {
    TaskCreated(Task),
    TaskUpdated(Task),
    TaskDeleted(TaskId),
    /// The whole collection was replaced by server state (count of tasks).
    TasksReplaced(usize),
    ConnectivityChanged(Connectivity),
    RefreshStarted,
    RefreshFailed(String),
}

type EventHandler = Box<dyn Fn(&ClientEvent) + Send + Sync>;

/// Fans client events out to registered subscribers. Subscribers run on the
/// emitting task and must return quickly.
pub struct EventDispatcher {
    handlers: Mutex<Vec<EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        match self.handlers.lock() {
            Ok(mut handlers) => handlers.push(Box::new(handler)),
            Err(_) => error!("Failed to acquire handler lock for subscription"),
        }
    }

    pub fn emit_task_created(&self, task: &Task) {
        self.emit(ClientEvent::TaskCreated(task.clone()));
    }

    pub fn emit_task_updated(&self, task: &Task) {
        self.emit(ClientEvent::TaskUpdated(task.clone()));
    }

    pub fn emit_task_deleted(&self, id: &TaskId) {
        self.emit(ClientEvent::TaskDeleted(id.clone()));
    }

    pub fn emit_tasks_replaced(&self, count: usize) {
        self.emit(ClientEvent::TasksReplaced(count));
    }

    pub fn emit_connectivity_changed(&self, connectivity: Connectivity) {
        self.emit(ClientEvent::ConnectivityChanged(connectivity));
    }

    pub fn emit_refresh_started(&self) {
        self.emit(ClientEvent::RefreshStarted);
    }

    pub fn emit_refresh_failed(&self, message: &str) {
        self.emit(ClientEvent::RefreshFailed(message.to_string()));
    }

    fn emit(&self, event: ClientEvent) {
        let handlers = match self.handlers.lock() {
            Ok(handlers) => handlers,
            Err(_) => {
                error!("Failed to acquire handler lock for event emission");
                return;
            }
        };

        for handler in handlers.iter() {
            handler(&event);
        }
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
