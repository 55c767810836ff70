use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError, Weak,
};

use taskboard_core::{Connectivity, NewTask, Priority, Task, TaskId, TaskPatch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    api::RemoteApi,
    config::ClientConfig,
    connectivity::ConnectivityReceiver,
    errors::{ClientError, ClientResult},
    events::EventDispatcher,
    store::SnapshotStore,
};

/// Staging and selection state driven by the UI between mutations.
/// Not part of the durable model.
#[derive(Debug, Default)]
struct InputState {
    pending_text: String,
    pending_priority: Priority,
    selected: Option<TaskId>,
}

/// Single authority for task state. Every mutation applies to the local
/// collection first and is persisted in full before the remote outcome is
/// known; the remote side is best-effort, and a remote failure only flips
/// connectivity to offline; the local change always stands.
pub struct SyncController {
    api: RemoteApi,
    store: Arc<SnapshotStore>,
    tasks: Mutex<Vec<Task>>,
    input: Mutex<InputState>,
    online: AtomicBool,
    events: Arc<EventDispatcher>,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl SyncController {
    /// Opens the local store, loads the last snapshot, performs the initial
    /// authoritative fetch, and subscribes to connectivity notifications.
    ///
    /// The constructor awaits the initial fetch, which is the caller's
    /// loading phase. Starting offline is not an error: the persisted
    /// collection remains in effect until the service becomes reachable.
    pub async fn new(
        config: ClientConfig,
        connectivity_rx: ConnectivityReceiver,
    ) -> ClientResult<Arc<Self>> {
        let store = Arc::new(SnapshotStore::new(&config.database_url).await?);
        store.init_schema().await?;

        let tasks = store.load().await?.unwrap_or_default();
        info!(count = tasks.len(), "loaded persisted tasks");

        let controller = Arc::new(Self {
            api: RemoteApi::new(config.api_url),
            store,
            tasks: Mutex::new(tasks),
            input: Mutex::new(InputState::default()),
            online: AtomicBool::new(false),
            events: Arc::new(EventDispatcher::new()),
            watcher: Mutex::new(None),
        });

        // Server state is authoritative as soon as it is reachable.
        controller.refresh().await;

        let handle =
            Self::spawn_connectivity_watcher(Arc::downgrade(&controller), connectivity_rx);
        *controller
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle);

        Ok(controller)
    }

    /// Fetch the authoritative collection and replace local state with it
    /// wholesale. Any failure keeps local state untouched and flips to
    /// offline. Replacement is all-or-nothing, never a merge.
    pub async fn refresh(&self) {
        self.events.emit_refresh_started();

        match self.api.fetch_tasks().await {
            Ok(remote) => {
                let count = remote.len();
                self.with_tasks(|tasks| *tasks = remote);
                if let Err(e) = self.persist().await {
                    warn!(error = %e, "failed to persist fetched tasks");
                }
                self.set_connectivity(Connectivity::Online);
                self.events.emit_tasks_replaced(count);
                info!(count, "replaced local tasks with server state");
            }
            Err(e) => {
                warn!(error = %e, "task fetch failed, staying on local state");
                self.set_connectivity(Connectivity::Offline);
                self.events.emit_refresh_failed(&e.to_string());
            }
        }
    }

    /// Create a task from the staged input. Returns the id of the new entry,
    /// or `None` when the staged text trims to empty (a no-op, not an error).
    pub async fn submit_task(&self) -> ClientResult<Option<TaskId>> {
        let (text, priority) = self.with_input(|input| {
            (
                input.pending_text.trim().to_string(),
                input.pending_priority,
            )
        });
        if text.is_empty() {
            return Ok(None);
        }

        let task = Task::new_local(text, priority);
        let id = task.id.clone();

        self.with_tasks(|tasks| tasks.insert(0, task.clone()));
        self.with_input(|input| {
            input.pending_text.clear();
            input.pending_priority = Priority::default();
        });
        self.persist().await?;
        self.events.emit_task_created(&task);
        info!(%id, "task created");

        if self.connectivity().is_online() {
            let new_task = NewTask {
                text: task.text,
                priority: task.priority,
            };
            match self.api.create_task(&new_task).await {
                Ok(saved) => {
                    // Swap the optimistic entry for the server's copy. The
                    // local id is only ever known to this client, so the
                    // match is unambiguous.
                    let server_id = saved.id.clone();
                    self.with_tasks(|tasks| {
                        if let Some(entry) = tasks.iter_mut().find(|t| t.id == id) {
                            *entry = saved.clone();
                        }
                    });
                    self.persist().await?;
                    self.events.emit_task_updated(&saved);
                    info!(local = %id, server = %server_id, "optimistic create confirmed by server");
                    return Ok(Some(server_id));
                }
                Err(e) => {
                    // The entry keeps its local id from here on; it is never
                    // retried, only superseded by a later refetch.
                    warn!(%id, error = %e, "remote create failed, keeping local copy");
                    self.set_connectivity(Connectivity::Offline);
                }
            }
        }

        Ok(Some(id))
    }

    /// Replace the selected task's text in place. The local edit always
    /// applies; only server-backed tasks are patched remotely.
    pub async fn edit_selected(&self, new_text: impl Into<String>) -> ClientResult<()> {
        let id = self.take_selected()?;
        let new_text = new_text.into();

        let updated = self
            .with_tasks(|tasks| {
                tasks.iter_mut().find(|t| t.id == id).map(|task| {
                    task.text = new_text.clone();
                    task.clone()
                })
            })
            .ok_or_else(|| ClientError::TaskNotFound(id.clone()))?;

        self.persist().await?;
        self.events.emit_task_updated(&updated);
        info!(%id, "task text edited");

        self.push_patch(&id, TaskPatch::text(new_text)).await;
        Ok(())
    }

    /// Parse and apply a new priority for the selected task. An unknown
    /// value is rejected before any state changes, the selection included.
    pub async fn reprioritize_selected(&self, input: &str) -> ClientResult<()> {
        let priority = Priority::parse(input)?;
        let id = self.take_selected()?;

        let updated = self
            .with_tasks(|tasks| {
                tasks.iter_mut().find(|t| t.id == id).map(|task| {
                    task.priority = priority;
                    task.clone()
                })
            })
            .ok_or_else(|| ClientError::TaskNotFound(id.clone()))?;

        self.persist().await?;
        self.events.emit_task_updated(&updated);
        info!(%id, %priority, "task reprioritized");

        self.push_patch(&id, TaskPatch::priority(priority)).await;
        Ok(())
    }

    /// Remove the selected task. Removal is unconditional locally, whatever
    /// the remote outcome.
    pub async fn delete_selected(&self) -> ClientResult<()> {
        let id = self.take_selected()?;

        let removed = self.with_tasks(|tasks| {
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            tasks.len() != before
        });
        if !removed {
            return Err(ClientError::TaskNotFound(id));
        }

        self.persist().await?;
        self.events.emit_task_deleted(&id);
        info!(%id, "task deleted");

        if self.connectivity().is_online() && !id.is_local() {
            if let Err(e) = self.api.delete_task(&id).await {
                warn!(%id, error = %e, "remote delete failed, keeping local removal");
                self.set_connectivity(Connectivity::Offline);
            }
        }

        Ok(())
    }

    /// Mark a task as the target of the next edit/reprioritize/delete.
    /// There is a single selection slot; selecting replaces any previous
    /// selection.
    pub fn select_task(&self, id: &TaskId) -> ClientResult<()> {
        let known = self.with_tasks(|tasks| tasks.iter().any(|t| &t.id == id));
        if !known {
            return Err(ClientError::TaskNotFound(id.clone()));
        }
        self.with_input(|input| input.selected = Some(id.clone()));
        Ok(())
    }

    pub fn selected(&self) -> Option<TaskId> {
        self.with_input(|input| input.selected.clone())
    }

    pub fn clear_selection(&self) {
        self.with_input(|input| input.selected = None);
    }

    pub fn set_pending_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.with_input(|input| input.pending_text = text);
    }

    pub fn pending_text(&self) -> String {
        self.with_input(|input| input.pending_text.clone())
    }

    pub fn set_pending_priority(&self, priority: Priority) {
        self.with_input(|input| input.pending_priority = priority);
    }

    pub fn pending_priority(&self) -> Priority {
        self.with_input(|input| input.pending_priority)
    }

    /// The full collection, newest first.
    pub fn tasks(&self) -> Vec<Task> {
        self.with_tasks(|tasks| tasks.clone())
    }

    /// One priority bucket. A pure filtered view of the collection; the
    /// grouping is never stored separately, so it cannot desync.
    pub fn tasks_by_priority(&self, priority: Priority) -> Vec<Task> {
        self.with_tasks(|tasks| {
            tasks
                .iter()
                .filter(|t| t.priority == priority)
                .cloned()
                .collect()
        })
    }

    pub fn connectivity(&self) -> Connectivity {
        if self.online.load(Ordering::Relaxed) {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn events(&self) -> Arc<EventDispatcher> {
        Arc::clone(&self.events)
    }

    /// Tear down the connectivity subscription. Safe to call more than once;
    /// also runs on drop.
    pub fn shutdown(&self) {
        if let Some(handle) = self
            .watcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
            info!("connectivity watcher unsubscribed");
        }
    }

    fn spawn_connectivity_watcher(
        controller: Weak<Self>,
        mut rx: ConnectivityReceiver,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("connectivity watcher started");
            while let Some(change) = rx.recv().await {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                match change {
                    Connectivity::Online => {
                        info!("network became reachable, refetching server state");
                        controller.refresh().await;
                    }
                    Connectivity::Offline => {
                        info!("network became unreachable");
                        controller.set_connectivity(Connectivity::Offline);
                    }
                }
            }
            info!("connectivity watcher stopped");
        })
    }

    /// Best-effort remote application of an already-committed local change.
    /// Local-only tasks are skipped: the server has nothing to patch.
    async fn push_patch(&self, id: &TaskId, patch: TaskPatch) {
        if !self.connectivity().is_online() || id.is_local() {
            return;
        }
        if let Err(e) = self.api.update_task(id, &patch).await {
            warn!(%id, error = %e, "remote update failed, keeping local change");
            self.set_connectivity(Connectivity::Offline);
        }
    }

    /// Write the full in-memory collection to the snapshot store. Called
    /// inside every mutation, before any remote outcome is known.
    async fn persist(&self) -> ClientResult<()> {
        let snapshot = self.tasks();
        self.store.save(&snapshot).await
    }

    fn set_connectivity(&self, connectivity: Connectivity) {
        let was_online = self
            .online
            .swap(connectivity.is_online(), Ordering::Relaxed);
        if was_online != connectivity.is_online() {
            info!(%connectivity, "connectivity changed");
            self.events.emit_connectivity_changed(connectivity);
        }
    }

    fn take_selected(&self) -> ClientResult<TaskId> {
        self.with_input(|input| input.selected.take())
            .ok_or(ClientError::NoSelection)
    }

    // Lock discipline: both locks are held only for the closure body and
    // never across an await point.
    fn with_tasks<R>(&self, f: impl FnOnce(&mut Vec<Task>) -> R) -> R {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut tasks)
    }

    fn with_input<R>(&self, f: impl FnOnce(&mut InputState) -> R) -> R {
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut input)
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
