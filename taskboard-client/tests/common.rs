use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use taskboard_client::{connectivity_channel, ClientConfig, ConnectivityNotifier, SyncController};
use taskboard_core::{NewTask, Priority, Task, TaskId, TaskPatch};
use tokio::net::TcpListener;
use uuid::Uuid;

/// What the mock remote saw, for asserting on the client's traffic.
#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum RecordedRequest {
    Fetch,
    Create(NewTask),
    Update(String, TaskPatch),
    Delete(String),
}

#[derive(Clone, Default)]
struct MockState {
    tasks: Arc<Mutex<Vec<Task>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    failing: Arc<AtomicBool>,
    next_id: Arc<AtomicU64>,
}

/// An in-process HTTP stand-in for the remote task service. Requests are
/// recorded before the failure switch is consulted, so tests can assert on
/// traffic either way.
pub struct MockApi {
    pub addr: SocketAddr,
    state: MockState,
    handle: tokio::task::JoinHandle<()>,
}

#[allow(dead_code)]
impl MockApi {
    /// Starts the mock service on an OS-assigned port.
    pub async fn start() -> Self {
        let state = MockState::default();
        let router = Router::new()
            .route("/tasks", get(list_tasks).post(create_task))
            .route("/tasks/:id", patch(update_task).delete(delete_task))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Replace what `GET /tasks` returns.
    pub fn set_tasks(&self, tasks: Vec<Task>) {
        *self.state.tasks.lock().unwrap() = tasks;
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.state.tasks.lock().unwrap().clone()
    }

    /// When set, every route answers 500 after recording the request.
    pub fn fail_requests(&self, fail: bool) {
        self.state.failing.store(fail, Ordering::Relaxed);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Recorded mutating requests only (everything but `Fetch`).
    pub fn write_requests(&self) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| !matches!(r, RecordedRequest::Fetch))
            .collect()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn list_tasks(State(state): State<MockState>) -> Result<Json<Vec<Task>>, StatusCode> {
    state.requests.lock().unwrap().push(RecordedRequest::Fetch);
    if state.failing.load(Ordering::Relaxed) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    Ok(Json(state.tasks.lock().unwrap().clone()))
}

async fn create_task(
    State(state): State<MockState>,
    Json(new_task): Json<NewTask>,
) -> Result<Json<Task>, StatusCode> {
    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest::Create(new_task.clone()));
    if state.failing.load(Ordering::Relaxed) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let n = state.next_id.fetch_add(1, Ordering::Relaxed) + 1;
    let task = Task {
        id: TaskId::Server(format!("srv{n}")),
        text: new_task.text,
        priority: new_task.priority,
    };
    state.tasks.lock().unwrap().insert(0, task.clone());
    Ok(Json(task))
}

async fn update_task(
    State(state): State<MockState>,
    Path(id): Path<String>,
    Json(body): Json<TaskPatch>,
) -> StatusCode {
    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest::Update(id.clone(), body.clone()));
    if state.failing.load(Ordering::Relaxed) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    let mut tasks = state.tasks.lock().unwrap();
    match tasks.iter_mut().find(|t| t.id.to_string() == id) {
        Some(task) => {
            if let Some(text) = body.text {
                task.text = text;
            }
            if let Some(priority) = body.priority {
                task.priority = priority;
            }
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn delete_task(State(state): State<MockState>, Path(id): Path<String>) -> StatusCode {
    state
        .requests
        .lock()
        .unwrap()
        .push(RecordedRequest::Delete(id.clone()));
    if state.failing.load(Ordering::Relaxed) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    let mut tasks = state.tasks.lock().unwrap();
    let before = tasks.len();
    tasks.retain(|t| t.id.to_string() != id);
    if tasks.len() != before {
        StatusCode::OK
    } else {
        StatusCode::NOT_FOUND
    }
}

/// Holds everything a controller test needs.
#[allow(dead_code)]
pub struct TestSetup {
    pub controller: Arc<SyncController>,
    pub notifier: ConnectivityNotifier,
    pub db_url: String,
}

/// Named shared-cache in-memory database, so the controller's pool and any
/// verification store opened by the test see the same data.
#[allow(dead_code)]
pub fn memory_db_url() -> String {
    format!("file:{}?mode=memory&cache=shared", Uuid::new_v4())
}

/// Creates a controller talking to the given base URL, backed by a fresh
/// in-memory database.
#[allow(dead_code)]
pub async fn setup_with_url(api_url: &str) -> TestSetup {
    let db_url = memory_db_url();
    let (notifier, rx) = connectivity_channel();
    let config = ClientConfig::new(api_url).with_database_url(&db_url);
    let controller = SyncController::new(config, rx).await.unwrap();

    TestSetup {
        controller,
        notifier,
        db_url,
    }
}

/// A server-backed task as the remote service would return it.
#[allow(dead_code)]
pub fn server_task(id: &str, text: &str, priority: Priority) -> Task {
    Task {
        id: TaskId::Server(id.to_string()),
        text: text.to_string(),
        priority,
    }
}

/// Polls a condition until it holds, or panics after two seconds. Used for
/// state that changes on the controller's background watcher.
#[allow(dead_code)]
pub async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}
