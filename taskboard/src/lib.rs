//! Taskboard - local-first task list with best-effort remote sync
//!
//! This crate provides a unified API for the taskboard sync client.
//!
//! # Example
//!
//! ```ignore
//! use taskboard::{connectivity_channel, ClientConfig, SyncController};
//!
//! let (notifier, rx) = connectivity_channel();
//! let controller = SyncController::new(ClientConfig::from_env()?, rx).await?;
//! controller.set_pending_text("Buy milk");
//! controller.submit_task().await?;
//! ```

// Re-export client types
pub use taskboard_client::{
    connectivity_channel, ClientConfig, ClientError, ClientEvent, ClientResult,
    ConnectivityNotifier, EventDispatcher, RemoteApi, SnapshotStore, SyncController,
};

// Re-export core types that embedding applications need
pub use taskboard_core::errors::ValidationError;
pub use taskboard_core::models::{Connectivity, Priority, Task, TaskId, LOCAL_ID_PREFIX};
pub use taskboard_core::protocol::{NewTask, TaskPatch};
