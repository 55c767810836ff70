pub mod api;
pub mod config;
pub mod connectivity;
pub mod controller;
pub mod errors;
pub mod events;
pub mod queries;
pub mod store;

pub use api::RemoteApi;
pub use config::ClientConfig;
pub use connectivity::{connectivity_channel, ConnectivityNotifier, ConnectivityReceiver};
pub use controller::SyncController;
pub use errors::{ClientError, ClientResult};
pub use events::{ClientEvent, EventDispatcher};
pub use store::{SnapshotStore, SNAPSHOT_KEY};
