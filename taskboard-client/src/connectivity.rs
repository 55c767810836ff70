use taskboard_core::Connectivity;
use tokio::sync::mpsc;
use tracing::warn;

/// The watcher drains notifications promptly, so a small buffer suffices.
const CHANNEL_CAPACITY: usize = 16;

pub type ConnectivityReceiver = mpsc::Receiver<Connectivity>;

/// Sending half handed to whatever platform layer observes the network.
/// Notifications are fire-and-forget: once the controller has shut down
/// they go nowhere.
#[derive(Clone)]
pub struct ConnectivityNotifier {
    tx: mpsc::Sender<Connectivity>,
}

impl ConnectivityNotifier {
    /// The environment regained a route to the remote service.
    pub fn notify_reachable(&self) {
        self.send(Connectivity::Online);
    }

    /// The environment lost its route to the remote service.
    pub fn notify_unreachable(&self) {
        self.send(Connectivity::Offline);
    }

    fn send(&self, change: Connectivity) {
        if self.tx.try_send(change).is_err() {
            warn!(%change, "connectivity notification dropped, no subscriber");
        }
    }
}

/// Build the notification channel a [`crate::SyncController`] subscribes to.
pub fn connectivity_channel() -> (ConnectivityNotifier, ConnectivityReceiver) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    (ConnectivityNotifier { tx }, rx)
}
