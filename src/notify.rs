//! Process-local change notification for the marked book list.
//!
//! Views that display marked books register a [`Subscription`] while they
//! are visible and drop it when they are hidden. The store emits a single
//! [`StoreEvent::Refresh`] after every successful mutation; receivers are
//! expected to reload from the store rather than read a payload.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

/// Default channel capacity; lagging receivers only ever need one refresh.
const DEFAULT_CAPACITY: usize = 16;

/// Events emitted by the marked book store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// The marked list changed on disk; reload it
    Refresh,
}

impl StoreEvent {
    /// Fixed action identifier for the refresh signal
    pub const ACTION: &'static str = "ACTION_REFRESH";

    /// Action identifier of this event
    pub fn action(&self) -> &'static str {
        match self {
            StoreEvent::Refresh => Self::ACTION,
        }
    }
}

/// Broadcasts store changes to every registered subscription
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<StoreEvent>,
}

impl ChangeNotifier {
    /// Create a notifier with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new listener
    pub fn subscribe(&self) -> Subscription {
        tracing::debug!(
            "Registering refresh listener ({} active)",
            self.tx.receiver_count() + 1
        );
        Subscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Emit a refresh signal and return how many listeners it reached.
    ///
    /// Sending with no listeners is not an error.
    pub fn notify(&self) -> usize {
        let reached = self.tx.send(StoreEvent::Refresh).unwrap_or(0);
        tracing::debug!("Sent {} to {} listener(s)", StoreEvent::ACTION, reached);
        reached
    }

    /// Number of currently registered listeners
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// A registered listener. Dropping it unregisters the listener.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<StoreEvent>,
}

impl Subscription {
    /// Wait for the next event.
    ///
    /// Returns `None` once the notifier has been dropped. Missed events
    /// collapse into a single refresh.
    pub async fn recv(&mut self) -> Option<StoreEvent> {
        match self.rx.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!("Refresh listener lagged by {} event(s)", skipped);
                Some(StoreEvent::Refresh)
            }
            Err(RecvError::Closed) => None,
        }
    }

    /// Take the next pending event without waiting
    pub fn try_recv(&mut self) -> Option<StoreEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Lagged(_)) => Some(StoreEvent::Refresh),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Consume every pending event and return how many there were
    pub fn drain(&mut self) -> usize {
        let mut count = 0;
        while self.try_recv().is_some() {
            count += 1;
        }
        count
    }

    /// Stop listening
    pub fn unsubscribe(self) {
        drop(self);
    }
}
