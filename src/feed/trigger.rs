use tokio::sync::mpsc;

/// Producer side: reports when the viewport is close to the end of the feed.
///
/// Signals are fire-and-forget. When the channel is full a signal is already
/// queued, so the new one is dropped.
#[derive(Clone, Debug)]
pub struct LoadTrigger {
    tx: mpsc::Sender<()>,
    load_ahead: usize,
}

/// Consumer side of a [`LoadTrigger`].
#[derive(Debug)]
pub struct LoadSignals {
    rx: mpsc::Receiver<()>,
}

/// Create a connected trigger/consumer pair.
///
/// `load_ahead` is how many rows from the tail count as near the bottom.
pub fn load_trigger(load_ahead: usize) -> (LoadTrigger, LoadSignals) {
    let (tx, rx) = mpsc::channel(8);
    (LoadTrigger { tx, load_ahead }, LoadSignals { rx })
}

impl LoadTrigger {
    /// Whether `selected` (0-based) is within `load_ahead` rows of the last of `total`.
    pub fn is_near_bottom(&self, selected: usize, total: usize) -> bool {
        total == 0 || selected.saturating_add(self.load_ahead) + 1 >= total
    }

    /// Fire a signal if the selection is near the bottom. Returns whether it fired.
    pub fn observe(&self, selected: usize, total: usize) -> bool {
        if !self.is_near_bottom(selected, total) {
            return false;
        }
        self.fire();
        true
    }

    /// Request a load regardless of position (initial load, reload).
    pub fn fire(&self) {
        match self.tx.try_send(()) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(())) => {
                tracing::trace!("Load signal coalesced");
            }
            Err(mpsc::error::TrySendError::Closed(())) => {
                tracing::debug!("Load signal dropped, consumer gone");
            }
        }
    }
}

impl LoadSignals {
    /// Wait for the next signal, draining any that queued up behind it.
    ///
    /// Returns the number of signals folded into this one, or `None` once
    /// every trigger has been dropped.
    pub async fn recv(&mut self) -> Option<usize> {
        self.rx.recv().await?;
        let mut count = 1;
        while self.rx.try_recv().is_ok() {
            count += 1;
        }
        Some(count)
    }
}
