//! Timer-driven flash state

use super::{DirectionFlash, FlashToken};
use crate::project::Direction;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

type Listener = Box<dyn Fn(Direction) + Send + Sync>;

struct Inner {
    flash: DirectionFlash,
    timer: Option<JoinHandle<()>>,
    listener: Option<Listener>,
}

impl Inner {
    fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener(self.flash.state());
        }
    }
}

/// Self-resetting direction flash
///
/// Each `Up`/`Down` observation cancels the previous reset timer and arms a
/// new one. The optional reset listener runs when a timer puts the flash
/// back to `Neutral`, while the internal lock is held.
pub struct FlashSignal {
    inner: Arc<Mutex<Inner>>,
    reset_after: Duration,
}

impl FlashSignal {
    pub fn new(reset_after: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                flash: DirectionFlash::new(),
                timer: None,
                listener: None,
            })),
            reset_after,
        }
    }

    /// Create a flash that reports timer resets to `listener`
    pub fn with_reset_listener<F>(reset_after: Duration, listener: F) -> Self
    where
        F: Fn(Direction) + Send + Sync + 'static,
    {
        let signal = Self::new(reset_after);
        signal.inner.lock().listener = Some(Box::new(listener));
        signal
    }

    pub fn state(&self) -> Direction {
        self.inner.lock().flash.state()
    }

    /// Feed a projected direction and return the resulting flash state
    ///
    /// Must be called inside a Tokio runtime.
    pub fn observe(&self, direction: Direction) -> Direction {
        self.observe_with(direction, |state| state)
    }

    /// Feed a projected direction and hand the resulting state to `publish`
    ///
    /// `publish` runs before the lock is released, so a reset cannot slip in
    /// between arming the timer and publishing the new state.
    pub fn observe_with<R>(&self, direction: Direction, publish: impl FnOnce(Direction) -> R) -> R {
        let mut inner = self.inner.lock();
        if let Some(token) = inner.flash.observe(direction) {
            if let Some(stale) = inner.timer.take() {
                stale.abort();
            }
            inner.timer = Some(tokio::spawn(expire_after(
                Arc::downgrade(&self.inner),
                token,
                self.reset_after,
            )));
        }
        publish(inner.flash.state())
    }
}

impl Drop for FlashSignal {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.lock().timer.take() {
            timer.abort();
        }
    }
}

async fn expire_after(inner: Weak<Mutex<Inner>>, token: FlashToken, delay: Duration) {
    tokio::time::sleep(delay).await;

    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut inner = inner.lock();
    // A newer arm may have won the race for the lock after this timer fired
    if inner.flash.expire(token) {
        inner.timer = None;
        inner.notify();
    }
}
