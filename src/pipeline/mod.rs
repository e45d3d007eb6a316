//! Feed -> projection -> flash wiring for one widget
//!
//! A [`DisplayPipeline`] subscribes to a shared [`PriceFeedConnection`],
//! projects each tick, and publishes the resulting [`DisplayValue`]. The
//! `direction` of the published value is owned by the flash: it turns
//! `Up`/`Down` on a change and falls back to `Neutral` on its own.

use crate::feed::{FeedHandle, PriceFeedConnection};
use crate::flash::FlashSignal;
use crate::project::{Direction, DisplayValue, Projection, Projector};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Live display value for one widget
pub struct DisplayPipeline {
    name: String,
    handle: FeedHandle,
    display_rx: watch::Receiver<Option<DisplayValue>>,
    flash: Arc<FlashSignal>,
}

impl DisplayPipeline {
    /// Subscribe a widget to the feed
    pub fn attach(
        name: impl Into<String>,
        feed: &PriceFeedConnection,
        projection: Projection,
        flash_reset: Duration,
    ) -> Self {
        let name = name.into();
        let (display_tx, display_rx) = watch::channel(None::<DisplayValue>);
        let display_tx = Arc::new(display_tx);

        let reset_tx = Arc::clone(&display_tx);
        let flash = Arc::new(FlashSignal::with_reset_listener(flash_reset, move |direction| {
            reset_tx.send_modify(|current| {
                if let Some(value) = current {
                    value.direction = direction;
                }
            });
        }));

        let widget = name.clone();
        let tick_flash = Arc::clone(&flash);
        let mut prior = None;
        let handle = feed.open(move |tick| {
            let projected = match projection.display(tick, prior) {
                Ok(projected) => projected,
                Err(e) => {
                    tracing::warn!(widget = %widget, error = %e, "Dropping tick that cannot be projected");
                    return;
                }
            };
            prior = Some(projected.price);

            // Value and flash state go out together in a single update
            tick_flash.observe_with(projected.direction, |direction| {
                display_tx.send_replace(Some(DisplayValue {
                    direction,
                    ..projected.clone()
                }));
            });

            tracing::trace!(
                widget = %widget,
                price = %projected.price,
                direction = ?projected.direction,
                "Display value updated"
            );
        });

        Self {
            name,
            handle,
            display_rx,
            flash,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Latest display value, if any tick has arrived
    pub fn latest(&self) -> Option<DisplayValue> {
        self.display_rx.borrow().clone()
    }

    /// Watch display value changes
    pub fn watch(&self) -> watch::Receiver<Option<DisplayValue>> {
        self.display_rx.clone()
    }

    /// Current flash direction
    pub fn flash(&self) -> Direction {
        self.flash.state()
    }

    /// Unsubscribe from the feed; idempotent
    pub fn close(&self) {
        self.handle.close();
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }
}
