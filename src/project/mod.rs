//! Derived value projection
//!
//! Maps raw ticks to the values a widget displays. Projections are pure:
//! the same tick and prior value always produce the same result.

mod projection;

pub use projection::{Projection, ProjectionError, Scaled};

use crate::feed::Tick;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction of change between two consecutive projected values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    #[default]
    Neutral,
}

impl Direction {
    /// Compare a new value against the prior one
    ///
    /// `None` is the initial sentinel (no prior tick) and always yields
    /// `Neutral`.
    pub fn between(prior: Option<Decimal>, value: Decimal) -> Self {
        match prior.map(|prior| value.cmp(&prior)) {
            Some(Ordering::Greater) => Direction::Up,
            Some(Ordering::Less) => Direction::Down,
            Some(Ordering::Equal) | None => Direction::Neutral,
        }
    }

    pub fn is_neutral(self) -> bool {
        self == Direction::Neutral
    }
}

/// Result of projecting one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projected {
    pub value: Decimal,
    pub direction: Direction,
}

/// UI-ready value for one widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayValue {
    /// Projected headline value
    pub price: Decimal,
    /// 24h change in percent units, straight from the tick
    pub change_percent: Decimal,
    /// 24h quote volume, straight from the tick
    pub volume: Decimal,
    /// Flash direction shown by the UI
    pub direction: Direction,
}

/// Trait for tick projections
pub trait Projector: Send + Sync {
    /// Project a tick given the previously projected value
    ///
    /// Fails only when the result does not fit in a `Decimal`.
    fn project(&self, tick: &Tick, prior: Option<Decimal>) -> Result<Projected, ProjectionError>;

    /// Project a tick into a full display value
    fn display(&self, tick: &Tick, prior: Option<Decimal>) -> Result<DisplayValue, ProjectionError> {
        let projected = self.project(tick, prior)?;
        Ok(DisplayValue {
            price: projected.value,
            change_percent: tick.percent_change_24h,
            volume: tick.quote_volume_24h,
            direction: projected.direction,
        })
    }
}
