//! Configurable projection formulas

use super::{Direction, Projected, Projector};
use crate::feed::Tick;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rejected projection constants
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectionError {
    #[error("reference price must be positive, got {0}")]
    InvalidReferencePrice(Decimal),
    #[error("projection of {0} is out of decimal range")]
    Overflow(Decimal),
}

/// Synthetic value that tracks a reference market proportionally
///
/// `value = last_price / reference_price * scale_factor`, so a tick at the
/// reference price projects exactly to `scale_factor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawScaled")]
pub struct Scaled {
    reference_price: Decimal,
    scale_factor: Decimal,
}

#[derive(Deserialize)]
struct RawScaled {
    reference_price: Decimal,
    scale_factor: Decimal,
}

impl TryFrom<RawScaled> for Scaled {
    type Error = ProjectionError;

    fn try_from(raw: RawScaled) -> Result<Self, Self::Error> {
        Scaled::new(raw.reference_price, raw.scale_factor)
    }
}

impl Scaled {
    pub fn new(reference_price: Decimal, scale_factor: Decimal) -> Result<Self, ProjectionError> {
        if reference_price <= Decimal::ZERO {
            return Err(ProjectionError::InvalidReferencePrice(reference_price));
        }
        Ok(Self {
            reference_price,
            scale_factor,
        })
    }

    pub fn reference_price(&self) -> Decimal {
        self.reference_price
    }

    pub fn scale_factor(&self) -> Decimal {
        self.scale_factor
    }

    fn apply(&self, price: Decimal) -> Option<Decimal> {
        price
            .checked_div(self.reference_price)?
            .checked_mul(self.scale_factor)
    }
}

/// Projection selected per widget in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Projection {
    /// Raw last price
    #[default]
    Identity,
    /// Price scaled against a reference market
    Scaled(Scaled),
    /// 24h quote volume times a fixed factor
    Volume { scale: Decimal },
}

impl Projection {
    /// Build a scaled projection, rejecting a non-positive reference price
    pub fn scaled(reference_price: Decimal, scale_factor: Decimal) -> Result<Self, ProjectionError> {
        Scaled::new(reference_price, scale_factor).map(Projection::Scaled)
    }

    pub fn volume(scale: Decimal) -> Self {
        Projection::Volume { scale }
    }

    fn value(&self, tick: &Tick) -> Result<Decimal, ProjectionError> {
        match self {
            Projection::Identity => Ok(tick.last_price),
            Projection::Scaled(scaled) => scaled
                .apply(tick.last_price)
                .ok_or(ProjectionError::Overflow(tick.last_price)),
            Projection::Volume { scale } => tick
                .quote_volume_24h
                .checked_mul(*scale)
                .ok_or(ProjectionError::Overflow(tick.quote_volume_24h)),
        }
    }
}

impl Projector for Projection {
    fn project(&self, tick: &Tick, prior: Option<Decimal>) -> Result<Projected, ProjectionError> {
        let value = self.value(tick)?;
        Ok(Projected {
            value,
            direction: Direction::between(prior, value),
        })
    }
}
