//! Cart and checkout tuning.

use std::time::Duration;

use serde::Deserialize;

/// Cart store settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CartConfig {
    /// Snapshots buffered per cart observer before it starts lagging.
    pub channel_capacity: usize,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

/// Simulated checkout settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// How long placing an order pretends to take.
    pub processing_delay_ms: u64,
}

impl CheckoutConfig {
    #[must_use]
    pub const fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.processing_delay_ms)
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            processing_delay_ms: 2_000,
        }
    }
}
