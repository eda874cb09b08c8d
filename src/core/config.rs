//! # Orchestrator configuration.
//!
//! Provides [`OrchestratorConfig`] centralized settings for the orchestrator.
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited (no semaphore created)
//! - `bus_capacity = 0` → clamped to 1

/// Configuration for the orchestrator.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `max_concurrent`: Cap on component calls running at once inside one batch (`0` = unlimited)
///
/// ## Notes
/// All fields are public for flexibility. Prefer using helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct OrchestratorConfig {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// miss older items.
    pub bus_capacity: usize,

    /// Maximum number of `initialize()`/`cleanup()` calls running concurrently.
    ///
    /// - `0` = unlimited: every member of a batch runs at once
    /// - `n > 0` = at most `n` calls in flight; batch boundaries are still respected
    pub max_concurrent: usize,
}

impl OrchestratorConfig {
    /// Returns the concurrency limit as an `Option`.
    ///
    /// - `None` → unlimited (no semaphore)
    /// - `Some(n)` → at most `n` concurrent component calls
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for OrchestratorConfig {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `max_concurrent = 0` (unlimited)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            max_concurrent: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_map_to_unlimited_and_minimum() {
        let cfg = OrchestratorConfig {
            bus_capacity: 0,
            max_concurrent: 0,
        };
        assert_eq!(cfg.concurrency_limit(), None);
        assert_eq!(cfg.bus_capacity_clamped(), 1);

        let cfg = OrchestratorConfig {
            max_concurrent: 4,
            ..OrchestratorConfig::default()
        };
        assert_eq!(cfg.concurrency_limit(), Some(4));
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
    }
}
