use std::time::Duration;

use serde::Deserialize;

/// Dispatch pacing and event buffering.
#[derive(Debug, Deserialize)]
pub struct DispatchConfig {
    /// Delay between consecutive recipients, in milliseconds.
    #[serde(default = "default_message_delay_ms")]
    pub message_delay_ms: u64,
    /// Capacity of the progress event channel. Slow SSE clients that fall
    /// further behind than this receive a `lagged` event.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            message_delay_ms: default_message_delay_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl DispatchConfig {
    /// The pacing delay.
    pub fn message_delay(&self) -> Duration {
        Duration::from_millis(self.message_delay_ms)
    }
}

fn default_message_delay_ms() -> u64 {
    10_000
}

fn default_event_capacity() -> usize {
    herald_dispatch::DEFAULT_EVENT_CAPACITY
}
