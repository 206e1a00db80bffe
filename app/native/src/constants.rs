//! Internal constants for banner scheduling and resolution.
//!
//! This module centralizes the timing values and marker names used by the
//! lifecycle controller and the resolver.
//!
//! # Organization
//!
//! Constants are grouped by functionality:
//! - `timing` - Debouncing and settle delays
//! - `service` - Event channel sizing
//! - `template` - Header template expansion limits
//! - `markers` - Class names shared with the rendering layer
//! - `conversion` - Bulk conversion batching

/// Timing constants for event handling and debouncing.
pub mod timing {
    /// Trailing debounce window for pane updates (ms).
    ///
    /// Bursts of pane activation, metadata and layout events inside this window
    /// produce a single resolution.
    pub const PANE_DEBOUNCE_MS: u64 = 100;

    /// Delay between the end of the debounce window and the container lookup (ms).
    ///
    /// Lets the host finish switching between preview and live edit so the
    /// correct content container is exposed.
    pub const PANE_SETTLE_MS: u64 = 50;

    /// Delay before an embed or popover is resolved (ms).
    pub const EMBED_SETTLE_MS: u64 = 50;

    /// Debounce for settings file change notifications (ms).
    ///
    /// Some editors trigger multiple events per save (write to temp, rename, etc.).
    pub const SETTINGS_WATCH_DEBOUNCE_MS: u64 = 200;
}

/// Banner service channel sizing.
pub mod service {
    /// Capacity of the host event channel.
    pub const CHANNEL_BUFFER_SIZE: usize = 256;
}

/// Header template expansion limits.
pub mod template {
    /// Maximum number of substitution passes over a header template.
    pub const MAX_ITERATIONS: usize = 10;

    /// Maximum length of expanded header text, in bytes.
    ///
    /// Expansion stops once the text would grow past this, whatever the pass.
    pub const MAX_TEMPLATE_LEN: usize = 4 * 1024;
}

/// Marker class names shared with the rendering layer.
pub mod markers {
    /// Class added to every banner wrapper; used to detect already-processed surfaces.
    pub const BANNER_APPLIED_CLASS: &str = "banner-plugin-applied";

    /// Base class of the wrapper element.
    pub const WRAPPER_CLASS: &str = "banner-wrapper";

    /// Extra wrapper class for transcluded embeds.
    pub const EMBED_CLASS: &str = "is-real-embed";

    /// Extra wrapper class for hover popovers.
    pub const POPOVER_CLASS: &str = "is-popover-embed";
}

/// Bulk conversion batching.
pub mod conversion {
    /// Number of files processed before yielding back to the runtime.
    pub const CHUNK_SIZE: usize = 50;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pane_debounce_is_short() {
        const { assert!(timing::PANE_DEBOUNCE_MS >= 50) };
        const { assert!(timing::PANE_DEBOUNCE_MS <= 500) };
    }

    #[test]
    fn test_settle_delays_are_below_debounce() {
        const { assert!(timing::PANE_SETTLE_MS < timing::PANE_DEBOUNCE_MS) };
        const { assert!(timing::EMBED_SETTLE_MS < timing::PANE_DEBOUNCE_MS) };
    }

    #[test]
    fn test_template_iteration_cap() {
        assert_eq!(template::MAX_ITERATIONS, 10);
        const { assert!(template::MAX_TEMPLATE_LEN >= 1024) };
    }

    #[test]
    fn test_conversion_chunk_size() {
        assert_eq!(conversion::CHUNK_SIZE, 50);
    }
}
