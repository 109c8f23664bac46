//! Events produced by the progress accumulator.

use serde::{Deserialize, Serialize};

/// Progress notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgressEvent {
    /// A collection was accepted.
    Accepted {
        /// Normalized category name.
        category: String,
        /// The category's new progress in `[0, 1]`.
        fraction: f32,
        /// The new overall progress in `[0, 1]`.
        overall: f32,
    },
    /// Every category reached its required count.
    Completed,
}
