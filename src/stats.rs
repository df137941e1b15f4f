//! Statistics collection for beam searches

use std::time::Duration;

/// Statistics collected during one search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Nodes in the tree, root included
    pub nodes_created: usize,

    /// Nodes whose children were generated
    pub nodes_expanded: usize,

    /// Times the oracle was consulted
    pub oracle_calls: usize,

    /// Times the oracle had nothing and every legal cell was used instead
    pub fallbacks: usize,

    /// Oracle proposals dropped as illegal or duplicate
    pub rejected_proposals: usize,

    /// Candidates that failed to expand and were skipped
    pub skipped_candidates: usize,

    /// Deepest node depth evaluated
    pub max_depth_reached: usize,

    /// Total time spent searching
    pub total_time: Duration,
}

impl SearchStatistics {
    /// Creates a new, empty statistics object
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of oracle calls that needed fallback enumeration
    pub fn fallback_rate(&self) -> f64 {
        if self.oracle_calls == 0 {
            return 0.0;
        }
        self.fallbacks as f64 / self.oracle_calls as f64
    }

    /// Returns a summary of the statistics as a string
    pub fn summary(&self) -> String {
        format!(
            "Thought Tree Search Statistics:\n\
             - Nodes created: {}\n\
             - Nodes expanded: {}\n\
             - Max depth reached: {}\n\
             - Oracle calls: {} ({} fallbacks, {:.0}%)\n\
             - Rejected proposals: {}\n\
             - Skipped candidates: {}\n\
             - Total time: {:.3} ms",
            self.nodes_created,
            self.nodes_expanded,
            self.max_depth_reached,
            self.oracle_calls,
            self.fallbacks,
            self.fallback_rate() * 100.0,
            self.rejected_proposals,
            self.skipped_candidates,
            self.total_time.as_secs_f64() * 1000.0,
        )
    }
}
