//! Configuration options for the beam search
//!
//! This module defines the parameters that bound and shape a search.

use crate::board::Mark;
use crate::{Result, SearchError};

/// Default beam width
pub const DEFAULT_BEAM_WIDTH: usize = 2;
/// Default search depth
pub const DEFAULT_MAX_DEPTH: usize = 2;
/// Default cap on oracle proposals per node
pub const DEFAULT_MAX_PROPOSALS: usize = 100;

/// Configuration for the beam search
///
/// Use the builder methods to create a customized configuration.
///
/// # Example
///
/// ```
/// use thought_tree::{Mark, SearchConfig};
///
/// let config = SearchConfig::default()
///     .with_beam_width(3)
///     .with_max_depth(4)
///     .with_perspective(Mark::X);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of children recursed into at each node, after sorting by score.
    /// Children outside the beam are still recorded in the tree.
    pub beam_width: usize,

    /// Depth at which nodes stop being expanded and return their heuristic
    /// score. Zero evaluates the root only.
    pub max_depth: usize,

    /// Upper bound on oracle proposals kept per node
    pub max_proposals: usize,

    /// The mark every score is expressed for. This side maximizes; the
    /// other side minimizes the same score.
    pub perspective: Mark,

    /// Abort the search when a candidate cannot be expanded, instead of
    /// skipping it
    pub strict: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            beam_width: DEFAULT_BEAM_WIDTH,
            max_depth: DEFAULT_MAX_DEPTH,
            max_proposals: DEFAULT_MAX_PROPOSALS,
            perspective: Mark::O,
            strict: false,
        }
    }
}

impl SearchConfig {
    /// Sets the beam width
    pub fn with_beam_width(mut self, beam_width: usize) -> Self {
        self.beam_width = beam_width;
        self
    }

    /// Sets the maximum search depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the per-node proposal cap
    pub fn with_max_proposals(mut self, max_proposals: usize) -> Self {
        self.max_proposals = max_proposals;
        self
    }

    /// Sets the scoring perspective
    pub fn with_perspective(mut self, perspective: Mark) -> Self {
        self.perspective = perspective;
        self
    }

    /// Sets strict mode
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Checks that the configuration can drive a search
    pub fn validate(&self) -> Result<()> {
        if self.beam_width == 0 {
            return Err(SearchError::InvalidConfiguration(
                "beam_width must be at least 1".to_string(),
            ));
        }
        if self.max_proposals == 0 {
            return Err(SearchError::InvalidConfiguration(
                "max_proposals must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
