//! Configuration of the work allocation program.

use serde::{Deserialize, Serialize};

use crate::allocator::DEFAULT_OUTPUT_PREFIX;

/// Compile-time constants and naming conventions of the work allocation program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationConfig {
    /// The number of collaborators contributing work and capacity.
    pub nr_collaborators: usize,
    /// Collaborator `i` is named `<collaborator_prefix><i>`.
    pub collaborator_prefix: String,
    /// The party receiving all allocations.
    pub out_party: String,
    /// The work input of collaborator `i` is named `<work_prefix><i>`.
    pub work_prefix: String,
    /// The capacity input of collaborator `i` is named `<capacity_prefix><i>`.
    pub capacity_prefix: String,
    /// The allocation for collaborator `i` is delivered as `<output_prefix><i>`.
    pub output_prefix: String,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            nr_collaborators: 3,
            collaborator_prefix: "Collaborator".to_string(),
            out_party: "OutParty".to_string(),
            work_prefix: "work_".to_string(),
            capacity_prefix: "capacity_".to_string(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

impl AllocationConfig {
    /// The default configuration for `nr_collaborators` collaborators.
    pub fn with_collaborators(nr_collaborators: usize) -> Self {
        Self {
            nr_collaborators,
            ..Self::default()
        }
    }
}
