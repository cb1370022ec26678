//! Tunables of the optimization algorithm.

/// Parameters steering the multi-source node separation step.
#[derive(Debug, Clone, Copy)]
pub struct OptimizationParameters {
    /// Minimum distance in mm between two entry points for a separating cut
    /// to be placed between them.
    pub min_source_distance_to_separate: f64,

    /// Maximum extent in mm of the node side a cut runs along.
    pub max_node_width_to_separate: f64,
}

impl Default for OptimizationParameters {
    fn default() -> Self {
        Self {
            min_source_distance_to_separate: 150.0,
            max_node_width_to_separate: 150.0,
        }
    }
}
