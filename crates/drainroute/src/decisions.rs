//! The decision oracle: resolves ambiguous choices from a preloaded table.
//!
//! Decision ids are assigned sequentially in call order, so the table in
//! `decisions.csv` addresses the n-th decision the algorithm encounters.
//! Adding a new decision site shifts all later ids; the run log printed
//! through the sink always shows the id to use for each decision.

use std::collections::BTreeMap;
use std::path::Path;

use crate::csv::{self, CsvFile};
use crate::error::Result;
use crate::sink::MessageSink;

/// One selectable alternative of a decision.
#[derive(Debug, Clone)]
pub struct Alternative {
    pub id: u32,
    pub description: String,
}

impl Alternative {
    pub fn new(id: u32, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }
}

/// Resolves tie-breaking decisions from a preloaded table, defaulting to the
/// first alternative.
pub struct DecisionOracle {
    last_generated_id: u32,
    chosen: BTreeMap<u32, u32>,
}

impl DecisionOracle {
    /// Create an oracle with an empty table; every decision takes the default.
    pub fn new() -> Self {
        Self {
            last_generated_id: 0,
            chosen: BTreeMap::new(),
        }
    }

    /// Load preselected alternatives from a CSV file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::load(&csv::load(path, "decisions.csv")?)
    }

    pub(crate) fn load(file: &CsvFile) -> Result<Self> {
        let mut chosen = BTreeMap::new();
        for mut row in file.rows() {
            let decision_id: u32 = row.parse("decisionId")?;
            let alternative_id: u32 = row.parse("alternativeId")?;
            chosen.insert(decision_id, alternative_id);
        }
        Ok(Self {
            last_generated_id: 0,
            chosen,
        })
    }

    /// Resolve one decision among `alternatives` (must be non-empty).
    ///
    /// The decision receives the next sequential id. If the table holds a
    /// selection for that id naming a listed alternative, that alternative
    /// wins; otherwise the first alternative is taken. The decision and its
    /// outcome are narrated through `sink`.
    pub fn choose(
        &mut self,
        sink: &dyn MessageSink,
        description: &str,
        alternatives: &[Alternative],
    ) -> u32 {
        debug_assert!(!alternatives.is_empty());

        self.last_generated_id += 1;
        let decision_id = self.last_generated_id;

        sink.info(&format!("decision #{decision_id}: {description}"));
        for (i, alternative) in alternatives.iter().enumerate() {
            let marker = if i == 0 { " (default)" } else { "" };
            sink.info(&format!(
                "  {}{} - {}",
                alternative.id, marker, alternative.description
            ));
        }

        let preselected = self
            .chosen
            .get(&decision_id)
            .copied()
            .filter(|id| alternatives.iter().any(|a| a.id == *id));

        match preselected {
            Some(id) => {
                sink.info(&format!(
                    "  -> alternative {id} taken per the decisions file"
                ));
                id
            }
            None => {
                let id = alternatives[0].id;
                sink.info(&format!(
                    "  -> default alternative {id} taken; add \"{decision_id};<alternative>\" \
                     to the decisions file to override"
                ));
                id
            }
        }
    }
}

impl Default for DecisionOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::VecSink;

    fn alternatives() -> Vec<Alternative> {
        vec![Alternative::new(1, "first"), Alternative::new(2, "second")]
    }

    #[test]
    fn defaults_to_first_alternative() {
        let mut oracle = DecisionOracle::new();
        let sink = VecSink::new();
        assert_eq!(oracle.choose(&sink, "pick", &alternatives()), 1);
    }

    #[test]
    fn preloaded_choice_wins() {
        let file = csv::from_str("decisionId;alternativeId\n1;2\n", "decisions.csv");
        let mut oracle = DecisionOracle::load(&file).unwrap();
        let sink = VecSink::new();
        assert_eq!(oracle.choose(&sink, "pick", &alternatives()), 2);
    }

    #[test]
    fn unknown_alternative_falls_back_to_default() {
        let file = csv::from_str("decisionId;alternativeId\n1;9\n", "decisions.csv");
        let mut oracle = DecisionOracle::load(&file).unwrap();
        let sink = VecSink::new();
        assert_eq!(oracle.choose(&sink, "pick", &alternatives()), 1);
    }

    #[test]
    fn ids_advance_per_call() {
        let file = csv::from_str("decisionId;alternativeId\n2;2\n", "decisions.csv");
        let mut oracle = DecisionOracle::load(&file).unwrap();
        let sink = VecSink::new();
        // First call gets id 1 (no entry), second call gets id 2 (entry -> 2).
        assert_eq!(oracle.choose(&sink, "a", &alternatives()), 1);
        assert_eq!(oracle.choose(&sink, "b", &alternatives()), 2);
    }

    #[test]
    fn rejects_malformed_rows() {
        let file = csv::from_str("decisionId;alternativeId\n-1;0\n", "decisions.csv");
        assert!(DecisionOracle::load(&file).is_err());
    }
}
