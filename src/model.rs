use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single measured/reported record inside an evaluation. Field-level
/// semantics belong to the external schema; the merger passes metrics
/// through unmodified.
pub type Metric = Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub name: String,
    pub metrics: Vec<Metric>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualityControl {
    pub evaluations: Vec<Evaluation>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QualityControl {
    /// Folds one evaluation into the document. Evaluations sharing a name
    /// are the same evaluation: incoming metrics are appended after the
    /// existing ones. Unknown names keep their arrival order.
    pub fn merge_evaluation(&mut self, incoming: Evaluation) {
        match self
            .evaluations
            .iter_mut()
            .find(|existing| existing.name == incoming.name)
        {
            Some(existing) => existing.metrics.extend(incoming.metrics),
            None => self.evaluations.push(incoming),
        }
    }

    /// Folds every evaluation of `other` into this document, in document
    /// order. Document-level fields of `other` are dropped; the merged
    /// output is a fresh document holding only the combined evaluations.
    pub fn merge_from(&mut self, other: QualityControl) {
        for evaluation in other.evaluations {
            self.merge_evaluation(evaluation);
        }
    }
}
