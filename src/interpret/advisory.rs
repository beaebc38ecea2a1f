use serde::Serialize;

use crate::models::{DuplicateCandidate, FieldName};

/// Non-blocking notes shown next to the review form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Advisory {
    /// The extractor could not read this field; the operator has to fill it in.
    MissingField {
        field: String,
        known: Option<FieldName>,
    },
    PossibleDuplicates { candidates: Vec<DuplicateCandidate> },
}

impl Advisory {
    pub fn missing(raw: &str) -> Self {
        Advisory::MissingField {
            field: raw.trim().to_string(),
            known: FieldName::from_wire(raw),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Advisory::MissingField { field, known } => {
                let label = known.map(|f| f.label().to_string()).unwrap_or_else(|| field.clone());
                format!("{label} could not be detected; please fill it in.")
            }
            Advisory::PossibleDuplicates { candidates } => {
                let listed = candidates
                    .iter()
                    .map(|c| format!("{} ({}) {}%", c.name, c.brand, c.similarity_percent()))
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("Similar products already registered: {listed}")
            }
        }
    }
}
