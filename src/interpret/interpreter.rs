use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{ExtractionResult, FieldName, ProductDraft};

use super::{
    advisory::Advisory,
    tier::{confidence_percent, ConfidenceTier},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldStatus {
    Filled,
    Empty,
}

/// Review-screen model derived from one extraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    pub draft: ProductDraft,
    pub tier: ConfidenceTier,
    pub confidence_percent: u8,
    pub field_status: BTreeMap<FieldName, FieldStatus>,
    pub advisories: Vec<Advisory>,
}

impl Interpretation {
    pub fn confidence_badge(&self) -> String {
        self.tier.badge(self.confidence_percent)
    }

    pub fn empty_fields(&self) -> Vec<FieldName> {
        self.field_status
            .iter()
            .filter(|(_, status)| **status == FieldStatus::Empty)
            .map(|(field, _)| *field)
            .collect()
    }
}

pub fn interpret(result: &ExtractionResult) -> Interpretation {
    let draft = ProductDraft::from_fields(&result.product);

    let field_status = FieldName::ALL
        .into_iter()
        .map(|field| {
            let status = if draft.value(field).trim().is_empty() {
                FieldStatus::Empty
            } else {
                FieldStatus::Filled
            };
            (field, status)
        })
        .collect();

    let mut advisories: Vec<Advisory> = result
        .missing_fields
        .iter()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| Advisory::missing(raw))
        .collect();

    if !result.duplicates.is_empty() {
        advisories.push(Advisory::PossibleDuplicates {
            candidates: result.duplicates.clone(),
        });
    }

    Interpretation {
        draft,
        tier: ConfidenceTier::from_confidence(result.confidence),
        confidence_percent: confidence_percent(result.confidence),
        field_status,
        advisories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DuplicateCandidate, ProductFields};

    fn gloria() -> ExtractionResult {
        ExtractionResult {
            product: ProductFields {
                name: Some("Leche Gloria".into()),
                brand: Some("Gloria".into()),
                size: Some("1L".into()),
                ..Default::default()
            },
            confidence: 0.82,
            missing_fields: vec![],
            duplicates: vec![],
        }
    }

    #[test]
    fn confident_complete_extraction_has_no_advisories() {
        let review = interpret(&gloria());
        assert_eq!(review.tier, ConfidenceTier::High);
        assert_eq!(review.draft.name, "Leche Gloria");
        assert_eq!(review.draft.size, "1L");
        assert!(review.advisories.is_empty());
        assert_eq!(review.field_status[&FieldName::Brand], FieldStatus::Filled);
        assert_eq!(review.field_status[&FieldName::Barcode], FieldStatus::Empty);
        assert_eq!(review.confidence_badge(), "✓ 82% confidence");
    }

    #[test]
    fn missing_fields_and_duplicates_become_advisories() {
        let mut result = gloria();
        result.confidence = 0.41;
        result.missing_fields = vec!["barcode".into(), "expiry_date".into(), "shelf_code".into()];
        result.duplicates = vec![DuplicateCandidate {
            name: "Leche Gloria Light".into(),
            brand: "Gloria".into(),
            similarity: 0.9,
        }];

        let review = interpret(&result);
        assert_eq!(review.tier, ConfidenceTier::Medium);

        let messages: Vec<String> = review.advisories.iter().map(Advisory::message).collect();
        assert_eq!(
            messages,
            [
                "Barcode could not be detected; please fill it in.",
                "Expiry date could not be detected; please fill it in.",
                "shelf_code could not be detected; please fill it in.",
                "Similar products already registered: Leche Gloria Light (Gloria) 90%",
            ]
        );
    }

    #[test]
    fn empty_product_marks_every_field_empty() {
        let review = interpret(&ExtractionResult::default());
        assert_eq!(review.tier, ConfidenceTier::Low);
        assert_eq!(review.empty_fields().len(), FieldName::ALL.len());
        assert_eq!(review.draft, ProductDraft::default());
    }
}
