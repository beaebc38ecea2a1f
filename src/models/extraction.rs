use serde::{Deserialize, Serialize};

use super::{helpers::null_as_default, product::ProductFields};

/// Body of a successful `POST /inventory/from-images`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub product: ProductFields,
    #[serde(default, deserialize_with = "null_as_default")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub missing_fields: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub duplicates: Vec<DuplicateCandidate>,
}

/// An already-stored product the extractor thinks this one may repeat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateCandidate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub similarity: f64,
}

impl DuplicateCandidate {
    /// Similarity as a whole percentage. Scores above 1 are taken as already being percentages.
    pub fn similarity_percent(&self) -> u8 {
        if !self.similarity.is_finite() {
            return 0;
        }
        let scaled = if self.similarity > 1.0 {
            self.similarity
        } else {
            self.similarity * 100.0
        };
        scaled.round().clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_extractor_payload_with_extra_keys() {
        let result: ExtractionResult = serde_json::from_str(
            r#"{
                "raw_text": {"front": "GLORIA"},
                "confidence": 0.82,
                "product": {"name": "Leche Gloria", "brand": "Gloria", "size": "1L"},
                "missing_fields": ["barcode"],
                "duplicates": [{
                    "id": 7,
                    "name": "Leche Gloria Light",
                    "brand": "Gloria",
                    "size": "1L",
                    "similarity": 0.91
                }],
                "is_duplicate": true
            }"#,
        )
        .unwrap();

        assert_eq!(result.product.brand.as_deref(), Some("Gloria"));
        assert_eq!(result.missing_fields, ["barcode"]);
        assert_eq!(result.duplicates[0].similarity_percent(), 91);
    }

    #[test]
    fn null_sections_fall_back_to_empty() {
        let body = r#"{"product": null, "confidence": null, "duplicates": null}"#;
        let result: ExtractionResult = serde_json::from_str(body).unwrap();
        assert_eq!(result, ExtractionResult::default());
    }

    #[test]
    fn similarity_percent_accepts_both_scales() {
        let fraction = DuplicateCandidate { similarity: 0.856, ..Default::default() };
        let percent = DuplicateCandidate { similarity: 86.0, ..Default::default() };
        assert_eq!(fraction.similarity_percent(), 86);
        assert_eq!(percent.similarity_percent(), 86);
    }
}
