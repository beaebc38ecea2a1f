//! Draft checks run before anything goes over the wire.

use chrono::NaiveDate;

use crate::{
    error::SaveError,
    models::{FieldName, ProductDraft, SaveRequest},
};

const EXPIRY_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Turn an operator draft into the save payload, or report every field that blocks it.
pub fn prepare(draft: &ProductDraft) -> Result<SaveRequest, SaveError> {
    let mut invalid: Vec<FieldName> = FieldName::REQUIRED
        .into_iter()
        .filter(|field| draft.value(*field).trim().is_empty())
        .collect();

    let expiry_date = match normalize_expiry(&draft.expiry_date) {
        Ok(date) => date,
        Err(()) => {
            invalid.push(FieldName::ExpiryDate);
            None
        }
    };

    if !invalid.is_empty() {
        return Err(SaveError::Validation { fields: invalid });
    }

    Ok(SaveRequest {
        name: draft.name.trim().to_string(),
        brand: draft.brand.trim().to_string(),
        presentation: optional(&draft.presentation),
        size: draft.size.trim().to_string(),
        barcode: optional(&draft.barcode),
        batch_number: optional(&draft.batch_number),
        expiry_date,
        price: parse_price(&draft.price),
        description: optional(&draft.description),
    })
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Accepts `4.50`, `4,50` and a leading currency marker. Anything else is no price.
pub(crate) fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw
        .trim()
        .trim_start_matches("S/")
        .trim_start_matches('$')
        .trim()
        .replace(',', ".");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

/// Empty is `Ok(None)`. A value in none of the accepted layouts is `Err`.
pub(crate) fn normalize_expiry(raw: &str) -> Result<Option<NaiveDate>, ()> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    EXPIRY_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .map(Some)
        .ok_or(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: " Leche Gloria ".into(),
            brand: "Gloria".into(),
            size: "1L".into(),
            ..Default::default()
        }
    }

    #[test]
    fn complete_draft_becomes_a_trimmed_payload_with_nulls() {
        let request = prepare(&draft()).unwrap();
        assert_eq!(request.name, "Leche Gloria");
        assert_eq!(request.barcode, None);
        assert_eq!(request.price, None);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["description"], serde_json::Value::Null);
        assert_eq!(body["expiry_date"], serde_json::Value::Null);
    }

    #[test]
    fn blank_required_fields_are_all_reported() {
        let mut d = draft();
        d.name = "   ".into();
        d.size.clear();
        assert_eq!(
            prepare(&d),
            Err(SaveError::Validation {
                fields: vec![FieldName::Name, FieldName::Size]
            })
        );
    }

    #[test]
    fn price_parsing_never_fails_the_save() {
        assert_eq!(parse_price("4.50"), Some(4.5));
        assert_eq!(parse_price(" 4,50 "), Some(4.5));
        assert_eq!(parse_price("S/ 3.2"), Some(3.2));
        assert_eq!(parse_price("0"), Some(0.0));
        assert_eq!(parse_price("about five"), None);
        assert_eq!(parse_price("NaN"), None);

        let mut d = draft();
        d.price = "cheap".into();
        assert_eq!(prepare(&d).unwrap().price, None);
    }

    #[test]
    fn expiry_is_sent_as_an_iso_date() {
        let iso = NaiveDate::from_ymd_opt(2026, 3, 31);
        assert_eq!(normalize_expiry("2026-03-31"), Ok(iso));
        assert_eq!(normalize_expiry("31/03/2026"), Ok(iso));
        assert_eq!(normalize_expiry("31-03-2026"), Ok(iso));
        assert_eq!(normalize_expiry(""), Ok(None));
        assert!(normalize_expiry("March 2026").is_err());

        let mut d = draft();
        d.expiry_date = "31/03/2026".into();
        let body = serde_json::to_value(prepare(&d).unwrap()).unwrap();
        assert_eq!(body["expiry_date"], "2026-03-31");

        d.expiry_date = "soon".into();
        assert_eq!(
            prepare(&d),
            Err(SaveError::Validation {
                fields: vec![FieldName::ExpiryDate]
            })
        );
    }
}
