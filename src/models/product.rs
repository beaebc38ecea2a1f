//! Product shapes at each stage: extractor output, operator draft, save payload, stored row.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::helpers::lenient_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Name,
    Brand,
    Presentation,
    Size,
    Barcode,
    Batch,
    ExpiryDate,
    Price,
    Description,
}

impl FieldName {
    pub const ALL: [FieldName; 9] = [
        FieldName::Name,
        FieldName::Brand,
        FieldName::Presentation,
        FieldName::Size,
        FieldName::Barcode,
        FieldName::Batch,
        FieldName::ExpiryDate,
        FieldName::Price,
        FieldName::Description,
    ];

    pub const REQUIRED: [FieldName; 3] = [FieldName::Name, FieldName::Brand, FieldName::Size];

    pub fn wire_name(&self) -> &'static str {
        match self {
            FieldName::Name => "name",
            FieldName::Brand => "brand",
            FieldName::Presentation => "presentation",
            FieldName::Size => "size",
            FieldName::Barcode => "barcode",
            FieldName::Batch => "batch",
            FieldName::ExpiryDate => "expiry_date",
            FieldName::Price => "price",
            FieldName::Description => "description",
        }
    }

    /// Accepts the extractor's names plus the save endpoint's spellings.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim() {
            "name" => Some(FieldName::Name),
            "brand" => Some(FieldName::Brand),
            "presentation" => Some(FieldName::Presentation),
            "size" => Some(FieldName::Size),
            "barcode" => Some(FieldName::Barcode),
            "batch" | "batch_number" => Some(FieldName::Batch),
            "expiry_date" | "expiry" => Some(FieldName::ExpiryDate),
            "price" => Some(FieldName::Price),
            "description" => Some(FieldName::Description),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldName::Name => "Product name",
            FieldName::Brand => "Brand",
            FieldName::Presentation => "Presentation",
            FieldName::Size => "Size",
            FieldName::Barcode => "Barcode",
            FieldName::Batch => "Batch",
            FieldName::ExpiryDate => "Expiry date",
            FieldName::Price => "Price",
            FieldName::Description => "Description",
        }
    }
}

/// Whatever the extractor managed to read. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductFields {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub brand: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub presentation: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub size: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub barcode: Option<String>,
    #[serde(alias = "batch_number", deserialize_with = "lenient_text")]
    pub batch: Option<String>,
    #[serde(alias = "expiry", deserialize_with = "lenient_text")]
    pub expiry_date: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub price: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

impl ProductFields {
    pub fn get(&self, field: FieldName) -> Option<&str> {
        let value = match field {
            FieldName::Name => &self.name,
            FieldName::Brand => &self.brand,
            FieldName::Presentation => &self.presentation,
            FieldName::Size => &self.size,
            FieldName::Barcode => &self.barcode,
            FieldName::Batch => &self.batch,
            FieldName::ExpiryDate => &self.expiry_date,
            FieldName::Price => &self.price,
            FieldName::Description => &self.description,
        };
        value.as_deref()
    }
}

/// Operator-editable form values. Empty text means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub name: String,
    pub brand: String,
    pub presentation: String,
    pub size: String,
    pub barcode: String,
    pub batch_number: String,
    pub expiry_date: String,
    pub price: String,
    pub description: String,
}

impl ProductDraft {
    pub fn from_fields(fields: &ProductFields) -> Self {
        let mut draft = Self::default();
        for field in FieldName::ALL {
            if let Some(value) = fields.get(field) {
                draft.set(field, value);
            }
        }
        draft
    }

    pub fn value(&self, field: FieldName) -> &str {
        match field {
            FieldName::Name => &self.name,
            FieldName::Brand => &self.brand,
            FieldName::Presentation => &self.presentation,
            FieldName::Size => &self.size,
            FieldName::Barcode => &self.barcode,
            FieldName::Batch => &self.batch_number,
            FieldName::ExpiryDate => &self.expiry_date,
            FieldName::Price => &self.price,
            FieldName::Description => &self.description,
        }
    }

    pub fn set(&mut self, field: FieldName, value: impl Into<String>) {
        let slot = match field {
            FieldName::Name => &mut self.name,
            FieldName::Brand => &mut self.brand,
            FieldName::Presentation => &mut self.presentation,
            FieldName::Size => &mut self.size,
            FieldName::Barcode => &mut self.barcode,
            FieldName::Batch => &mut self.batch_number,
            FieldName::ExpiryDate => &mut self.expiry_date,
            FieldName::Price => &mut self.price,
            FieldName::Description => &mut self.description,
        };
        *slot = value.into();
    }
}

/// JSON body of `POST /inventory/save`; absent optionals serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaveRequest {
    pub name: String,
    pub brand: String,
    pub presentation: Option<String>,
    pub size: String,
    pub barcode: Option<String>,
    pub batch_number: Option<String>,
    pub expiry_date: Option<NaiveDate>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredProduct {
    pub id: Option<i64>,
    pub name: String,
    pub brand: String,
    pub presentation: Option<String>,
    pub size: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    pub normalized_size_value: Option<f64>,
    pub normalized_size_unit: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedProduct {
    pub id: i64,
    #[serde(default)]
    pub product: StoredProduct,
    #[serde(default)]
    pub message: Option<String>,
}
