pub mod extraction;
pub mod helpers;
pub mod photo;
pub mod product;
pub mod step;

pub use extraction::{DuplicateCandidate, ExtractionResult};
pub use photo::{DisplayHandle, DisplayRegistry, PhotoRecord};
pub use product::{FieldName, ProductDraft, ProductFields, SaveRequest, SavedProduct, StoredProduct};
pub use step::{PhotoStep, PhotoStepCatalog};
