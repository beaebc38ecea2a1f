use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashSet;

/// One ordered photographing instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoStep {
    pub id: String,
    pub label: String,
    pub instruction: String,
}

impl PhotoStep {
    pub fn new(id: &str, label: &str, instruction: &str) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            instruction: instruction.into(),
        }
    }
}

/// Ordered capture steps. The first `required` steps gate processing; the rest are extras.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoStepCatalog {
    steps: Vec<PhotoStep>,
    required: usize,
}

impl PhotoStepCatalog {
    pub fn new(steps: Vec<PhotoStep>, required: usize) -> Result<Self> {
        if steps.is_empty() {
            bail!("a step catalog needs at least one step");
        }
        if required == 0 || required > steps.len() {
            bail!(
                "required step count {required} must be between 1 and {}",
                steps.len()
            );
        }

        let mut seen = HashSet::new();
        for step in &steps {
            if step.id.trim().is_empty() {
                bail!("step ids must not be blank");
            }
            if !seen.insert(step.id.as_str()) {
                bail!("duplicate step id '{}'", step.id);
            }
        }

        Ok(Self { steps, required })
    }

    /// Front, left and right are required; the back (nutrition panel) is optional.
    pub fn standard() -> Self {
        Self {
            steps: vec![
                PhotoStep::new("front", "Front view", "Place the product facing the camera"),
                PhotoStep::new("left", "Left side", "Show the left side of the product"),
                PhotoStep::new("right", "Right side", "Show the right side of the product"),
                PhotoStep::new(
                    "back",
                    "Back view (optional)",
                    "Show the back with the nutrition information",
                ),
            ],
            required: 3,
        }
    }

    pub fn steps(&self) -> &[PhotoStep] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&PhotoStep> {
        self.steps.get(index)
    }

    pub fn position(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|step| step.id == step_id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn required_count(&self) -> usize {
        self.required
    }

    pub fn is_optional(&self, index: usize) -> bool {
        index >= self.required
    }
}

impl Default for PhotoStepCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_three_required_and_an_optional_back() {
        let catalog = PhotoStepCatalog::standard();
        let ids: Vec<&str> = catalog.steps().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["front", "left", "right", "back"]);
        assert_eq!(catalog.required_count(), 3);
        assert!(!catalog.is_optional(2));
        assert!(catalog.is_optional(3));
        assert_eq!(catalog.position("right"), Some(2));
    }

    #[test]
    fn rejects_duplicate_ids_and_bad_required_counts() {
        let twice = vec![PhotoStep::new("front", "a", "b"), PhotoStep::new("front", "c", "d")];
        assert!(PhotoStepCatalog::new(twice, 1).is_err());

        let one = vec![PhotoStep::new("front", "a", "b")];
        assert!(PhotoStepCatalog::new(one.clone(), 0).is_err());
        assert!(PhotoStepCatalog::new(one.clone(), 2).is_err());
        assert!(PhotoStepCatalog::new(one, 1).is_ok());
    }
}
