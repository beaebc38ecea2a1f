use serde::Serialize;
use uuid::Uuid;

use crate::models::PhotoStep;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum CaptureState {
    Idle,
    /// `step_id` names the step the next capture answers, which after a delete
    /// may lie before `step_index`.
    Capturing { step_index: usize, step_id: String },
    PendingConfirm { step_index: usize, step_id: String },
    ReadyToProcess { accepted: usize },
}

impl Default for CaptureState {
    fn default() -> Self {
        CaptureState::Idle
    }
}

impl CaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::Capturing { .. } => "capturing",
            CaptureState::PendingConfirm { .. } => "pendingConfirm",
            CaptureState::ReadyToProcess { .. } => "readyToProcess",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedPhoto {
    pub step_id: String,
    pub display_id: Uuid,
}

/// Everything a capture screen needs to render the session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshot {
    pub state: CaptureState,
    pub step_index: usize,
    pub total_steps: usize,
    pub required_steps: usize,
    pub camera_open: bool,
    pub next_step: Option<PhotoStep>,
    pub pending: Option<AcceptedPhoto>,
    pub accepted: Vec<AcceptedPhoto>,
}
