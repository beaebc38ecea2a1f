use serde::Serialize;

use crate::{
    capture::CaptureSnapshot,
    interpret::Interpretation,
    models::{ProductDraft, SavedProduct},
};

/// Operator actions, one per button on the registration screens.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start,
    Capture,
    Confirm,
    Retake,
    Delete(usize),
    Stop,
    Reset,
    Process,
    Retry,
    Recapture,
    Save(ProductDraft),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Capture => "capture",
            Command::Confirm => "confirm",
            Command::Retake => "retake",
            Command::Delete(_) => "delete",
            Command::Stop => "stop",
            Command::Reset => "reset",
            Command::Process => "process",
            Command::Retry => "retry",
            Command::Recapture => "recapture",
            Command::Save(_) => "save",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Outcome {
    Capture { snapshot: CaptureSnapshot },
    Review { interpretation: Interpretation },
    Saved {
        product: SavedProduct,
        #[serde(skip)]
        voice_clip: Option<Vec<u8>>,
    },
}
