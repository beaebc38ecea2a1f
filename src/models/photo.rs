use chrono::{DateTime, Utc};
use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use uuid::Uuid;

/// Tracks which preview handles are still alive, so a leaked record is observable.
#[derive(Clone, Default)]
pub struct DisplayRegistry {
    live: Arc<Mutex<HashSet<Uuid>>>,
}

impl DisplayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> DisplayHandle {
        let id = Uuid::new_v4();
        self.lock().insert(id);
        DisplayHandle {
            id,
            registry: self.clone(),
        }
    }

    pub fn is_live(&self, id: Uuid) -> bool {
        self.lock().contains(&id)
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, id: Uuid) {
        self.lock().remove(&id);
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Uuid>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for DisplayRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Client-side preview reference for one photo. Invalidated when dropped.
pub struct DisplayHandle {
    id: Uuid,
    registry: DisplayRegistry,
}

impl DisplayHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

impl fmt::Debug for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DisplayHandle").field(&self.id).finish()
    }
}

/// A JPEG still tagged with the capture step it answers.
#[derive(Debug)]
pub struct PhotoRecord {
    step_id: String,
    image_bytes: Arc<Vec<u8>>,
    display: DisplayHandle,
    captured_at: DateTime<Utc>,
}

impl PhotoRecord {
    pub fn new(step_id: impl Into<String>, image_bytes: Vec<u8>, display: DisplayHandle) -> Self {
        Self {
            step_id: step_id.into(),
            image_bytes: Arc::new(image_bytes),
            display,
            captured_at: Utc::now(),
        }
    }

    pub fn step_id(&self) -> &str {
        &self.step_id
    }

    pub fn image_bytes(&self) -> &[u8] {
        &self.image_bytes
    }

    /// Shared buffer for handing the bytes to an upload without copying the record.
    pub fn shared_bytes(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.image_bytes)
    }

    pub fn display_id(&self) -> Uuid {
        self.display.id()
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn upload_filename(&self) -> String {
        format!("{}.jpg", self.step_id)
    }
}
