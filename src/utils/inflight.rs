use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Non-reentrancy flag shared by the upload pipeline and the persistence client.
///
/// `try_enter` hands out a guard; the flag clears when the guard drops, so every
/// exit path (including a dropped future) releases it.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_enter(&self) -> Option<InFlightGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct InFlightGuard {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_entry_is_refused_until_guard_drops() {
        let flag = InFlight::new();
        let guard = flag.try_enter().expect("first entry");
        assert!(flag.is_busy());
        assert!(flag.try_enter().is_none());

        drop(guard);
        assert!(!flag.is_busy());
        assert!(flag.try_enter().is_some());
    }
}
