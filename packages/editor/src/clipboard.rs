//! Shared copy buffer
//!
//! One buffer serves every page of every engine that holds a clone of it. A
//! copy replaces the whole buffer, so concurrent copies race and the last one
//! wins.

use pagesmith_model::ComponentInstance;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    items: Arc<Mutex<Vec<ComponentInstance>>>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the buffer contents
    pub fn set(&self, items: Vec<ComponentInstance>) {
        *self.lock() = items;
    }

    /// Copy of the current buffer, in copy order
    pub fn contents(&self) -> Vec<ComponentInstance> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave a half-written Vec behind,
    // so a poisoned buffer is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<ComponentInstance>> {
        self.items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
