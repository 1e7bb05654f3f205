//! Baseline persistence

use std::sync::Arc;

use crate::error::Result;
use crate::models::Baseline;
use crate::persistence::{keys, load_json, save_json, KeyValueStore};

/// Saves and restores the single active baseline under a fixed key
#[derive(Clone)]
pub struct BaselineStore {
    store: Arc<dyn KeyValueStore>,
}

impl BaselineStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn save_baseline(&self, baseline: &Baseline) -> Result<()> {
        save_json(self.store.as_ref(), keys::BASELINE, baseline)
    }

    /// `None` when nothing is stored or the stored value is unreadable
    pub fn load_baseline(&self) -> Option<Baseline> {
        load_json(self.store.as_ref(), keys::BASELINE)
    }

    pub fn clear_baseline(&self) -> Result<()> {
        self.store.remove(keys::BASELINE)
    }
}
