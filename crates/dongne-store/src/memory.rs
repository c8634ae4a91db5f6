//! In-process baseline backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dongne_core::{Clock, Deal};

use crate::baseline::{BaselineRepository, BaselineSnapshot, refresh_due};
use crate::StoreError;

/// Baseline held in memory; lost on restart.
pub struct MemoryBaseline {
    slot: Mutex<Option<BaselineSnapshot>>,
    clock: Arc<dyn Clock>,
}

impl MemoryBaseline {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(None),
            clock,
        }
    }

    pub fn with_snapshot(snapshot: BaselineSnapshot, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot)),
            clock,
        }
    }

    fn get(&self) -> Option<BaselineSnapshot> {
        let slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        slot.clone()
    }
}

#[async_trait]
impl BaselineRepository for MemoryBaseline {
    async fn read(&self) -> Option<BaselineSnapshot> {
        self.get()
    }

    async fn write(&self, deals: &[Deal]) -> Result<BaselineSnapshot, StoreError> {
        let snapshot = BaselineSnapshot::capture(deals.to_vec(), self.clock.now());
        let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        *slot = Some(snapshot.clone());
        Ok(snapshot)
    }

    async fn is_refresh_due(&self) -> bool {
        refresh_due(self.get().as_ref(), self.clock.today())
    }
}
