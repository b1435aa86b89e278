use std::sync::Arc;

use batches_common::BatchesStore;

use crate::config::AppConfig;
use crate::policy::{Caller, MountPolicy};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BatchesStore>,
    pub policy: Arc<dyn MountPolicy>,
    pub config: AppConfig,
}

impl AppState {
    /// Build the state with the policy named in `config`.
    pub fn new(store: Arc<dyn BatchesStore>, config: AppConfig) -> Self {
        Self {
            store,
            policy: config.mount.policy.build(),
            config,
        }
    }

    /// State for a mount router serving a fixed kind of caller.
    pub fn for_caller(&self, caller: Caller) -> MountState {
        MountState {
            store: Arc::clone(&self.store),
            policy: Arc::clone(&self.policy),
            caller,
        }
    }
}

/// Per-router state of the mount handler.
#[derive(Clone)]
pub struct MountState {
    pub store: Arc<dyn BatchesStore>,
    pub policy: Arc<dyn MountPolicy>,
    pub caller: Caller,
}
