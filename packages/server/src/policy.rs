//! Authorization decisions for mount transfers.
//!
//! The handler never inspects the caller itself; it asks the injected
//! [`MountPolicy`] whether the caller of its router may perform an action.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

/// Who is on the other end of a mount router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// A remote executor running batch-spec steps.
    Executor,
    /// Any other authenticated client.
    User,
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executor => f.write_str("executor"),
            Self::User => f.write_str("user"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountAction {
    Download,
    CheckExists,
    Upload,
}

impl fmt::Display for MountAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download => f.write_str("download"),
            Self::CheckExists => f.write_str("existence check"),
            Self::Upload => f.write_str("upload"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{action} is not permitted for {caller}")]
pub struct PolicyDenied {
    pub caller: Caller,
    pub action: MountAction,
}

pub trait MountPolicy: Send + Sync {
    fn authorize(&self, caller: Caller, action: MountAction) -> Result<(), PolicyDenied>;
}

/// Every caller may perform every action.
pub struct AllowAll;

impl MountPolicy for AllowAll {
    fn authorize(&self, _caller: Caller, _action: MountAction) -> Result<(), PolicyDenied> {
        Ok(())
    }
}

/// Users may only upload; reading mounts back is reserved for executors.
pub struct ExecutorOnly;

impl MountPolicy for ExecutorOnly {
    fn authorize(&self, caller: Caller, action: MountAction) -> Result<(), PolicyDenied> {
        match (caller, action) {
            (Caller::Executor, _) | (Caller::User, MountAction::Upload) => Ok(()),
            (Caller::User, _) => Err(PolicyDenied { caller, action }),
        }
    }
}

/// Policy selector used in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    AllowAll,
    ExecutorOnly,
}

impl PolicyKind {
    pub fn build(self) -> Arc<dyn MountPolicy> {
        match self {
            Self::AllowAll => Arc::new(AllowAll),
            Self::ExecutorOnly => Arc::new(ExecutorOnly),
        }
    }
}
