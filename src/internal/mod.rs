//! Internal implementation details.

pub(crate) mod circular;
pub(crate) mod lifecycle;

pub(crate) use circular::{path_names, CycleDetector};
pub(crate) use lifecycle::LifecycleRecord;
