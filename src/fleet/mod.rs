// src/fleet/mod.rs

//! Read-only view of what is running on a cluster.
//!
//! - [`reader`] polls the status API (list, then describe).
//! - [`grouping`] derives task-definition families and the grouped view.

pub mod grouping;
pub mod reader;

pub use grouping::{group_by_family, task_definition_family, GroupMember, TaskGroup};
pub use reader::{FleetReport, FleetSnapshot, FleetStatusReader, RunningTaskSnapshot};
