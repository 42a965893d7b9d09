//! Target resolution from free-form community links
//!
//! This module turns the rows of a targets workbook into typed [`Target`]s:
//! - recognizing platform-specific link formats (wall, feed, message-stream)
//! - tagging each extracted identifier with its platform prefix
//! - hashing the resolved set so report merging can detect list changes

mod input;
mod recognize;
mod target;

pub use input::{load_targets, InputError};
pub use recognize::resolve;
pub use target::{Target, TargetSet};
