//! Platform abstraction layer for cross-platform compatibility.
//!
//! All `#[cfg]` blocks for OS-specific behavior live in this module rather
//! than scattered throughout the codebase.
//!
//! - `paths` - Absolute path resolution and separators
//! - `process` - Process table enumeration

pub mod paths;
pub mod process;

pub use paths::{absolutize, has_path_separator, CLASSPATH_SEPARATOR};
pub use process::{current_pid, PsProcessLister, SysinfoProcessLister};
