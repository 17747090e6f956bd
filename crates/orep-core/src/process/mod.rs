//! Process management module.
//!
//! Handles registry detection and launching of external tools and the
//! target runtime.
//!
//! # Invocation model
//!
//! Every child process is described by a [`LaunchCommand`] (program plus
//! argument list) and run through a [`CommandRunner`]. Nothing is ever
//! passed through a shell, so paths containing spaces need no quoting.
//!
//! # Example
//!
//! ```rust,no_run
//! use orep_launcher::process::{CommandRunner, LaunchCommand, SystemRunner};
//!
//! let result = SystemRunner.run(&LaunchCommand::new("java").arg("-version"))?;
//! println!("{}", result.combined());
//! # Ok::<(), std::io::Error>(())
//! ```

mod command;
mod detection;
mod launcher;

pub use command::{CommandRunner, LaunchCommand, LaunchResult, SystemRunner};
pub use detection::{ProcessLister, ProcessRecord, RegistryMatcher, RegistryProbe, RegistryStatus};
pub use launcher::{ExecutableResolver, LaunchShape, ProcessLauncher};
