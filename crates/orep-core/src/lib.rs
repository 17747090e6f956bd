//! OREP Launcher - launch orchestration for the OREP RMI object repository.
//!
//! This crate prepares and starts the repository's RMI server and client
//! processes. It does not implement any remote invocation itself; it checks
//! that the classes were compiled, looks for a running `rmiregistry`,
//! generates client stubs with `rmic`, assembles the classpath and codebase,
//! and runs the Java runtime with the result.
//!
//! # Example
//!
//! ```rust,no_run
//! use orep_launcher::platform::PsProcessLister;
//! use orep_launcher::process::SystemRunner;
//! use orep_launcher::{LauncherSettings, Orchestrator};
//!
//! fn main() -> orep_launcher::Result<()> {
//!     let settings = LauncherSettings::load(None)?;
//!     let lister = PsProcessLister::new(
//!         settings.registry.lister.clone(),
//!         settings.registry.lister_args.clone(),
//!     );
//!     let orchestrator = Orchestrator::new(&settings, &SystemRunner, &lister);
//!
//!     let report = orchestrator.run_server(&settings.server_plan()?)?;
//!     println!("{}", report.output());
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod classpath;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod stubs;

// Re-export commonly used types
pub use artifact::{check_artifact, ArtifactLocation, ClassName};
pub use classpath::{ClasspathSpec, CodebaseDescriptor};
pub use config::{LauncherSettings, ProcessSource};
pub use error::{LauncherError, Result};
pub use pipeline::{ClientPlan, LaunchReport, Orchestrator, Role, ServerPlan};
pub use process::{
    CommandRunner, LaunchCommand, LaunchResult, ProcessLister, ProcessRecord, RegistryStatus,
};
pub use stubs::StubGenerator;
