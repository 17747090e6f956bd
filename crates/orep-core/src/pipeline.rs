//! Server and client launch pipelines.
//!
//! Each pipeline is a straight sequence of blocking stages. The first
//! failing stage aborts the run; nothing is launched unless every earlier
//! stage succeeded.
//!
//! - **server**: precondition → registry probe → codebase → resolve runtime → launch
//! - **client**: precondition → stub generation → resolve runtime → launch

use crate::artifact::{check_artifact, ClassName};
use crate::classpath::{ClasspathSpec, CodebaseDescriptor};
use crate::config::LauncherSettings;
use crate::error::Result;
use crate::platform;
use crate::process::{
    CommandRunner, ExecutableResolver, LaunchCommand, LaunchResult, LaunchShape, ProcessLauncher,
    ProcessLister, RegistryMatcher, RegistryProbe, RegistryStatus,
};
use crate::stubs::StubGenerator;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

/// Everything the server pipeline needs.
#[derive(Debug, Clone)]
pub struct ServerPlan {
    pub classes_dir: PathBuf,
    pub class_name: ClassName,
    pub classpath: ClasspathSpec,
    pub hostname: Option<String>,
}

/// Everything the client pipeline needs.
#[derive(Debug, Clone)]
pub struct ClientPlan {
    pub classes_dir: PathBuf,
    pub class_name: ClassName,
    pub classpath: ClasspathSpec,
}

/// Which side of the service was launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Server,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Server => f.write_str("server"),
            Role::Client => f.write_str("client"),
        }
    }
}

/// Outcome of a completed pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchReport {
    pub role: Role,
    pub class_name: ClassName,
    /// Registry state seen before a server launch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryStatus>,
    /// Rendered command line, for display only.
    pub command: String,
    #[serde(flatten)]
    pub result: LaunchResult,
}

impl LaunchReport {
    fn new(
        role: Role,
        class_name: &ClassName,
        registry: Option<RegistryStatus>,
        command: &LaunchCommand,
        result: LaunchResult,
    ) -> Self {
        Self {
            role,
            class_name: class_name.clone(),
            registry,
            command: command.to_string(),
            result,
        }
    }

    /// Child output to relay to the operator.
    pub fn output(&self) -> String {
        self.result.combined()
    }
}

/// Runs the launch pipelines against a command runner and process lister.
pub struct Orchestrator<'a> {
    runner: &'a dyn CommandRunner,
    lister: &'a dyn ProcessLister,
    matcher: RegistryMatcher,
    java: String,
    stub_compiler: String,
    resolver: String,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator using the tool names and registry probe
    /// parameters from `settings`.
    pub fn new(
        settings: &LauncherSettings,
        runner: &'a dyn CommandRunner,
        lister: &'a dyn ProcessLister,
    ) -> Self {
        let matcher = RegistryMatcher::new(
            settings.registry.token.clone(),
            settings.registry.self_marker.clone(),
        )
        .with_self_pid(platform::current_pid());

        Self {
            runner,
            lister,
            matcher,
            java: settings.java.clone(),
            stub_compiler: settings.stub_compiler.clone(),
            resolver: settings.resolver.clone(),
        }
    }

    /// Check, probe and launch the server.
    pub fn run_server(&self, plan: &ServerPlan) -> Result<LaunchReport> {
        info!("Preparing server {}", plan.class_name);
        check_artifact(&plan.classes_dir, &plan.class_name)?;

        let registry = RegistryProbe::new(self.lister, self.matcher.clone()).ensure_usable()?;

        let codebase = CodebaseDescriptor::new(&plan.classes_dir)?;
        info!("Codebase: {}", codebase.url());
        debug!("Serving classes from {}", codebase.classes_dir().display());

        debug!("Server classpath: {:?}", plan.classpath.entries());
        let java = self.resolve_runtime()?;
        let command = ProcessLauncher::build_command(
            &java,
            &plan.classpath,
            &plan.class_name,
            &LaunchShape::Server {
                codebase: &codebase,
                hostname: plan.hostname.as_deref(),
            },
        );
        let result = ProcessLauncher::new(self.runner).launch(&command)?;

        Ok(LaunchReport::new(
            Role::Server,
            &plan.class_name,
            Some(registry),
            &command,
            result,
        ))
    }

    /// Check, generate stubs for and launch the client.
    pub fn run_client(&self, plan: &ClientPlan) -> Result<LaunchReport> {
        info!("Preparing client {}", plan.class_name);
        check_artifact(&plan.classes_dir, &plan.class_name)?;

        StubGenerator::new(self.runner, &self.stub_compiler).generate(
            &plan.class_name,
            &plan.classpath,
            &plan.classes_dir,
        )?;

        debug!("Client classpath: {:?}", plan.classpath.entries());
        let java = self.resolve_runtime()?;
        let command = ProcessLauncher::build_command(
            &java,
            &plan.classpath,
            &plan.class_name,
            &LaunchShape::Client,
        );
        let result = ProcessLauncher::new(self.runner).launch(&command)?;

        Ok(LaunchReport::new(
            Role::Client,
            &plan.class_name,
            None,
            &command,
            result,
        ))
    }

    /// Report the registry state without launching anything.
    ///
    /// Unlike the server pipeline, an ambiguous listing is returned as a
    /// status rather than an error.
    pub fn probe_registry(&self) -> Result<RegistryStatus> {
        RegistryProbe::new(self.lister, self.matcher.clone()).status()
    }

    fn resolve_runtime(&self) -> Result<PathBuf> {
        ExecutableResolver::new(self.runner, &self.resolver).resolve(&self.java)
    }
}
