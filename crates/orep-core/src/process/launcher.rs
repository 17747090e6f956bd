//! Target runtime launching.

use super::command::{CommandRunner, LaunchCommand, LaunchResult};
use crate::artifact::ClassName;
use crate::classpath::{ClasspathSpec, CodebaseDescriptor};
use crate::config::ArtifactConfig;
use crate::error::{LauncherError, Result};
use crate::platform;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Resolves bare executable names to absolute paths with a "which"-style
/// lookup.
pub struct ExecutableResolver<'a> {
    runner: &'a dyn CommandRunner,
    resolver: String,
}

impl<'a> ExecutableResolver<'a> {
    pub fn new(runner: &'a dyn CommandRunner, resolver: impl Into<String>) -> Self {
        Self {
            runner,
            resolver: resolver.into(),
        }
    }

    /// Resolve `name`.
    ///
    /// Names that already contain a path separator are returned unchanged.
    /// Otherwise the resolver is run and its trimmed output is the path;
    /// blank output, a failed lookup or a resolver that cannot be spawned all
    /// mean the executable is not available.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let not_found = || LauncherError::ExecutableNotFound {
            name: name.to_string(),
        };

        if name.trim().is_empty() {
            return Err(not_found());
        }
        if platform::has_path_separator(name) {
            debug!("Using configured executable path {}", name);
            return Ok(PathBuf::from(name));
        }

        let lookup = LaunchCommand::new(&self.resolver).arg(name);
        let result = match self.runner.run(&lookup) {
            Ok(result) => result,
            Err(e) => {
                warn!("Failed to run {}: {}", self.resolver, e);
                return Err(not_found());
            }
        };

        let resolved = result.stdout.lines().next().unwrap_or("").trim();
        if !result.success || resolved.is_empty() {
            return Err(not_found());
        }

        debug!("Resolved {} to {}", name, resolved);
        Ok(PathBuf::from(resolved))
    }
}

/// The two invocation shapes of the target runtime.
#[derive(Debug, Clone)]
pub enum LaunchShape<'a> {
    /// Server: advertises a codebase and optionally a hostname.
    Server {
        codebase: &'a CodebaseDescriptor,
        hostname: Option<&'a str>,
    },
    /// Client: classpath only.
    Client,
}

/// Launches the target runtime for one role.
pub struct ProcessLauncher<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> ProcessLauncher<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Build the command line for `shape`.
    ///
    /// `<executable> -cp <classpath> [-D<property>=<value>]... <class>`
    pub fn build_command(
        executable: &Path,
        classpath: &ClasspathSpec,
        class_name: &ClassName,
        shape: &LaunchShape<'_>,
    ) -> LaunchCommand {
        let mut command = LaunchCommand::new(executable)
            .arg("-cp")
            .arg(classpath.joined());

        if let LaunchShape::Server { codebase, hostname } = shape {
            command = command.arg(codebase.property_option());
            if let Some(host) = hostname {
                command =
                    command.arg(format!("-D{}={}", ArtifactConfig::HOSTNAME_PROPERTY, host));
            }
        }

        command.arg(class_name.as_str())
    }

    /// Run `command` once and wait for it to finish.
    ///
    /// A non-zero exit is logged and returned, not treated as an error.
    pub fn launch(&self, command: &LaunchCommand) -> Result<LaunchResult> {
        if command.program.as_os_str().is_empty() {
            return Err(LauncherError::ExecutableNotFound {
                name: String::new(),
            });
        }

        info!("Launching {}", command);

        let result = self
            .runner
            .run(command)
            .map_err(|e| LauncherError::Launch {
                program: command.program.clone(),
                source: e,
            })?;

        match result.exit_code {
            Some(0) => info!("{} exited successfully", command.program.display()),
            Some(code) => warn!("{} exited with code {}", command.program.display(), code),
            None => warn!("{} was terminated by a signal", command.program.display()),
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;

    /// Replays canned results and records every command.
    struct ScriptedRunner {
        result: io::Result<LaunchResult>,
        calls: RefCell<Vec<LaunchCommand>>,
    }

    impl ScriptedRunner {
        fn ok(stdout: &str, success: bool) -> Self {
            Self {
                result: Ok(LaunchResult {
                    exit_code: Some(if success { 0 } else { 1 }),
                    success,
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                }),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn spawn_error() -> Self {
            Self {
                result: Err(io::Error::from(io::ErrorKind::NotFound)),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, command: &LaunchCommand) -> io::Result<LaunchResult> {
            self.calls.borrow_mut().push(command.clone());
            match &self.result {
                Ok(result) => Ok(result.clone()),
                Err(e) => Err(io::Error::from(e.kind())),
            }
        }
    }

    #[test]
    fn test_resolve_via_which() {
        let runner = ScriptedRunner::ok("/usr/bin/java\n", true);
        let resolver = ExecutableResolver::new(&runner, "which");

        assert_eq!(resolver.resolve("java").unwrap(), PathBuf::from("/usr/bin/java"));
        let calls = runner.calls.borrow();
        assert_eq!(calls[0].program, PathBuf::from("which"));
        assert_eq!(calls[0].args, vec!["java"]);
    }

    #[test]
    fn test_resolve_blank_output() {
        let runner = ScriptedRunner::ok("  \n", true);
        let resolver = ExecutableResolver::new(&runner, "which");
        assert!(matches!(
            resolver.resolve("java"),
            Err(LauncherError::ExecutableNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_failed_lookup() {
        let runner = ScriptedRunner::ok("", false);
        let resolver = ExecutableResolver::new(&runner, "which");
        assert!(resolver.resolve("java").is_err());

        let runner = ScriptedRunner::spawn_error();
        let resolver = ExecutableResolver::new(&runner, "which");
        assert!(matches!(
            resolver.resolve("java"),
            Err(LauncherError::ExecutableNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_explicit_path_skips_lookup() {
        let runner = ScriptedRunner::spawn_error();
        let resolver = ExecutableResolver::new(&runner, "which");

        let path = resolver.resolve("/opt/jdk/bin/java").unwrap();
        assert_eq!(path, PathBuf::from("/opt/jdk/bin/java"));
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_client_shape_has_no_properties() {
        let class_name = ClassName::parse("net.example.Client").unwrap();
        let classpath = ClasspathSpec::new(["classes", "lib"]);
        let command = ProcessLauncher::build_command(
            Path::new("/usr/bin/java"),
            &classpath,
            &class_name,
            &LaunchShape::Client,
        );

        assert_eq!(command.args[0], "-cp");
        assert_eq!(command.args[1], classpath.joined());
        assert!(!command.args.iter().any(|a| a.starts_with("-D")));
        assert_eq!(command.args.last().unwrap(), "net.example.Client");
    }

    #[test]
    fn test_server_shape_properties() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let codebase = CodebaseDescriptor::new(temp_dir.path()).unwrap();
        let class_name = ClassName::parse("net.example.Server").unwrap();
        let command = ProcessLauncher::build_command(
            Path::new("/usr/bin/java"),
            &ClasspathSpec::from_dir(temp_dir.path()),
            &class_name,
            &LaunchShape::Server {
                codebase: &codebase,
                hostname: Some("192.168.1.74"),
            },
        );

        assert_eq!(command.args[2], codebase.property_option());
        assert_eq!(command.args[3], "-Djava.rmi.server.hostname=192.168.1.74");
        assert_eq!(command.args.last().unwrap(), "net.example.Server");
    }

    #[test]
    fn test_launch_relays_nonzero_exit() {
        let runner = ScriptedRunner::ok("Exception in thread main", false);
        let launcher = ProcessLauncher::new(&runner);

        let result = launcher.launch(&LaunchCommand::new("/usr/bin/java")).unwrap();
        assert!(!result.success);
        assert_eq!(result.stdout, "Exception in thread main");
        assert_eq!(runner.calls.borrow().len(), 1);
    }

    #[test]
    fn test_launch_spawn_failure() {
        let runner = ScriptedRunner::spawn_error();
        let launcher = ProcessLauncher::new(&runner);

        match launcher.launch(&LaunchCommand::new("/usr/bin/java")) {
            Err(LauncherError::Launch { program, source }) => {
                assert_eq!(program, PathBuf::from("/usr/bin/java"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected launch error, got {other:?}"),
        }
    }

    #[test]
    fn test_launch_empty_executable() {
        let runner = ScriptedRunner::ok("", true);
        let launcher = ProcessLauncher::new(&runner);
        assert!(matches!(
            launcher.launch(&LaunchCommand::new("")),
            Err(LauncherError::ExecutableNotFound { .. })
        ));
        assert!(runner.calls.borrow().is_empty());
    }
}
