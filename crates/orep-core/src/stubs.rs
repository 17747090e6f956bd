//! RMI stub generation.
//!
//! Runs the stub compiler (`rmic`) against a remote class so the client has
//! the network proxies it needs. Generated `.class` files land in the
//! destination directory and overwrite any previous run's output.

use crate::artifact::ClassName;
use crate::classpath::ClasspathSpec;
use crate::error::{LauncherError, Result};
use crate::platform;
use crate::process::{CommandRunner, LaunchCommand, LaunchResult};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stub compiler invocation.
pub struct StubGenerator<'a> {
    runner: &'a dyn CommandRunner,
    tool: PathBuf,
}

impl<'a> StubGenerator<'a> {
    pub fn new(runner: &'a dyn CommandRunner, tool: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            tool: tool.into(),
        }
    }

    /// `<tool> -classpath <cp> -d <absolute destination> <class>`.
    pub fn build_command(
        &self,
        class_name: &ClassName,
        classpath: &ClasspathSpec,
        destination: &Path,
    ) -> Result<LaunchCommand> {
        let destination = platform::absolutize(destination)?;
        Ok(LaunchCommand::new(&self.tool)
            .arg("-classpath")
            .arg(classpath.joined())
            .arg("-d")
            .arg(destination.to_string_lossy())
            .arg(class_name.as_str()))
    }

    /// Generate stubs for `class_name` into `destination`.
    ///
    /// Fails if the tool cannot be started or exits non-zero.
    pub fn generate(
        &self,
        class_name: &ClassName,
        classpath: &ClasspathSpec,
        destination: &Path,
    ) -> Result<LaunchResult> {
        let command = self.build_command(class_name, classpath, destination)?;
        info!("Generating stubs for {}", class_name);
        debug!("Stub compiler command: {}", command);

        let result = self
            .runner
            .run(&command)
            .map_err(|e| self.spawn_failure(class_name, e))?;

        if !result.success {
            let detail = result.combined();
            let detail = detail.trim();
            return Err(LauncherError::StubGeneration {
                class_name: class_name.to_string(),
                message: match (result.exit_code, detail.is_empty()) {
                    (Some(code), true) => {
                        format!("{} exited with code {}", self.tool.display(), code)
                    }
                    (Some(code), false) => {
                        format!("{} exited with code {}: {}", self.tool.display(), code, detail)
                    }
                    (None, _) => format!("{} was terminated by a signal", self.tool.display()),
                },
            });
        }

        let output = result.combined();
        if !output.trim().is_empty() {
            info!("{}", output.trim_end());
        }
        Ok(result)
    }

    fn spawn_failure(&self, class_name: &ClassName, err: io::Error) -> LauncherError {
        let message = if err.kind() == io::ErrorKind::NotFound {
            format!("{} not found", self.tool.display())
        } else {
            format!("failed to run {}: {}", self.tool.display(), err)
        };
        LauncherError::StubGeneration {
            class_name: class_name.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    struct FakeRmic {
        outcome: Option<LaunchResult>,
        calls: RefCell<Vec<LaunchCommand>>,
    }

    impl CommandRunner for FakeRmic {
        fn run(&self, command: &LaunchCommand) -> io::Result<LaunchResult> {
            self.calls.borrow_mut().push(command.clone());
            self.outcome
                .clone()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    fn class_name() -> ClassName {
        ClassName::parse("net.manniche.orep.client.RMIObjectRepositoryClient").unwrap()
    }

    #[test]
    fn test_command_shape() {
        let temp_dir = TempDir::new().unwrap();
        let runner = FakeRmic {
            outcome: None,
            calls: RefCell::new(Vec::new()),
        };
        let generator = StubGenerator::new(&runner, "rmic");
        let classpath = ClasspathSpec::new(["classes", "lib"]);

        let command = generator
            .build_command(&class_name(), &classpath, temp_dir.path())
            .unwrap();

        assert_eq!(command.program, PathBuf::from("rmic"));
        assert_eq!(command.args[0], "-classpath");
        assert_eq!(command.args[1], classpath.joined());
        assert_eq!(command.args[2], "-d");
        assert!(Path::new(&command.args[3]).is_absolute());
        assert_eq!(command.args[4], class_name().as_str());
    }

    #[test]
    fn test_destination_is_absolute_for_relative_input() {
        let runner = FakeRmic {
            outcome: None,
            calls: RefCell::new(Vec::new()),
        };
        let generator = StubGenerator::new(&runner, "rmic");
        let command = generator
            .build_command(
                &class_name(),
                &ClasspathSpec::default(),
                Path::new("build/classes"),
            )
            .unwrap();

        let destination = PathBuf::from(&command.args[3]);
        assert!(destination.is_absolute());
        assert!(destination.ends_with("build/classes"));
    }

    #[test]
    fn test_missing_tool() {
        let runner = FakeRmic {
            outcome: None,
            calls: RefCell::new(Vec::new()),
        };
        let generator = StubGenerator::new(&runner, "rmic");

        match generator.generate(&class_name(), &ClasspathSpec::default(), Path::new(".")) {
            Err(LauncherError::StubGeneration { message, .. }) => {
                assert_eq!(message, "rmic not found");
            }
            other => panic!("expected stub generation error, got {other:?}"),
        }
    }

    #[test]
    fn test_nonzero_exit() {
        let runner = FakeRmic {
            outcome: Some(LaunchResult {
                exit_code: Some(1),
                success: false,
                stdout: String::new(),
                stderr: "error: Class RMIObjectRepositoryClient not found.\n".into(),
            }),
            calls: RefCell::new(Vec::new()),
        };
        let generator = StubGenerator::new(&runner, "rmic");

        match generator.generate(&class_name(), &ClasspathSpec::default(), Path::new(".")) {
            Err(LauncherError::StubGeneration { message, .. }) => {
                assert!(message.contains("exited with code 1"));
                assert!(message.contains("not found"));
            }
            other => panic!("expected stub generation error, got {other:?}"),
        }
    }

    #[test]
    fn test_success_runs_once() {
        let runner = FakeRmic {
            outcome: Some(LaunchResult {
                exit_code: Some(0),
                success: true,
                ..Default::default()
            }),
            calls: RefCell::new(Vec::new()),
        };
        let generator = StubGenerator::new(&runner, "rmic");

        let result = generator
            .generate(&class_name(), &ClasspathSpec::default(), Path::new("."))
            .unwrap();
        assert!(result.success);
        assert_eq!(runner.calls.borrow().len(), 1);
    }
}
