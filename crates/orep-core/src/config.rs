//! Centralized configuration for the OREP launcher.
//!
//! Constant structs hold the built-in defaults. [`LauncherSettings`] is the
//! user-facing settings file, deserialized from JSON, and is turned into
//! per-role plans by [`LauncherSettings::server_plan`] and
//! [`LauncherSettings::client_plan`].

use crate::artifact::ClassName;
use crate::classpath::ClasspathSpec;
use crate::error::{LauncherError, Result};
use crate::pipeline::{ClientPlan, ServerPlan};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// External tool names.
pub struct ToolConfig;

impl ToolConfig {
    pub const JAVA: &'static str = "java";
    pub const STUB_COMPILER: &'static str = "rmic";
    pub const RESOLVER: &'static str = "which";
    pub const PROCESS_LISTER: &'static str = "ps";
    pub const PROCESS_LISTER_ARGS: &'static [&'static str] = &["ax"];
}

/// Registry probe defaults.
pub struct RegistryConfig;

impl RegistryConfig {
    pub const PROCESS_TOKEN: &'static str = "rmiregistry";
    pub const SELF_MARKER: &'static str = "grep rmiregistry";
}

/// Build artifact and runtime property defaults.
pub struct ArtifactConfig;

impl ArtifactConfig {
    pub const CLASS_SUFFIX: &'static str = ".class";
    pub const CLASSES_DIR: &'static str = "target/classes";
    pub const SERVER_CLASS: &'static str = "net.manniche.orep.server.rmi.RMIServer";
    pub const CLIENT_CLASS: &'static str = "net.manniche.orep.client.RMIObjectRepositoryClient";
    /// Entries the client classpath carries after the classes directory.
    pub const CLIENT_EXTRA_CLASSPATH: &'static [&'static str] = &["../"];
    pub const CODEBASE_PROPERTY: &'static str = "java.rmi.server.codebase";
    pub const HOSTNAME_PROPERTY: &'static str = "java.rmi.server.hostname";
}

/// Shared directory and file names.
pub struct PathsConfig;

impl PathsConfig {
    pub const CONFIG_DIR_NAME: &'static str = "orep";
    pub const SETTINGS_FILE_NAME: &'static str = "launcher.json";
}

/// Where the process table is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessSource {
    /// Scrape the text output of the process-listing tool.
    #[default]
    Ps,
    /// Query the OS process table through `sysinfo`.
    Sysinfo,
}

/// Registry probe settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Substring identifying the registry process.
    pub token: String,
    /// Substring identifying the scan's own entry in the listing.
    pub self_marker: String,
    /// Process-listing program.
    pub lister: String,
    /// Arguments passed to the process-listing program.
    pub lister_args: Vec<String>,
    pub source: ProcessSource,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            token: RegistryConfig::PROCESS_TOKEN.to_string(),
            self_marker: RegistryConfig::SELF_MARKER.to_string(),
            lister: ToolConfig::PROCESS_LISTER.to_string(),
            lister_args: ToolConfig::PROCESS_LISTER_ARGS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            source: ProcessSource::default(),
        }
    }
}

/// Server role settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub class_name: String,
    /// Overrides the shared classes directory for this role.
    pub classes_dir: Option<PathBuf>,
    /// Entries appended to the classpath after the classes directory.
    pub extra_classpath: Vec<String>,
    /// Value for `java.rmi.server.hostname`, if the server should advertise one.
    pub hostname: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            class_name: ArtifactConfig::SERVER_CLASS.to_string(),
            classes_dir: None,
            extra_classpath: Vec::new(),
            hostname: None,
        }
    }
}

/// Client role settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    pub class_name: String,
    pub classes_dir: Option<PathBuf>,
    pub extra_classpath: Vec<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            class_name: ArtifactConfig::CLIENT_CLASS.to_string(),
            classes_dir: None,
            extra_classpath: ArtifactConfig::CLIENT_EXTRA_CLASSPATH
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Launcher settings file contents.
///
/// Every field has a default, so an empty JSON object is a valid file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    /// Compiled classes directory shared by both roles.
    pub classes_dir: PathBuf,
    /// Target runtime executable, by name or path.
    pub java: String,
    /// Stub compiler executable, by name or path.
    pub stub_compiler: String,
    /// "which"-style resolver used for bare executable names.
    pub resolver: String,
    pub registry: RegistrySettings,
    pub server: ServerSettings,
    pub client: ClientSettings,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            classes_dir: PathBuf::from(ArtifactConfig::CLASSES_DIR),
            java: ToolConfig::JAVA.to_string(),
            stub_compiler: ToolConfig::STUB_COMPILER.to_string(),
            resolver: ToolConfig::RESOLVER.to_string(),
            registry: RegistrySettings::default(),
            server: ServerSettings::default(),
            client: ClientSettings::default(),
        }
    }
}

impl LauncherSettings {
    /// Load settings from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| LauncherError::io_with_path(e, path))?;
        let settings = serde_json::from_str(&raw)?;
        debug!("Loaded launcher settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from `path`, or from the default location, or fall back
    /// to built-in defaults when no file exists there.
    ///
    /// An explicitly given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(default) if default.is_file() => Self::from_file(&default),
            _ => {
                debug!("No launcher settings file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Default settings file location (`<config dir>/orep/launcher.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| {
            dir.join(PathsConfig::CONFIG_DIR_NAME)
                .join(PathsConfig::SETTINGS_FILE_NAME)
        })
    }

    /// Build the server plan.
    ///
    /// The classpath is the role's classes directory followed by any extra
    /// entries.
    pub fn server_plan(&self) -> Result<ServerPlan> {
        let classes_dir = self
            .server
            .classes_dir
            .clone()
            .unwrap_or_else(|| self.classes_dir.clone());
        let class_name = ClassName::parse(&self.server.class_name)?;
        let classpath =
            ClasspathSpec::from_dir(&classes_dir).with_entries(&self.server.extra_classpath);

        Ok(ServerPlan {
            classes_dir,
            class_name,
            classpath,
            hostname: self.server.hostname.clone(),
        })
    }

    /// Build the client plan.
    pub fn client_plan(&self) -> Result<ClientPlan> {
        let classes_dir = self
            .client
            .classes_dir
            .clone()
            .unwrap_or_else(|| self.classes_dir.clone());
        let class_name = ClassName::parse(&self.client.class_name)?;
        let classpath =
            ClasspathSpec::from_dir(&classes_dir).with_entries(&self.client.extra_classpath);

        Ok(ClientPlan {
            classes_dir,
            class_name,
            classpath,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_object_is_default() {
        let settings: LauncherSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, LauncherSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("launcher.json");
        fs::write(
            &path,
            r#"{
                "classes_dir": "build/classes",
                "registry": { "source": "sysinfo" },
                "client": { "extra_classpath": ["lib/xor.jar"] }
            }"#,
        )
        .unwrap();

        let settings = LauncherSettings::from_file(&path).unwrap();
        assert_eq!(settings.classes_dir, PathBuf::from("build/classes"));
        assert_eq!(settings.registry.source, ProcessSource::Sysinfo);
        assert_eq!(settings.registry.token, "rmiregistry");
        assert_eq!(settings.java, "java");
        assert_eq!(settings.client.class_name, ArtifactConfig::CLIENT_CLASS);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = LauncherSettings::load(Some(&temp_dir.path().join("nope.json")));
        assert!(matches!(result, Err(LauncherError::Io { .. })));
    }

    #[test]
    fn test_malformed_file_is_json_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("launcher.json");
        fs::write(&path, "{ not json").unwrap();

        let result = LauncherSettings::from_file(&path);
        assert!(matches!(result, Err(LauncherError::Json { .. })));
    }

    #[test]
    fn test_server_plan_classpath_order() {
        let mut settings = LauncherSettings::default();
        settings.classes_dir = PathBuf::from("classes");
        settings.server.extra_classpath = vec!["lib/a.jar".into(), "lib/b.jar".into()];

        let plan = settings.server_plan().unwrap();
        assert_eq!(
            plan.classpath.entries(),
            &["classes".to_string(), "lib/a.jar".into(), "lib/b.jar".into()]
        );
        assert_eq!(plan.class_name.as_str(), ArtifactConfig::SERVER_CLASS);
    }

    #[test]
    fn test_role_classes_dir_override() {
        let mut settings = LauncherSettings::default();
        settings.client.classes_dir = Some(PathBuf::from("build/classes"));

        let plan = settings.client_plan().unwrap();
        assert_eq!(plan.classes_dir, PathBuf::from("build/classes"));
        assert_eq!(
            plan.classpath.entries(),
            &["build/classes".to_string(), "../".into()]
        );
    }

    #[test]
    fn test_default_client_classpath_includes_parent_dir() {
        let settings = LauncherSettings::default();

        let client = settings.client_plan().unwrap();
        assert_eq!(
            client.classpath.entries(),
            &["target/classes".to_string(), "../".into()]
        );

        let server = settings.server_plan().unwrap();
        assert_eq!(server.classpath.entries(), &["target/classes".to_string()]);
    }

    #[test]
    fn test_invalid_class_name_in_settings() {
        let mut settings = LauncherSettings::default();
        settings.server.class_name = "net..Server".into();
        assert!(matches!(
            settings.server_plan(),
            Err(LauncherError::InvalidClassName { .. })
        ));
    }
}
