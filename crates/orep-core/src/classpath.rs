//! Classpath and codebase construction.

use crate::config::ArtifactConfig;
use crate::error::{LauncherError, Result};
use crate::platform::{self, CLASSPATH_SEPARATOR};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Ordered classpath entries.
///
/// Order is search order. Entries are never deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClasspathSpec {
    entries: Vec<String>,
}

impl ClasspathSpec {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Classpath with a single directory entry.
    pub fn from_dir(dir: &Path) -> Self {
        Self::new([dir.to_string_lossy().into_owned()])
    }

    /// Append entries, keeping their order.
    pub fn with_entries<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.entries
            .extend(entries.into_iter().map(|e| e.as_ref().to_string()));
        self
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Entries joined with the platform classpath separator.
    pub fn joined(&self) -> String {
        self.entries.join(&CLASSPATH_SEPARATOR.to_string())
    }
}

impl fmt::Display for ClasspathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// Absolute classes directory plus the file URL advertised as the RMI
/// codebase.
///
/// The URL always ends in exactly one `/` so class loaders resolve nested
/// package paths under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodebaseDescriptor {
    classes_dir: PathBuf,
    url: String,
}

impl CodebaseDescriptor {
    pub fn new(classes_dir: &Path) -> Result<Self> {
        let classes_dir = platform::absolutize(classes_dir)?;
        let url = Url::from_directory_path(&classes_dir).map_err(|()| LauncherError::Config {
            message: format!(
                "cannot express {} as a file URL",
                classes_dir.display()
            ),
        })?;

        Ok(Self {
            classes_dir,
            url: url.to_string(),
        })
    }

    /// Absolute classes directory.
    pub fn classes_dir(&self) -> &Path {
        &self.classes_dir
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `-Djava.rmi.server.codebase=<url>` option for the target runtime.
    pub fn property_option(&self) -> String {
        format!("-D{}={}", ArtifactConfig::CODEBASE_PROPERTY, self.url)
    }
}
