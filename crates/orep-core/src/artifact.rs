//! Build precondition checks.
//!
//! Maps fully-qualified class names onto compiled `.class` files and
//! verifies they exist before anything is launched.

use crate::config::ArtifactConfig;
use crate::error::{LauncherError, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A validated fully-qualified class name such as `net.example.Server`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassName(String);

impl ClassName {
    /// Parse and validate a dotted identifier sequence.
    pub fn parse(name: &str) -> Result<Self> {
        let invalid = |reason: &str| LauncherError::InvalidClassName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }

        for segment in name.split('.') {
            let mut chars = segment.chars();
            match chars.next() {
                None => return Err(invalid("empty segment")),
                Some(c) if !is_identifier_start(c) => {
                    return Err(invalid(&format!(
                        "segment {segment:?} has an invalid first character"
                    )));
                }
                Some(_) => {}
            }
            if !chars.all(is_identifier_part) {
                return Err(invalid(&format!(
                    "segment {segment:?} contains an invalid character"
                )));
            }
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Package and class segments, outermost first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ClassName {
    type Err = LauncherError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ClassName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Location of a compiled class file under a classes directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLocation {
    path: PathBuf,
}

impl ArtifactLocation {
    /// `<classes_dir>/<package path>/<Class>.class`.
    pub fn new(classes_dir: impl AsRef<Path>, class_name: &ClassName) -> Self {
        let mut path = classes_dir.as_ref().to_path_buf();
        let mut segments = class_name.segments().peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_some() {
                path.push(segment);
            } else {
                path.push(format!("{segment}{}", ArtifactConfig::CLASS_SUFFIX));
            }
        }
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the artifact is an existing regular file.
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Verify that the compiled class for `class_name` exists under `classes_dir`.
///
/// Returns the artifact location on success. The directory itself does not
/// need to exist; a missing directory simply means a missing artifact.
pub fn check_artifact(classes_dir: &Path, class_name: &ClassName) -> Result<ArtifactLocation> {
    let location = ArtifactLocation::new(classes_dir, class_name);
    if !location.exists() {
        return Err(LauncherError::Precondition {
            path: location.path().to_path_buf(),
        });
    }

    debug!("Found compiled artifact {}", location.path().display());
    Ok(location)
}
