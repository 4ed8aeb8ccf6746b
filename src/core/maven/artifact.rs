use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::core::error::{ExporterError, ExporterResult};

/// Version-less library identity: `(group, module)`.
///
/// Exclusion matching works on this key only, so the same library supplied
/// elsewhere at any version counts as supplied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId {
    pub group: String,
    pub module: String,
}

impl ModuleId {
    pub fn new(group: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            module: module.into(),
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.module)
    }
}

/// Represents a fully parsed Maven coordinate.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
///   `groupId:artifactId:version:classifier@packaging`
///   `groupId:artifactId:version@packaging`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension / packaging type. Defaults to `"jar"`.
    pub packaging: String,
}

impl MavenArtifact {
    /// Parse a Maven coordinate string.
    ///
    /// # Examples
    /// ```
    /// use manifest_exporter::core::maven::MavenArtifact;
    ///
    /// let a = MavenArtifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
    /// assert_eq!(a.group_id, "net.sf.jopt-simple");
    /// ```
    pub fn parse(coord: &str) -> ExporterResult<Self> {
        let coord = coord.trim();
        let (coord_part, packaging_override) = match coord.rsplit_once('@') {
            Some((head, ext)) => (head, Some(ext)),
            None => (coord, None),
        };

        let parts: Vec<&str> = coord_part.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) || packaging_override == Some("") {
            return Err(ExporterError::InvalidMavenCoordinate(coord.to_string()));
        }

        let packaging = packaging_override.unwrap_or("jar").to_string();
        match parts.as_slice() {
            [group, artifact, version] => Ok(Self {
                group_id: group.to_string(),
                artifact_id: artifact.to_string(),
                version: version.to_string(),
                classifier: None,
                packaging,
            }),
            [group, artifact, version, classifier] => Ok(Self {
                group_id: group.to_string(),
                artifact_id: artifact.to_string(),
                version: version.to_string(),
                classifier: Some(classifier.to_string()),
                packaging,
            }),
            _ => Err(ExporterError::InvalidMavenCoordinate(coord.to_string())),
        }
    }

    pub fn module_id(&self) -> ModuleId {
        ModuleId::new(&self.group_id, &self.artifact_id)
    }

    /// Construct the group path portion (`net/sf/jopt-simple`).
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    /// Build the artifact filename.
    ///
    /// `artifactId-version[-classifier].packaging`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, c, self.packaging
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.packaging),
        }
    }

    /// Construct the full URL for this artifact under the given repository base.
    ///
    /// Template:
    /// `<repo>/<group_path>/<artifact_id>/<version>/<filename>`
    pub fn url(&self, repo_base: &str) -> String {
        let base = repo_base.trim_end_matches('/');
        format!(
            "{}/{}/{}/{}/{}",
            base,
            self.group_path(),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }

    /// Path relative to a repository root, in Maven's local layout:
    /// `<group_path>/<artifact_id>/<version>/<filename>`
    pub fn local_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        for segment in self.group_id.split('.') {
            path.push(segment);
        }
        path.join(&self.artifact_id)
            .join(&self.version)
            .join(self.filename())
    }

    /// Return a new artifact with packaging changed (e.g. to `"pom"`).
    pub fn with_packaging(&self, packaging: &str) -> Self {
        let mut clone = self.clone();
        clone.packaging = packaging.to_string();
        clone
    }

    /// The same module at another version, keeping classifier and packaging.
    pub fn with_version(&self, version: &str) -> Self {
        let mut clone = self.clone();
        clone.version = version.to_string();
        clone
    }

    /// The POM describing this artifact. POMs never carry a classifier.
    pub fn pom(&self) -> Self {
        let mut clone = self.with_packaging("pom");
        clone.classifier = None;
        clone
    }

    /// Check if this artifact is a POM-only artifact.
    pub fn is_pom(&self) -> bool {
        self.packaging == "pom"
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.classifier {
            Some(c) => write!(
                f,
                "{}:{}:{}:{}@{}",
                self.group_id, self.artifact_id, self.version, c, self.packaging
            ),
            None => write!(
                f,
                "{}:{}:{}@{}",
                self.group_id, self.artifact_id, self.version, self.packaging
            ),
        }
    }
}
