use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{ExporterError, ExporterResult};
use crate::core::maven::MavenArtifact;

/// A single library an installer has to provide.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyDescriptor {
    pub group: String,
    pub module: String,
    /// Resolved version.
    pub version: String,
    /// Lowercase hex MD5 of the artifact file.
    pub md5: String,
}

impl DependencyDescriptor {
    /// The unclassified jar this descriptor names, for locating it in a Maven layout.
    ///
    /// Descriptors do not record a classifier, so an entry exported from a
    /// classified artifact still maps to the plain jar here.
    pub fn artifact(&self) -> MavenArtifact {
        MavenArtifact {
            group_id: self.group.clone(),
            artifact_id: self.module.clone(),
            version: self.version.clone(),
            classifier: None,
            packaging: "jar".to_string(),
        }
    }

    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group, self.module, self.version)
    }
}

/// Every library to fetch at runtime.
///
/// Transitive dependencies are not traversed by the consumer, so this lists
/// direct and transitive libraries alike.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyManifest {
    pub dependencies: Vec<DependencyDescriptor>,
}

impl DependencyManifest {
    pub fn new(dependencies: Vec<DependencyDescriptor>) -> Self {
        Self { dependencies }
    }

    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Pretty-printed JSON, as written to disk.
    pub fn to_json(&self) -> ExporterResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize fully, then write in one step, replacing any existing file.
    pub fn write(&self, path: &Path) -> ExporterResult<()> {
        let json = self.to_json()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ExporterError::io(parent, e))?;
        }

        info!("Writing to {:?}", path);
        std::fs::write(path, json).map_err(|e| ExporterError::io(path, e))
    }

    pub fn read(path: &Path) -> ExporterResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| ExporterError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DependencyManifest {
        DependencyManifest::new(vec![DependencyDescriptor {
            group: "com.example".into(),
            module: "foo".into(),
            version: "1.0".into(),
            md5: "d41d8cd98f00b204e9800998ecf8427e".into(),
        }])
    }

    #[test]
    fn serialized_shape() {
        let value: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "dependencies": [{
                    "group": "com.example",
                    "module": "foo",
                    "version": "1.0",
                    "md5": "d41d8cd98f00b204e9800998ecf8427e"
                }]
            })
        );
    }

    #[test]
    fn output_is_pretty_printed() {
        let json = sample().to_json().unwrap();
        assert!(json.starts_with("{\n  \"dependencies\": [\n"));
    }

    #[test]
    fn write_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated/installer/libraries.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale content that is longer than the new manifest ".repeat(20))
            .unwrap();

        sample().write(&path).unwrap();

        assert_eq!(DependencyManifest::read(&path).unwrap(), sample());
    }

    #[test]
    fn descriptor_maps_to_plain_jar() {
        let descriptor = &sample().dependencies[0];
        assert_eq!(
            descriptor.artifact().local_path(),
            std::path::PathBuf::from("com/example/foo/1.0/foo-1.0.jar")
        );
        assert_eq!(descriptor.coordinate(), "com.example:foo:1.0");
    }
}
