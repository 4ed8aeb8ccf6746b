use std::collections::HashMap;

use quick_xml::de::from_str;
use serde::Deserialize;

use super::artifact::{MavenArtifact, ModuleId};
use crate::core::error::{ExporterError, ExporterResult};

/// Scopes that end up on a runtime classpath.
const RUNTIME_SCOPES: [&str; 2] = ["compile", "runtime"];

/// Minimal POM model – only the fields we care about for dependency resolution.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PomDocument {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub artifact_id: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub packaging: Option<String>,
    #[serde(default)]
    pub parent: Option<PomParent>,
    #[serde(default)]
    pub properties: Option<HashMap<String, String>>,
    #[serde(default)]
    pub dependencies: Option<PomDependencies>,
    #[serde(default)]
    pub dependency_management: Option<PomDependencyManagement>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PomParent {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PomDependencies {
    #[serde(default, rename = "dependency")]
    pub items: Vec<PomDependency>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PomDependencyManagement {
    #[serde(default)]
    pub dependencies: Option<PomDependencies>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PomDependency {
    pub group_id: String,
    pub artifact_id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub optional: Option<bool>,
    #[serde(rename = "type", default)]
    pub dep_type: Option<String>,
    #[serde(default)]
    pub classifier: Option<String>,
    #[serde(default)]
    pub exclusions: Option<PomExclusions>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct PomExclusions {
    #[serde(default, rename = "exclusion")]
    pub items: Vec<PomExclusion>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PomExclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl PomExclusion {
    /// Whether this exclusion covers `id`. Maven allows `*` wildcards.
    pub fn matches(&self, id: &ModuleId) -> bool {
        (self.group_id == "*" || self.group_id == id.group)
            && (self.artifact_id == "*" || self.artifact_id == id.module)
    }
}

impl PomDependency {
    pub fn exclusions(&self) -> &[PomExclusion] {
        self.exclusions
            .as_ref()
            .map(|e| e.items.as_slice())
            .unwrap_or(&[])
    }
}

impl PomDocument {
    /// Parse a POM XML string into a `PomDocument`.
    pub fn parse(xml: &str) -> ExporterResult<Self> {
        from_str(xml).map_err(|e| ExporterError::PomParse(e.to_string()))
    }

    /// Group id, falling back to the parent's.
    pub fn effective_group_id(&self) -> Option<&str> {
        self.group_id
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.group_id.as_str()))
    }

    /// Version, falling back to the parent's.
    pub fn effective_version(&self) -> Option<&str> {
        self.version
            .as_deref()
            .or_else(|| self.parent.as_ref().map(|p| p.version.as_str()))
    }

    /// Fold an already-loaded parent POM into this one.
    ///
    /// Child properties and managed versions take precedence; inherited
    /// dependencies are appended after the child's own.
    pub fn inherit(&mut self, parent: &PomDocument) {
        if let Some(parent_props) = &parent.properties {
            let props = self.properties.get_or_insert_with(HashMap::new);
            for (key, value) in parent_props {
                props.entry(key.clone()).or_insert_with(|| value.clone());
            }
        }

        let parent_managed = parent.managed_dependencies();
        if !parent_managed.is_empty() {
            let dm = self
                .dependency_management
                .get_or_insert_with(PomDependencyManagement::default);
            let deps = dm.dependencies.get_or_insert_with(PomDependencies::default);
            deps.items.extend(parent_managed.iter().cloned());
        }

        if let Some(parent_deps) = &parent.dependencies {
            let deps = self.dependencies.get_or_insert_with(PomDependencies::default);
            deps.items.extend(parent_deps.items.iter().cloned());
        }
    }

    fn managed_dependencies(&self) -> &[PomDependency] {
        self.dependency_management
            .as_ref()
            .and_then(|dm| dm.dependencies.as_ref())
            .map(|d| d.items.as_slice())
            .unwrap_or(&[])
    }

    fn lookup_property(&self, key: &str) -> Option<String> {
        match key {
            "project.version" | "pom.version" | "version" => {
                self.effective_version().map(str::to_string)
            }
            "project.groupId" | "pom.groupId" | "groupId" => {
                self.effective_group_id().map(str::to_string)
            }
            "project.artifactId" | "pom.artifactId" | "artifactId" => self.artifact_id.clone(),
            "project.parent.version" | "parent.version" => {
                self.parent.as_ref().map(|p| p.version.clone())
            }
            "project.parent.groupId" | "parent.groupId" => {
                self.parent.as_ref().map(|p| p.group_id.clone())
            }
            other => self
                .properties
                .as_ref()
                .and_then(|props| props.get(other).cloned()),
        }
    }

    /// Replace `${...}` placeholders with project values and properties.
    ///
    /// Unknown placeholders are left as written. Property values may refer to
    /// other properties; expansion stops after a fixed depth to break cycles.
    pub fn interpolate(&self, value: &str) -> String {
        let mut current = value.to_string();
        for _ in 0..8 {
            let next = self.interpolate_once(&current);
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    fn interpolate_once(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let key = &after[..end];
                    match self.lookup_property(key) {
                        Some(v) => out.push_str(&v),
                        None => {
                            out.push_str("${");
                            out.push_str(key);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Resolve a dependency version using `dependencyManagement` if explicit version is absent.
    pub fn resolve_version(&self, dep: &PomDependency) -> Option<String> {
        let group = self.interpolate(&dep.group_id);
        let raw = dep.version.clone().or_else(|| {
            self.managed_dependencies()
                .iter()
                .find(|managed| {
                    self.interpolate(&managed.group_id) == group
                        && managed.artifact_id == dep.artifact_id
                })
                .and_then(|managed| managed.version.clone())
        })?;

        let version = self.interpolate(&raw);
        if version.contains("${") {
            return None;
        }
        // Soft ranges such as `[1.0]` pin a single version.
        Some(
            version
                .trim_start_matches('[')
                .trim_end_matches(']')
                .trim()
                .to_string(),
        )
    }

    /// Dependencies that belong on a runtime classpath: `compile` and
    /// `runtime` scope, excluding optional ones.
    pub fn runtime_dependencies(&self) -> Vec<PomDependency> {
        let deps = match &self.dependencies {
            Some(d) => &d.items,
            None => return vec![],
        };

        deps.iter()
            .filter(|d| {
                let scope = d.scope.as_deref().unwrap_or("compile");
                let optional = d.optional.unwrap_or(false);
                RUNTIME_SCOPES.contains(&scope) && !optional
            })
            .cloned()
            .collect()
    }

    /// Turn a declared dependency into a concrete coordinate, if its version
    /// can be determined.
    pub fn dependency_artifact(&self, dep: &PomDependency) -> Option<MavenArtifact> {
        let version = self.resolve_version(dep)?;
        let packaging = match dep.dep_type.as_deref() {
            None | Some("bundle") => "jar".to_string(),
            Some(other) => other.to_string(),
        };
        Some(MavenArtifact {
            group_id: self.interpolate(&dep.group_id),
            artifact_id: self.interpolate(&dep.artifact_id),
            version,
            classifier: dep.classifier.as_ref().map(|c| self.interpolate(c)),
            packaging,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_pom() {
        let xml = r#"
        <project>
            <groupId>com.example</groupId>
            <artifactId>demo</artifactId>
            <version>1.0</version>
            <packaging>pom</packaging>
            <dependencies>
                <dependency>
                    <groupId>org.ow2.asm</groupId>
                    <artifactId>asm</artifactId>
                    <version>9.0</version>
                </dependency>
                <dependency>
                    <groupId>junit</groupId>
                    <artifactId>junit</artifactId>
                    <version>4.13</version>
                    <scope>test</scope>
                </dependency>
                <dependency>
                    <groupId>org.slf4j</groupId>
                    <artifactId>slf4j-simple</artifactId>
                    <version>1.7.30</version>
                    <scope>runtime</scope>
                </dependency>
                <dependency>
                    <groupId>com.google.code.findbugs</groupId>
                    <artifactId>jsr305</artifactId>
                    <version>3.0.2</version>
                    <optional>true</optional>
                </dependency>
            </dependencies>
        </project>
        "#;
        let pom = PomDocument::parse(xml).unwrap();
        assert_eq!(pom.group_id.as_deref(), Some("com.example"));
        let runtime = pom.runtime_dependencies();
        let names: Vec<_> = runtime.iter().map(|d| d.artifact_id.as_str()).collect();
        assert_eq!(names, vec!["asm", "slf4j-simple"]);
    }

    #[test]
    fn project_version_placeholder_is_interpolated() {
        let xml = r#"
        <project>
            <parent>
                <groupId>org.spongepowered</groupId>
                <artifactId>parent</artifactId>
                <version>2.0</version>
            </parent>
            <artifactId>child</artifactId>
            <dependencies>
                <dependency>
                    <groupId>${project.groupId}</groupId>
                    <artifactId>sibling</artifactId>
                    <version>${project.version}</version>
                </dependency>
            </dependencies>
        </project>
        "#;
        let pom = PomDocument::parse(xml).unwrap();
        let dep = &pom.runtime_dependencies()[0];
        let artifact = pom.dependency_artifact(dep).unwrap();
        assert_eq!(artifact.to_string(), "org.spongepowered:sibling:2.0@jar");
    }

    #[test]
    fn managed_version_fills_missing_version() {
        let xml = r#"
        <project>
            <groupId>com.example</groupId>
            <artifactId>demo</artifactId>
            <version>1.0</version>
            <dependencyManagement>
                <dependencies>
                    <dependency>
                        <groupId>com.google.guava</groupId>
                        <artifactId>guava</artifactId>
                        <version>[21.0]</version>
                    </dependency>
                </dependencies>
            </dependencyManagement>
            <dependencies>
                <dependency>
                    <groupId>com.google.guava</groupId>
                    <artifactId>guava</artifactId>
                </dependency>
            </dependencies>
        </project>
        "#;
        let pom = PomDocument::parse(xml).unwrap();
        let dep = &pom.runtime_dependencies()[0];
        assert_eq!(pom.resolve_version(dep).as_deref(), Some("21.0"));
    }

    #[test]
    fn unresolvable_placeholder_yields_no_version() {
        let pom = PomDocument::default();
        let dep = PomDependency {
            group_id: "a".into(),
            artifact_id: "b".into(),
            version: Some("${missing.version}".into()),
            ..Default::default()
        };
        assert_eq!(pom.resolve_version(&dep), None);
    }

    #[test]
    fn inherit_keeps_child_properties_first() {
        let mut child = PomDocument::default();
        child.properties = Some(HashMap::from([("asm.version".to_string(), "9.1".to_string())]));
        let mut parent = PomDocument::default();
        parent.properties = Some(HashMap::from([
            ("asm.version".to_string(), "8.0".to_string()),
            ("guava.version".to_string(), "21.0".to_string()),
        ]));

        child.inherit(&parent);

        assert_eq!(child.interpolate("${asm.version}"), "9.1");
        assert_eq!(child.interpolate("${guava.version}"), "21.0");
    }

    #[test]
    fn wildcard_exclusion_matches_everything_in_group() {
        let exclusion = PomExclusion {
            group_id: "org.ow2.asm".into(),
            artifact_id: "*".into(),
        };
        assert!(exclusion.matches(&ModuleId::new("org.ow2.asm", "asm-tree")));
        assert!(!exclusion.matches(&ModuleId::new("org.ow2", "asm")));
    }
}
