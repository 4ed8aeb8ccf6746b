use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use crate::core::maven::{MavenArtifact, ModuleId};

/// One concrete, locally available artifact produced by resolution.
///
/// Built once from a coordinate and a file; later stages read these fields
/// directly instead of re-inspecting resolver metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedArtifact {
    pub group: String,
    pub module: String,
    /// Version selected by conflict resolution, not the requested one.
    pub version: String,
    pub classifier: Option<String>,
    pub extension: String,
    pub file: PathBuf,
}

impl ResolvedArtifact {
    pub fn new(artifact: &MavenArtifact, file: PathBuf) -> Self {
        Self {
            group: artifact.group_id.clone(),
            module: artifact.artifact_id.clone(),
            version: artifact.version.clone(),
            classifier: artifact.classifier.clone().filter(|c| !c.is_empty()),
            extension: artifact.packaging.clone(),
            file,
        }
    }

    /// Classifier with "no classifier" spelled as the empty string.
    pub fn classifier_or_empty(&self) -> &str {
        self.classifier.as_deref().unwrap_or("")
    }

    pub fn module_id(&self) -> ModuleId {
        ModuleId::new(&self.group, &self.module)
    }
}

/// A selected module version with its artifacts and outgoing edges.
#[derive(Debug, Clone)]
pub struct ResolvedComponent {
    pub id: ModuleId,
    pub version: String,
    pub artifacts: Vec<ResolvedArtifact>,
    /// Indices into the owning graph's component list.
    pub dependencies: Vec<usize>,
}

impl ResolvedComponent {
    pub fn new(id: ModuleId, version: impl Into<String>) -> Self {
        Self {
            id,
            version: version.into(),
            artifacts: Vec::new(),
            dependencies: Vec::new(),
        }
    }
}

/// Result of resolving a set of declared dependencies.
#[derive(Debug, Clone, Default)]
pub struct ResolvedGraph {
    components: Vec<ResolvedComponent>,
    /// Components for the declared (first-level) dependencies, in declaration order.
    roots: Vec<usize>,
}

impl ResolvedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&mut self, component: ResolvedComponent) -> usize {
        self.components.push(component);
        self.components.len() - 1
    }

    pub fn add_root(&mut self, idx: usize) {
        if !self.roots.contains(&idx) {
            self.roots.push(idx);
        }
    }

    pub fn add_edge(&mut self, from: usize, to: usize) {
        let deps = &mut self.components[from].dependencies;
        if !deps.contains(&to) {
            deps.push(to);
        }
    }

    pub fn components(&self) -> &[ResolvedComponent] {
        &self.components
    }

    pub fn component_mut(&mut self, idx: usize) -> &mut ResolvedComponent {
        &mut self.components[idx]
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Depth-first walk of one root's subtree, each component once.
    fn subtree(&self, root: usize) -> Vec<usize> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            if !seen.insert(idx) {
                continue;
            }
            order.push(idx);
            // Reverse so children are visited in declaration order.
            stack.extend(self.components[idx].dependencies.iter().rev().copied());
        }
        order
    }

    /// Every artifact of every first-level dependency's subtree.
    ///
    /// Subtrees are walked independently, so an artifact reachable from
    /// several roots is yielded once per root.
    pub fn first_level_artifacts(&self) -> Vec<&ResolvedArtifact> {
        self.roots
            .iter()
            .flat_map(|&root| self.subtree(root))
            .flat_map(|idx| self.components[idx].artifacts.iter())
            .collect()
    }

    /// Transitive closure of `(group, module)` identities reachable from the roots.
    pub fn module_ids(&self) -> BTreeSet<ModuleId> {
        self.roots
            .iter()
            .flat_map(|&root| self.subtree(root))
            .map(|idx| self.components[idx].id.clone())
            .collect()
    }
}
