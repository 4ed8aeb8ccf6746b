use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::graph::{ResolvedArtifact, ResolvedComponent, ResolvedGraph};
use super::DependencyResolver;
use crate::core::error::{ExporterError, ExporterResult};
use crate::core::maven::{compare_versions, MavenArtifact, ModuleId, PomDocument, PomExclusion};

/// Upper bound on re-walks while version selections settle.
const MAX_SELECTION_ROUNDS: usize = 64;
/// Upper bound on `<parent>` chain length.
const MAX_PARENT_DEPTH: usize = 16;

/// What to do when the graph requests one module at several versions.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStrategy {
    /// Select the highest requested version.
    #[default]
    Newest,
    /// Abort resolution.
    Fail,
}

/// `~/.m2/repository`, if a home directory is known.
pub fn default_local_repository() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".m2").join("repository"))
}

/// Resolves coordinates transitively against Maven-layout directories on disk.
///
/// Never touches the network: everything it reports must already be present
/// under one of its repositories.
pub struct LocalRepositoryResolver {
    /// Ordered list of repository roots to search.
    repositories: Vec<PathBuf>,
    strategy: ConflictStrategy,
}

impl LocalRepositoryResolver {
    pub fn new(repositories: Vec<PathBuf>) -> Self {
        Self {
            repositories,
            strategy: ConflictStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// First repository holding `artifact`'s file.
    fn locate(&self, artifact: &MavenArtifact) -> Option<PathBuf> {
        let relative = artifact.local_path();
        self.repositories
            .iter()
            .map(|repo| repo.join(&relative))
            .find(|candidate| candidate.is_file())
    }
}

impl DependencyResolver for LocalRepositoryResolver {
    fn resolve(&self, declared: &[MavenArtifact]) -> ExporterResult<ResolvedGraph> {
        let mut session = Session {
            resolver: self,
            poms: HashMap::new(),
            loading: HashSet::new(),
        };
        let mut selected: HashMap<ModuleId, String> = HashMap::new();

        for round in 0..MAX_SELECTION_ROUNDS {
            let walk = session.walk(declared, &selected)?;
            let next = self.select_versions(&walk.requests)?;
            if next == selected {
                debug!(
                    "Resolved {} declared dependencies into {} components after {} round(s)",
                    declared.len(),
                    walk.graph.components().len(),
                    round + 1
                );
                return self.finalize(walk);
            }
            selected = next;
        }

        Err(ExporterError::Other(format!(
            "Version selection did not settle after {} rounds",
            MAX_SELECTION_ROUNDS
        )))
    }
}

impl LocalRepositoryResolver {
    /// Pick one version per module from the requests of a single walk.
    ///
    /// Only the current walk counts: versions asked for solely by components
    /// that have since been upgraded away drop out of the selection.
    fn select_versions(
        &self,
        requests: &[(ModuleId, String)],
    ) -> ExporterResult<HashMap<ModuleId, String>> {
        let mut selection: HashMap<ModuleId, String> = HashMap::new();
        for (id, requested) in requests {
            match selection.get(id) {
                None => {
                    selection.insert(id.clone(), requested.clone());
                }
                Some(current) if current == requested => {}
                Some(current) => {
                    if self.strategy == ConflictStrategy::Fail {
                        return Err(ExporterError::VersionConflict {
                            module: id.to_string(),
                            first: current.clone(),
                            second: requested.clone(),
                        });
                    }
                    if compare_versions(requested, current) == Ordering::Greater {
                        debug!("{} upgraded from {} to {}", id, current, requested);
                        selection.insert(id.clone(), requested.clone());
                    }
                }
            }
        }
        Ok(selection)
    }

    /// Attach files to every component of a settled walk.
    fn finalize(&self, walk: Walk) -> ExporterResult<ResolvedGraph> {
        let Walk {
            mut graph,
            variants,
            pom_only,
            unresolved,
            ..
        } = walk;

        if let Some((dependency, required_by)) = unresolved.into_iter().next() {
            return Err(ExporterError::UnresolvedVersion {
                dependency,
                required_by,
            });
        }

        for (idx, requested) in variants.iter().enumerate() {
            if pom_only[idx] {
                continue;
            }
            for variant in requested.iter().filter(|v| !v.is_pom()) {
                let file = self.locate(variant).ok_or_else(|| ExporterError::UnresolvedArtifact {
                    coordinate: variant.to_string(),
                    searched: self.repositories.len(),
                })?;
                graph
                    .component_mut(idx)
                    .artifacts
                    .push(ResolvedArtifact::new(variant, file));
            }
        }

        Ok(graph)
    }
}

/// One traversal of the graph under a fixed version selection.
struct Walk {
    graph: ResolvedGraph,
    /// Per component: every artifact variant requested, at the component's version.
    variants: Vec<Vec<MavenArtifact>>,
    /// Per component: the POM declares `pom` packaging, so there is no jar.
    pom_only: Vec<bool>,
    /// Per component: exclusions shared by every path that reached it so far.
    exclusions: Vec<Vec<PomExclusion>>,
    /// Per component: waiting in `queue`.
    queued: Vec<bool>,
    requests: Vec<(ModuleId, String)>,
    /// Dependencies whose version could not be determined, with the POM requiring them.
    unresolved: Vec<(String, String)>,
    index: HashMap<ModuleId, usize>,
    queue: VecDeque<usize>,
}

impl Walk {
    fn new() -> Self {
        Self {
            graph: ResolvedGraph::new(),
            variants: Vec::new(),
            pom_only: Vec::new(),
            exclusions: Vec::new(),
            queued: Vec::new(),
            requests: Vec::new(),
            unresolved: Vec::new(),
            index: HashMap::new(),
            queue: VecDeque::new(),
        }
    }

    /// Register a request for `artifact` reached with `exclusions`, returning
    /// its component index.
    ///
    /// A component already seen keeps only the exclusions this path shares;
    /// if that drops any, its dependencies are walked again.
    fn intern(
        &mut self,
        artifact: &MavenArtifact,
        selected: &HashMap<ModuleId, String>,
        exclusions: Vec<PomExclusion>,
    ) -> usize {
        let id = artifact.module_id();
        self.requests.push((id.clone(), artifact.version.clone()));

        if let Some(&idx) = self.index.get(&id) {
            let variant = artifact.with_version(&self.graph.components()[idx].version);
            if !self.variants[idx].contains(&variant) {
                self.variants[idx].push(variant);
            }

            let before = self.exclusions[idx].len();
            self.exclusions[idx].retain(|e| exclusions.contains(e));
            if self.exclusions[idx].len() < before {
                debug!("Exclusions below {} narrowed by another path", id);
                self.enqueue(idx);
            }
            return idx;
        }

        let version = selected
            .get(&id)
            .cloned()
            .unwrap_or_else(|| artifact.version.clone());
        let idx = self
            .graph
            .add_component(ResolvedComponent::new(id.clone(), &version));
        self.variants.push(vec![artifact.with_version(&version)]);
        self.pom_only.push(false);
        self.exclusions.push(exclusions);
        self.queued.push(false);
        self.index.insert(id, idx);
        self.enqueue(idx);
        idx
    }

    fn enqueue(&mut self, idx: usize) {
        if !self.queued[idx] {
            self.queued[idx] = true;
            self.queue.push_back(idx);
        }
    }
}

/// Per-call state: effective POMs are cached across selection rounds.
struct Session<'a> {
    resolver: &'a LocalRepositoryResolver,
    poms: HashMap<String, Option<PomDocument>>,
    /// POMs whose parent chain is being loaded, to stop `<parent>` cycles.
    loading: HashSet<String>,
}

impl Session<'_> {
    fn walk(
        &mut self,
        declared: &[MavenArtifact],
        selected: &HashMap<ModuleId, String>,
    ) -> ExporterResult<Walk> {
        let mut walk = Walk::new();

        for artifact in declared {
            let idx = walk.intern(artifact, selected, Vec::new());
            walk.graph.add_root(idx);
        }

        while let Some(idx) = walk.queue.pop_front() {
            walk.queued[idx] = false;
            let coordinate = walk.variants[idx][0].clone();
            let Some(pom) = self.effective_pom(&coordinate.pom(), 0)? else {
                debug!("No POM for {}, treating as leaf", coordinate);
                continue;
            };

            if pom.packaging.as_deref() == Some("pom") && !coordinate.is_pom() {
                walk.pom_only[idx] = true;
            }

            let exclusions = walk.exclusions[idx].clone();
            for dep in pom.runtime_dependencies() {
                let dep_id = ModuleId::new(
                    pom.interpolate(&dep.group_id),
                    pom.interpolate(&dep.artifact_id),
                );
                if exclusions.iter().any(|e| e.matches(&dep_id)) {
                    debug!("{} excluded below {}", dep_id, coordinate);
                    continue;
                }

                let Some(child) = pom.dependency_artifact(&dep) else {
                    debug!("No version for {} required by {}", dep_id, coordinate);
                    walk.unresolved.push((dep_id.to_string(), coordinate.to_string()));
                    continue;
                };

                let mut child_exclusions = exclusions.clone();
                for exclusion in dep.exclusions() {
                    if !child_exclusions.contains(exclusion) {
                        child_exclusions.push(exclusion.clone());
                    }
                }
                let child_idx = walk.intern(&child, selected, child_exclusions);
                walk.graph.add_edge(idx, child_idx);
            }
        }

        Ok(walk)
    }

    /// Load a POM with its parent chain folded in. `None` when no repository has it.
    fn effective_pom(
        &mut self,
        pom_artifact: &MavenArtifact,
        depth: usize,
    ) -> ExporterResult<Option<PomDocument>> {
        let key = pom_artifact.to_string();
        if let Some(cached) = self.poms.get(&key) {
            return Ok(cached.clone());
        }
        if self.loading.contains(&key) {
            warn!("{} is its own ancestor, ignoring the cycle", pom_artifact);
            return Ok(None);
        }

        self.loading.insert(key.clone());
        let loaded = match self.resolver.locate(pom_artifact) {
            Some(path) => self.load_pom(&path, pom_artifact, depth),
            None => Ok(None),
        };
        self.loading.remove(&key);
        let loaded = loaded?;

        self.poms.insert(key, loaded.clone());
        Ok(loaded)
    }

    fn load_pom(
        &mut self,
        path: &Path,
        pom_artifact: &MavenArtifact,
        depth: usize,
    ) -> ExporterResult<Option<PomDocument>> {
        let xml = std::fs::read_to_string(path).map_err(|e| ExporterError::io(path, e))?;
        let mut pom = match PomDocument::parse(&xml) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to parse POM for {}: {}", pom_artifact, e);
                return Ok(None);
            }
        };

        if let Some(parent) = pom.parent.clone() {
            if depth >= MAX_PARENT_DEPTH {
                warn!("Parent chain of {} is too deep, ignoring the rest", pom_artifact);
            } else {
                let parent_artifact = MavenArtifact {
                    group_id: parent.group_id,
                    artifact_id: parent.artifact_id,
                    version: parent.version,
                    classifier: None,
                    packaging: "pom".to_string(),
                };
                match self.effective_pom(&parent_artifact, depth + 1)? {
                    Some(parent_pom) => pom.inherit(&parent_pom),
                    None => debug!("Parent POM {} not available locally", parent_artifact),
                }
            }
        }

        Ok(Some(pom))
    }
}
