//! End-to-end export runs against a Maven-layout repository on disk.

use std::path::{Path, PathBuf};

use manifest_exporter::core::hashing::md5_bytes;
use manifest_exporter::core::maven::MavenArtifact;
use manifest_exporter::core::verify::verify_libraries;
use manifest_exporter::{
    DependencyDescriptor, DependencyManifest, ExportTask, LocalRepositoryResolver,
    ManifestExporter,
};

struct Repo {
    dir: tempfile::TempDir,
}

impl Repo {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn put(&self, coord: &str, bytes: &[u8]) -> PathBuf {
        let artifact = MavenArtifact::parse(coord).unwrap();
        let path = self.root().join(artifact.local_path());
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    /// Jar whose content is its own coordinate, plus a POM with `deps`.
    fn module(&self, coord: &str, deps: &[&str]) {
        self.put(coord, coord.as_bytes());
        let artifact = MavenArtifact::parse(coord).unwrap();
        let mut pom = format!(
            "<project><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version>",
            artifact.group_id, artifact.artifact_id, artifact.version
        );
        if !deps.is_empty() {
            pom.push_str("<dependencies>");
            for dep in deps {
                let dep = MavenArtifact::parse(dep).unwrap();
                pom.push_str(&format!(
                    "<dependency><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version></dependency>",
                    dep.group_id, dep.artifact_id, dep.version
                ));
            }
            pom.push_str("</dependencies>");
        }
        pom.push_str("</project>");
        self.put(&artifact.pom().to_string(), pom.as_bytes());
    }

    fn exporter(&self) -> ManifestExporter<LocalRepositoryResolver> {
        ManifestExporter::new(LocalRepositoryResolver::new(vec![self.root().to_path_buf()]))
    }
}

fn descriptor(coord: &str) -> DependencyDescriptor {
    let a = MavenArtifact::parse(coord).unwrap();
    DependencyDescriptor {
        group: a.group_id,
        module: a.artifact_id,
        version: a.version,
        md5: md5_bytes(coord.as_bytes()),
    }
}

#[test]
fn single_library_is_listed_with_its_digest() {
    let repo = Repo::new();
    repo.module("com.example:foo:1.0", &[]);
    let out = repo.root().join("out/libraries.json");

    let task = ExportTask::new(vec!["com.example:foo:1.0".into()], &out);
    repo.exporter().export(&task).unwrap();

    let written = DependencyManifest::read(&out).unwrap();
    assert_eq!(written.dependencies, vec![descriptor("com.example:foo:1.0")]);
}

#[test]
fn exclusion_matches_group_and_module_at_any_version() {
    let repo = Repo::new();
    repo.module("com.example:foo:1.0", &[]);
    repo.module("com.example:installer:1.0", &["com.example:foo:2.0"]);
    repo.module("com.example:foo:2.0", &[]);
    let out = repo.root().join("libraries.json");

    let task = ExportTask::new(vec!["com.example:foo:1.0".into()], &out)
        .with_excludes(vec!["com.example:installer:1.0".into()]);
    let manifest = repo.exporter().export(&task).unwrap();

    assert!(manifest.is_empty());
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({ "dependencies": [] }));
}

#[test]
fn transitive_modules_of_the_exclude_set_are_removed() {
    let repo = Repo::new();
    repo.module(
        "org.spongepowered:vanilla-launch:1.0",
        &["cpw.mods:modlauncher:8.0", "org.spongepowered:mixin:0.8"],
    );
    repo.module("cpw.mods:modlauncher:8.0", &["net.sf.jopt-simple:jopt-simple:5.0"]);
    repo.module("net.sf.jopt-simple:jopt-simple:5.0", &[]);
    repo.module("org.spongepowered:mixin:0.8", &[]);
    repo.module("org.spongepowered:installer:1.0", &["cpw.mods:modlauncher:8.0"]);

    let task = ExportTask::new(
        vec!["org.spongepowered:vanilla-launch:1.0".into()],
        repo.root().join("libraries.json"),
    )
    .with_excludes(vec!["org.spongepowered:installer:1.0".into()]);
    let manifest = repo.exporter().generate(&task).unwrap();

    let modules: Vec<_> = manifest
        .dependencies
        .iter()
        .map(|d| d.module.as_str())
        .collect();
    assert_eq!(modules, vec!["vanilla-launch", "mixin"]);
}

#[test]
fn diamond_dependency_is_listed_once() {
    let repo = Repo::new();
    repo.module("g:left:1", &["g:shared:1"]);
    repo.module("g:right:1", &["g:shared:1"]);
    repo.module("g:shared:1", &[]);

    let task = ExportTask::new(
        vec!["g:left:1".into(), "g:right:1".into()],
        repo.root().join("libraries.json"),
    );
    let manifest = repo.exporter().generate(&task).unwrap();

    let coords: Vec<_> = manifest.dependencies.iter().map(|d| d.coordinate()).collect();
    assert_eq!(coords, vec!["g:left:1", "g:shared:1", "g:right:1"]);
}

#[test]
fn own_api_module_and_disallowed_classifiers_are_skipped() {
    let repo = Repo::new();
    repo.module(
        "org.spongepowered:spongevanilla:1.0",
        &["org.spongepowered:SpongeAPI:8.0", "cpw.mods:modlauncher:8.0"],
    );
    repo.module("org.spongepowered:SpongeAPI:8.0", &[]);
    repo.module("cpw.mods:modlauncher:8.0", &[]);
    repo.put("cpw.mods:grossjava9hacks:1.3:service", b"service jar");
    repo.put("cpw.mods:grossjava9hacks:1.3:sources", b"sources jar");

    let task = ExportTask::new(
        vec![
            "org.spongepowered:spongevanilla:1.0".into(),
            "cpw.mods:grossjava9hacks:1.3:service".into(),
            "cpw.mods:grossjava9hacks:1.3:sources".into(),
        ],
        repo.root().join("libraries.json"),
    )
    .allow_classifier("service");
    let manifest = repo.exporter().generate(&task).unwrap();

    let coords: Vec<_> = manifest.dependencies.iter().map(|d| d.coordinate()).collect();
    assert_eq!(
        coords,
        vec![
            "org.spongepowered:spongevanilla:1.0",
            "cpw.mods:modlauncher:8.0",
            "cpw.mods:grossjava9hacks:1.3",
        ]
    );
    assert_eq!(manifest.dependencies[2].md5, md5_bytes(b"service jar"));
}

#[test]
fn repeated_exports_are_byte_identical() {
    let repo = Repo::new();
    repo.module("g:a:1", &["g:b:1", "g:c:1"]);
    repo.module("g:b:1", &["g:c:1"]);
    repo.module("g:c:1", &[]);
    let out = repo.root().join("libraries.json");
    let task = ExportTask::new(vec!["g:a:1".into()], &out);

    repo.exporter().export(&task).unwrap();
    let first = std::fs::read(&out).unwrap();
    repo.exporter().export(&task).unwrap();
    let second = std::fs::read(&out).unwrap();

    assert_eq!(first, second);
}

#[test]
fn recorded_digest_matches_independent_hash_and_verifies() {
    let repo = Repo::new();
    let jar = repo.put("com.example:blob:1.0", &vec![7u8; 10_000]);
    let task = ExportTask::new(
        vec!["com.example:blob:1.0".into()],
        repo.root().join("libraries.json"),
    );
    let manifest = repo.exporter().generate(&task).unwrap();

    let independent = md5_bytes(&std::fs::read(jar).unwrap());
    assert_eq!(manifest.dependencies[0].md5, independent);

    let report = verify_libraries(&manifest, repo.root()).unwrap();
    assert!(report.is_complete());
}

#[test]
fn unresolvable_dependency_leaves_no_output() {
    let repo = Repo::new();
    repo.module("g:a:1", &["g:missing:1"]);
    let out = repo.root().join("libraries.json");
    let task = ExportTask::new(vec!["g:a:1".into()], &out);

    let err = repo.exporter().export(&task).unwrap_err();
    assert!(err.to_string().contains("g:missing:1"));
    assert!(!out.exists());
}
