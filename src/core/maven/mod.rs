mod artifact;
mod pom;
mod version;

pub use artifact::{MavenArtifact, ModuleId};
pub use pom::{PomDependency, PomDocument, PomExclusion};
pub use version::compare_versions;

/// Remote repositories the installer falls back to when none are given.
pub const SPONGE_MAVEN: &str = "https://repo.spongepowered.org/repository/maven-public";
pub const MAVEN_CENTRAL: &str = "https://repo1.maven.org/maven2";
