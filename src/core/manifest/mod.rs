mod exporter;
mod model;

pub use exporter::{select_artifacts, ManifestExporter};
pub use model::{DependencyDescriptor, DependencyManifest};
