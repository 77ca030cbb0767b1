pub mod client;
pub mod model;
pub mod profile;

pub use client::{ManifestClient, ManifestSource};
pub use model::{FileManifest, ManifestEntry};
pub use profile::{ArgumentGroup, Arguments, Artifact, LaunchProfile, Library};
