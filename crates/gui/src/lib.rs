// Library crate: exposes the headless core (assembly, text, export, generation)
// for the binary, integration tests and the headless export path.
// GUI-specific modules (app, ui, viewport rendering) remain in the binary crate.

pub mod build;
pub mod export;
pub mod fixtures;
pub mod generation;
pub mod harness;
pub mod state;
pub mod text;
pub mod units;
pub mod validation;

/// Subset of viewport types needed by build/text/export (MeshData, Aabb).
/// The camera and the preview painter stay in the binary crate.
pub mod viewport {
    pub mod mesh;
}
