/// Stable identity of a geometry layer within one globe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u64);

/// A producer of render-ready geometry. Layers are rebuilt wholesale from
/// their inputs; snapshots are never patched in place.
pub trait Layer {
    fn id(&self) -> LayerId;

    /// Short label used in logs.
    fn label(&self) -> &'static str;
}
