//! Per-sample metadata attached to every element of a batch.

use serde::{Deserialize, Serialize};

use super::layout::TensorLayout;

/// Bookkeeping carried by each sample: where its data came from and how its
/// dimensions are laid out.
///
/// Producers populate the fields when a batch is assembled; downstream stages
/// treat them as read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMeta {
    source_info: String,
    layout: TensorLayout,
}

impl SampleMeta {
    /// Constructs metadata with both fields populated.
    pub fn new(source_info: impl Into<String>, layout: TensorLayout) -> Self {
        SampleMeta {
            source_info: source_info.into(),
            layout,
        }
    }

    /// Provenance string of the sample, typically the path it was read from.
    /// Arbitrary length, no terminator semantics.
    pub fn source_info(&self) -> &str {
        &self.source_info
    }

    /// Records the provenance string.
    pub fn set_source_info(&mut self, source_info: impl Into<String>) {
        self.source_info = source_info.into();
    }

    /// Dimension layout of the sample's data.
    pub fn layout(&self) -> &TensorLayout {
        &self.layout
    }

    /// Records the dimension layout.
    pub fn set_layout(&mut self, layout: TensorLayout) {
        self.layout = layout;
    }
}
