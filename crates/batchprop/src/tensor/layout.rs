//! Axis-label layout descriptors attached to sample metadata.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Ordered axis labels describing how one sample's dimensions are laid out,
/// one ASCII label per axis (e.g. `"HWC"` for an interleaved image).
///
/// Labels are stored inline; batches of typical rank never allocate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TensorLayout(SmallVec<[u8; 8]>);

impl TensorLayout {
    /// Constructs a layout from its axis labels.
    ///
    /// Panics if a label is not ASCII alphanumeric, keeping `as_str` total.
    pub fn new(labels: &str) -> Self {
        assert!(
            labels.bytes().all(|b| b.is_ascii_alphanumeric()),
            "layout labels must be ASCII alphanumeric: {labels:?}"
        );
        TensorLayout(SmallVec::from_slice(labels.as_bytes()))
    }

    /// Number of axes the layout describes.
    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no layout has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrows the raw label bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Borrows the labels as a string slice.
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.0).expect("layout labels are ASCII")
    }
}

impl From<&str> for TensorLayout {
    fn from(labels: &str) -> Self {
        TensorLayout::new(labels)
    }
}

impl fmt::Display for TensorLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TensorLayout {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TensorLayout {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let labels = String::deserialize(deserializer)?;
        if !labels.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(serde::de::Error::custom(format!(
                "layout labels must be ASCII alphanumeric: {labels:?}"
            )));
        }
        Ok(TensorLayout::new(&labels))
    }
}
