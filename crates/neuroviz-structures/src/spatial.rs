// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Spatial types for the neuron graph.

A layer's output tensor is addressed two ways: by flat unit index (the order
activations arrive in from the inference collaborator) and by a 3-axis
(height, width, depth) coordinate (the order the renderer lays neurons out
in). [`to_index3d`] and [`to_flat_index`] convert between the two given the
layer's [`TensorShape`].
*/

use crate::NeurovizDataError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Output shape of a layer with the batch dimension omitted.
///
/// Holds 1 to 3 trailing dimensions: `[units]` for flat layers, `[h, w]` for
/// single-channel spatial layers, `[h, w, channels]` for multi-channel ones.
/// Every dimension must be non-zero and fit in `u16` so that coordinates pack
/// into [`NeuronId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct TensorShape(Vec<u32>);

impl TensorShape {
    /// Create a shape from its trailing dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if the rank is not 1..=3, any dimension is zero, or a
    /// dimension exceeds `u16::MAX`.
    pub fn new(dims: &[u32]) -> Result<Self, NeurovizDataError> {
        if dims.is_empty() || dims.len() > 3 {
            return Err(NeurovizDataError::BadParameters(format!(
                "shape must have 1 to 3 dimensions, got {}",
                dims.len()
            )));
        }
        for &dim in dims {
            if dim == 0 {
                return Err(NeurovizDataError::BadParameters(
                    "shape dimensions must be non-zero".to_string(),
                ));
            }
            if dim > u16::MAX as u32 {
                return Err(NeurovizDataError::BadParameters(format!(
                    "shape dimension {} exceeds the coordinate limit of {}",
                    dim,
                    u16::MAX
                )));
            }
        }
        Ok(Self(dims.to_vec()))
    }

    /// Number of dimensions (1 to 3), batch omitted.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// The raw dimension list.
    pub fn dims(&self) -> &[u32] {
        &self.0
    }

    /// Total number of scalar units in the tensor.
    pub fn unit_count(&self) -> u32 {
        self.0.iter().product()
    }

    /// The (height, width, depth) extents, missing dimensions defaulting to 1.
    pub fn hwd(&self) -> (u32, u32, u32) {
        (
            self.0[0],
            self.0.get(1).copied().unwrap_or(1),
            self.0.get(2).copied().unwrap_or(1),
        )
    }

    /// The channel extent: the trailing dimension for rank-3 shapes, 1 otherwise.
    ///
    /// This is the group count used for channel partitioning; rank 1 and 2
    /// shapes have no channel axis and form a single group.
    pub fn channel_count(&self) -> u32 {
        if self.0.len() >= 3 {
            self.0[self.0.len() - 1]
        } else {
            1
        }
    }

    /// Whether the shape has spatial (height and width) axes.
    pub fn is_spatial(&self) -> bool {
        self.0.len() >= 2
    }
}

impl TryFrom<Vec<u32>> for TensorShape {
    type Error = NeurovizDataError;

    fn try_from(dims: Vec<u32>) -> Result<Self, Self::Error> {
        TensorShape::new(&dims)
    }
}

impl From<TensorShape> for Vec<u32> {
    fn from(shape: TensorShape) -> Self {
        shape.0
    }
}

/// 3-axis coordinate of a unit within its layer's output tensor.
///
/// For 1-D layers, width and depth are 1 by convention (the unit index maps
/// onto the height axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Index3D {
    pub height: u16,
    pub width: u16,
    pub depth: u16,
}

impl Index3D {
    pub fn new(height: u16, width: u16, depth: u16) -> Self {
        Self {
            height,
            width,
            depth,
        }
    }
}

impl fmt::Display for Index3D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.height, self.width, self.depth)
    }
}

/// Packed neuron identifier: owning layer index plus 3-axis position.
///
/// This is the sole cross-reference mechanism between layers. Ids are cheap
/// value types, unique within a graph, and stable across rebinds of the same
/// stateless graph, so consumers may diff by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NeuronId {
    pub layer: u16,
    pub position: Index3D,
}

impl NeuronId {
    pub fn new(layer: u16, position: Index3D) -> Self {
        Self { layer, position }
    }
}

impl fmt::Display for NeuronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Neuron({}@{})", self.layer, self.position)
    }
}

/// Decode a flat unit index into its 3-axis coordinate.
///
/// Depth varies fastest, then width, then height, matching the activation
/// array ordering delivered by the inference collaborator.
///
/// Unchecked: `flat_index` must be below `shape.unit_count()`. Violating this
/// is a caller bug, caught by tests rather than runtime guards.
pub fn to_index3d(flat_index: u32, shape: &TensorShape) -> Index3D {
    let (_, w, d) = shape.hwd();
    Index3D {
        height: (flat_index / (d * w)) as u16,
        width: ((flat_index / d) % w) as u16,
        depth: (flat_index % d) as u16,
    }
}

/// Encode a 3-axis coordinate back into a flat unit index.
///
/// Inverse of [`to_index3d`]: `to_flat_index(to_index3d(i, s), s) == i` for
/// every valid `i`. Unchecked, same caller contract as [`to_index3d`].
pub fn to_flat_index(index: Index3D, shape: &TensorShape) -> u32 {
    let (_, w, d) = shape.hwd();
    (index.height as u32 * w + index.width as u32) * d + index.depth as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_validation() {
        assert!(TensorShape::new(&[10]).is_ok());
        assert!(TensorShape::new(&[28, 28]).is_ok());
        assert!(TensorShape::new(&[28, 28, 3]).is_ok());
        assert!(TensorShape::new(&[]).is_err());
        assert!(TensorShape::new(&[1, 2, 3, 4]).is_err());
        assert!(TensorShape::new(&[28, 0, 3]).is_err());
        assert!(TensorShape::new(&[70_000]).is_err());
    }

    #[test]
    fn test_unit_and_channel_counts() {
        let flat = TensorShape::new(&[10]).unwrap();
        assert_eq!(flat.unit_count(), 10);
        assert_eq!(flat.channel_count(), 1);
        assert_eq!(flat.hwd(), (10, 1, 1));

        let spatial = TensorShape::new(&[26, 26, 2]).unwrap();
        assert_eq!(spatial.unit_count(), 26 * 26 * 2);
        assert_eq!(spatial.channel_count(), 2);
        assert_eq!(spatial.hwd(), (26, 26, 2));
    }

    #[test]
    fn test_index_decode_order() {
        // Depth varies fastest, then width, then height.
        let shape = TensorShape::new(&[2, 3, 4]).unwrap();
        assert_eq!(to_index3d(0, &shape), Index3D::new(0, 0, 0));
        assert_eq!(to_index3d(1, &shape), Index3D::new(0, 0, 1));
        assert_eq!(to_index3d(4, &shape), Index3D::new(0, 1, 0));
        assert_eq!(to_index3d(12, &shape), Index3D::new(1, 0, 0));
        assert_eq!(to_index3d(23, &shape), Index3D::new(1, 2, 3));
    }

    #[test]
    fn test_round_trip_1d_2d_3d() {
        for dims in [&[16][..], &[5, 7][..], &[4, 6, 3][..]] {
            let shape = TensorShape::new(dims).unwrap();
            for i in 0..shape.unit_count() {
                let index = to_index3d(i, &shape);
                assert_eq!(to_flat_index(index, &shape), i, "shape {:?}", dims);
            }
        }
    }

    #[test]
    fn test_neuron_id_display() {
        let id = NeuronId::new(2, Index3D::new(3, 1, 0));
        assert_eq!(id.to_string(), "Neuron(2@3:1:0)");
    }
}
