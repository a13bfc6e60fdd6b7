//! The core crate for NeuroViz. Defines the basic data types shared by the graph
//! derivation pipeline: tensor shapes, 3-axis indices, packed neuron identifiers,
//! and raw layer descriptors as supplied by the model collaborator.

mod error;
mod layer;
mod spatial;

pub use error::NeurovizDataError;
pub use layer::{layer_stack_from_json, LayerDescriptor};
pub use spatial::{to_flat_index, to_index3d, Index3D, NeuronId, TensorShape};
