// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Raw layer descriptors (model representation).

Pure data definition - no business logic. Category resolution and graph
derivation live in neuroviz-graph.
*/

use crate::{NeurovizDataError, TensorShape};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One layer of the model as reported by the layer stack provider.
///
/// The category is a free-form tag ("Dense", "Conv2D", ...); the configuration
/// is a category-specific key/value map carried verbatim from the model
/// definition. Typed resolution happens downstream, so descriptors for layer
/// categories this crate has never heard of still deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDescriptor {
    /// Category tag, e.g. "Dense", "Conv2D", "MaxPooling2D"
    pub category: String,

    /// Category-specific configuration (kernel size, stride, units, filters, ...)
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,

    /// Output tensor shape, batch dimension omitted
    pub output_shape: TensorShape,

    /// Optional human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LayerDescriptor {
    /// Create a descriptor with an empty configuration.
    pub fn new(category: impl Into<String>, output_shape: TensorShape) -> Self {
        Self {
            category: category.into(),
            config: HashMap::new(),
            output_shape,
            name: None,
        }
    }

    /// Get a configuration value by key.
    pub fn get_config(&self, key: &str) -> Option<&serde_json::Value> {
        self.config.get(key)
    }

    /// Insert a configuration value, consuming and returning the descriptor.
    pub fn with_config(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

/// Parse an ordered layer stack from the JSON document emitted by the model
/// collaborator (an array of layer objects).
///
/// # Errors
///
/// Returns an error if the document is not valid JSON or a shape fails
/// validation. Unknown categories are not an error here; they are resolved
/// (and warned about) during graph construction.
pub fn layer_stack_from_json(json: &str) -> Result<Vec<LayerDescriptor>, NeurovizDataError> {
    serde_json::from_str(json).map_err(|e| NeurovizDataError::DeserializationError(e.to_string()))
}
