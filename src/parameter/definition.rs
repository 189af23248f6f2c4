// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{ParamValue, Parameter, ParameterError};

/// Everything needed to define a [`Parameter`], apart from its fill value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDefinition {
    pub name: String,

    pub axes: Vec<String>,

    #[serde(default)]
    pub interpolation_axes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<String>,

    /// Grids known ahead of time, keyed by axis name.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub grid: IndexMap<String, Vec<f64>>,
}

impl ParameterDefinition {
    pub fn build<T: ParamValue>(&self, empty: T) -> Result<Parameter<T>, ParameterError> {
        let mut param = Parameter::new(&self.name, &self.axes, &self.interpolation_axes, empty)?;
        for (axis, grid) in &self.grid {
            param = param.with_grid(axis, grid.clone())?;
        }
        if let Some(metadata) = &self.metadata {
            param = param.with_metadata(metadata.clone());
        }
        Ok(param)
    }
}
