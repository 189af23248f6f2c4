// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A collection of named parameters, and the driver of their lifecycles.
//!
//! Chunks of solutions are added as a solver produces them; each chunk
//! updates its parameter's shape and is kept as a fragment. When the database
//! is loaded, every parameter's shape is finalised and its fragments are
//! pasted in the order they arrived.

mod error;
#[cfg(test)]
mod tests;

pub use error::DatabaseError;

use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::{
    parameter::{Chunk, Parameter, ParameterDefinition, ParameterState},
    ParamValue,
};

#[derive(Debug)]
pub struct ParameterDatabase<T> {
    params: IndexMap<String, Parameter<T>>,

    /// The chunks of each parameter, in arrival order.
    fragments: IndexMap<String, Vec<Chunk<T>>>,

    loaded: bool,
}

impl<T: ParamValue> Default for ParameterDatabase<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ParamValue> ParameterDatabase<T> {
    pub fn new() -> ParameterDatabase<T> {
        ParameterDatabase {
            params: IndexMap::new(),
            fragments: IndexMap::new(),
            loaded: false,
        }
    }

    pub fn define_param(
        &mut self,
        def: &ParameterDefinition,
        empty: T,
    ) -> Result<(), DatabaseError> {
        if self.loaded {
            return Err(DatabaseError::AlreadyLoaded);
        }
        if self.params.contains_key(&def.name) {
            return Err(DatabaseError::DuplicateParameter(def.name.clone()));
        }
        let param = def.build(empty)?;
        self.params.insert(def.name.clone(), param);
        self.fragments.insert(def.name.clone(), vec![]);
        Ok(())
    }

    /// Account for a chunk of solutions of the named parameter.
    pub fn add_chunk(&mut self, name: &str, chunk: Chunk<T>) -> Result<(), DatabaseError> {
        if self.loaded {
            return Err(DatabaseError::AlreadyLoaded);
        }
        let param = self
            .params
            .get_mut(name)
            .ok_or_else(|| DatabaseError::UnknownParameter(name.to_string()))?;
        param.update_shape(chunk.shape(), &chunk.grid)?;
        if let Some(fragments) = self.fragments.get_mut(name) {
            fragments.push(chunk);
        }
        Ok(())
    }

    /// Finalise every parameter and load its chunks. Parameters that never
    /// received a chunk are left unfinished. The names of those parameters
    /// are returned.
    ///
    /// Every chunk is checked before any is loaded, so if this fails, no
    /// parameter has been populated and no chunk has been consumed.
    pub fn load(&mut self) -> Result<Vec<String>, DatabaseError> {
        if self.loaded {
            return Err(DatabaseError::AlreadyLoaded);
        }
        let mut skipped = vec![];
        for (name, param) in self.params.iter_mut() {
            if param.state() == ParameterState::Prototype && !param.finalize_shape()? {
                warn!("parameter {name} has no solutions; it will not be available");
                skipped.push(name.clone());
                continue;
            }
            for chunk in self.fragments.get(name).into_iter().flatten() {
                param.check_chunk(chunk)?;
            }
        }

        for (name, param) in self.params.iter_mut() {
            if param.state() != ParameterState::Skeleton {
                continue;
            }
            let fragments = self.fragments.swap_remove(name).unwrap_or_default();
            debug!("loading {} fragments of {name}", fragments.len());
            param.load(&fragments)?;
        }
        self.loaded = true;
        info!(
            "loaded {} of {} parameters",
            self.params.len() - skipped.len(),
            self.params.len()
        );
        Ok(skipped)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, name: &str) -> Result<&Parameter<T>, DatabaseError> {
        self.params
            .get(name)
            .ok_or_else(|| DatabaseError::UnknownParameter(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Parameter<T>, DatabaseError> {
        self.params
            .get_mut(name)
            .ok_or_else(|| DatabaseError::UnknownParameter(name.to_string()))
    }

    /// Names of all defined parameters, in definition order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(|s| s.as_str())
    }

    pub fn params(&self) -> impl Iterator<Item = &Parameter<T>> {
        self.params.values()
    }

    /// Names of the parameters that can be queried.
    pub fn populated_names(&self) -> impl Iterator<Item = &str> {
        self.params
            .values()
            .filter(|p| p.state() == ParameterState::Populated)
            .map(|p| p.name())
    }

    /// Drop the cached interpolators of every parameter, e.g. before handing
    /// the database off for persistence.
    pub fn release_caches(&mut self) {
        for param in self.params.values_mut() {
            param.release_cache();
        }
    }
}
