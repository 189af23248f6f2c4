// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The dense, masked hypercube that chunks are pasted into while a parameter
//! is being loaded.

use ndarray::Dimension;

use super::{accumulate::Skeleton, axis::Coord, Axis, Chunk, ParameterError};
use crate::MaskedArray;

#[derive(Debug, Clone)]
pub(crate) struct DenseStore<T> {
    pub(crate) array: MaskedArray<T>,
}

impl<T: Clone> DenseStore<T> {
    /// Everything starts flagged; cells are unflagged as chunks are pasted.
    pub(crate) fn new(shape: &[usize], empty: T) -> DenseStore<T> {
        DenseStore {
            array: MaskedArray::fully_masked(shape, empty),
        }
    }

    /// Write the chunk's values and flags into the cube. Later chunks
    /// overwrite earlier ones where they overlap.
    pub(crate) fn paste(
        &mut self,
        param: &str,
        axes: &[Axis],
        skeleton: &Skeleton,
        chunk: &Chunk<T>,
    ) -> Result<(), ParameterError> {
        let index_lists = placement(param, axes, skeleton, chunk)?;

        let mut target = vec![0; axes.len()];
        for ((index, value), &flag) in chunk
            .array
            .values
            .indexed_iter()
            .zip(chunk.array.mask.iter())
        {
            for (t, (&i, list)) in target
                .iter_mut()
                .zip(index.slice().iter().zip(index_lists.iter()))
            {
                *t = list[i];
            }
            self.array.values[&target[..]] = value.clone();
            self.array.mask[&target[..]] = flag;
        }

        Ok(())
    }
}

/// For each axis, the cube index of each chunk index. Fails if the chunk
/// can't be pasted into a cube with the given skeleton.
pub(crate) fn placement<T: Clone>(
    param: &str,
    axes: &[Axis],
    skeleton: &Skeleton,
    chunk: &Chunk<T>,
) -> Result<Vec<Vec<usize>>, ParameterError> {
    let chunk_shape = chunk.shape();
    if chunk.array.mask.shape() != chunk_shape {
        return Err(ParameterError::MaskShapeMismatch {
            param: param.to_string(),
            values: chunk_shape.to_vec(),
            mask: chunk.array.mask.shape().to_vec(),
        });
    }
    if chunk_shape.len() != axes.len() {
        return Err(ParameterError::DimensionMismatch {
            param: param.to_string(),
            expected: axes.len(),
            got: chunk_shape.len(),
        });
    }
    if let Some(unknown) = chunk
        .grid
        .keys()
        .find(|k| !axes.iter().any(|a| &a.name == *k))
    {
        return Err(ParameterError::UnknownAxis {
            param: param.to_string(),
            axis: unknown.clone(),
        });
    }

    let mut index_lists: Vec<Vec<usize>> = Vec::with_capacity(axes.len());
    for (axis, &len) in axes.iter().zip(chunk_shape) {
        let indices: Vec<usize> = match chunk.grid.get(&axis.name) {
            Some(coords) => coords
                .iter()
                .map(|&x| {
                    skeleton.grid_maps[axis.index]
                        .get(&Coord(x))
                        .copied()
                        .ok_or_else(|| ParameterError::AxisMismatch {
                            param: param.to_string(),
                            axis: axis.name.clone(),
                            coord: x,
                        })
                })
                .collect::<Result<_, _>>()?,
            None => (0..skeleton.grids[axis.index].len()).collect(),
        };
        if indices.len() != len {
            return Err(ParameterError::ShapeMismatch {
                param: param.to_string(),
                axis: axis.name.clone(),
                got: len,
                expected: indices.len(),
            });
        }
        index_lists.push(indices);
    }
    Ok(index_lists)
}
