use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;

/// One value per mesh cell (cell markers, subdomain ids, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshFunction<T> {
    values: Vec<T>,
}

impl<T: Clone> MeshFunction<T> {
    pub fn new(mesh: &Mesh, value: T) -> Self {
        Self {
            values: vec![value; mesh.num_cells()],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn set_all(&mut self, value: T) {
        self.values.iter_mut().for_each(|v| *v = value.clone());
    }
}

impl<T: PartialEq> MeshFunction<T> {
    /// Cells whose value equals `value`, ascending.
    pub fn where_eq(&self, value: &T) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| *v == value)
            .map(|(c, _)| c)
            .collect()
    }
}

impl<T> Index<usize> for MeshFunction<T> {
    type Output = T;
    fn index(&self, cell: usize) -> &T {
        &self.values[cell]
    }
}

impl<T> IndexMut<usize> for MeshFunction<T> {
    fn index_mut(&mut self, cell: usize) -> &mut T {
        &mut self.values[cell]
    }
}
