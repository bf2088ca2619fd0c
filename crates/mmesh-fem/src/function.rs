use mmesh_core::geometry::{point_in_triangle, Point, DEFAULT_TOLERANCE};
use mmesh_core::Mesh;
use mmesh_cut::CellKind;

use crate::error::FemError;
use crate::function_space::MultiMeshFunctionSpace;

/// A coefficient vector over a multimesh function space.
#[derive(Debug, Clone)]
pub struct MultiMeshFunction<'s, 'a> {
    space: &'s MultiMeshFunctionSpace<'a>,
    vector: Vec<f64>,
}

impl<'s, 'a> MultiMeshFunction<'s, 'a> {
    /// The zero function.
    pub fn new(space: &'s MultiMeshFunctionSpace<'a>) -> Self {
        Self { space, vector: vec![0.0; space.dim()] }
    }

    pub fn from_vector(space: &'s MultiMeshFunctionSpace<'a>, vector: Vec<f64>) -> Result<Self, FemError> {
        if vector.len() != space.dim() {
            return Err(FemError::DimensionMismatch { expected: space.dim(), found: vector.len() });
        }
        Ok(Self { space, vector })
    }

    pub fn space(&self) -> &'s MultiMeshFunctionSpace<'a> {
        self.space
    }

    pub fn vector(&self) -> &[f64] {
        &self.vector
    }

    pub fn vector_mut(&mut self) -> &mut Vec<f64> {
        &mut self.vector
    }

    /// Deep copy of one part's nodal values together with its mesh.
    pub fn part(&self, part: usize) -> PartFunction {
        PartFunction {
            part,
            mesh: self.space.multimesh().part(part).clone(),
            values: self.vector[self.space.part_dofs(part)].to_vec(),
        }
    }

    /// Value at `p` taken from the highest part with an active cell there.
    pub fn eval(&self, p: Point) -> Option<f64> {
        let multimesh = self.space.multimesh();
        (0..self.space.num_parts()).rev().find_map(|part| {
            let mesh = multimesh.part(part);
            let cell = (0..mesh.num_cells()).find(|&c| {
                multimesh.cell_kind(part, c) != Some(CellKind::Covered)
                    && point_in_triangle(p, &mesh.cell_points(c), DEFAULT_TOLERANCE)
            })?;
            Some(interpolate(mesh, cell, &self.vector[self.space.part_dofs(part)], p))
        })
    }
}

fn interpolate(mesh: &Mesh, cell: usize, values: &[f64], p: Point) -> f64 {
    let lambda = mesh.barycentric(cell, p);
    mesh.cell(cell).iter().zip(lambda).map(|(&v, l)| l * values[v]).sum()
}

/// One part's P1 function, detached from the multimesh.
#[derive(Debug, Clone, PartialEq)]
pub struct PartFunction {
    pub part: usize,
    pub mesh: Mesh,
    /// One value per vertex.
    pub values: Vec<f64>,
}

impl PartFunction {
    pub fn eval(&self, p: Point) -> Option<f64> {
        let cell = (0..self.mesh.num_cells())
            .find(|&c| point_in_triangle(p, &self.mesh.cell_points(c), DEFAULT_TOLERANCE))?;
        Some(interpolate(&self.mesh, cell, &self.values, p))
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}
