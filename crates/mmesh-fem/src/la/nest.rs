//! Block-structured view of a matrix: an N x N grid of optional sub-matrices,
//! listed row by row from the top left.

use std::ops::Range;

use crate::error::FemError;
use crate::la::sparse::SparseMatrix;

#[derive(Debug, Clone, PartialEq)]
pub struct NestMatrix {
    n: usize,
    blocks: Vec<Option<SparseMatrix>>,
    row_sizes: Vec<usize>,
    col_sizes: Vec<usize>,
}

impl NestMatrix {
    /// Create from `N * N` blocks. `None` stands for an all-zero block.
    ///
    /// Every block row and block column needs at least one present block so
    /// its size can be inferred.
    pub fn new(blocks: Vec<Option<SparseMatrix>>) -> Result<Self, FemError> {
        let n = (blocks.len() as f64).sqrt().round() as usize;
        if n * n != blocks.len() || n == 0 {
            return Err(FemError::NotPerfectSquare(blocks.len()));
        }

        let mut row_sizes = vec![None; n];
        let mut col_sizes = vec![None; n];
        for (idx, block) in blocks.iter().enumerate() {
            let Some(m) = block else { continue };
            let (i, j) = (idx / n, idx % n);
            let expected_rows = *row_sizes[i].get_or_insert(m.size(0));
            let expected_cols = *col_sizes[j].get_or_insert(m.size(1));
            if m.size(0) != expected_rows || m.size(1) != expected_cols {
                return Err(FemError::BlockSizeMismatch {
                    row: i,
                    col: j,
                    expected_rows,
                    expected_cols,
                    found_rows: m.size(0),
                    found_cols: m.size(1),
                });
            }
        }

        let row_sizes = row_sizes
            .into_iter()
            .enumerate()
            .map(|(i, s)| s.ok_or(FemError::EmptyBlockRow(i)))
            .collect::<Result<Vec<_>, _>>()?;
        let col_sizes = col_sizes
            .into_iter()
            .enumerate()
            .map(|(j, s)| s.ok_or(FemError::EmptyBlockColumn(j)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { n, blocks, row_sizes, col_sizes })
    }

    /// Split a square matrix along the same ranges in both dimensions.
    /// Blocks without non-zeros are stored as `None`.
    pub fn from_split(matrix: &SparseMatrix, ranges: &[Range<usize>]) -> Self {
        let n = ranges.len();
        let mut blocks = Vec::with_capacity(n * n);
        for rows in ranges {
            for cols in ranges {
                let block = matrix.submatrix(rows.clone(), cols.clone());
                blocks.push((block.nnz() > 0).then_some(block));
            }
        }
        let sizes: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
        Self {
            n,
            blocks,
            row_sizes: sizes.clone(),
            col_sizes: sizes,
        }
    }

    pub fn num_block_rows(&self) -> usize {
        self.n
    }

    /// Total rows (`dim == 0`) or columns (`dim == 1`).
    pub fn size(&self, dim: usize) -> usize {
        if dim == 0 {
            self.row_sizes.iter().sum()
        } else {
            self.col_sizes.iter().sum()
        }
    }

    pub fn block(&self, i: usize, j: usize) -> Option<&SparseMatrix> {
        self.blocks.get(i * self.n + j).and_then(Option::as_ref)
    }

    /// Global row indices owned by block row `idx`.
    pub fn block_dofs(&self, idx: usize) -> Range<usize> {
        let start: usize = self.row_sizes[..idx].iter().sum();
        start..start + self.row_sizes[idx]
    }

    fn block_cols(&self, idx: usize) -> Range<usize> {
        let start: usize = self.col_sizes[..idx].iter().sum();
        start..start + self.col_sizes[idx]
    }

    /// `y = A x` computed block by block.
    pub fn mult(&self, x: &[f64]) -> Result<Vec<f64>, FemError> {
        if x.len() != self.size(1) {
            return Err(FemError::DimensionMismatch { expected: self.size(1), found: x.len() });
        }
        let mut y = vec![0.0; self.size(0)];
        for i in 0..self.n {
            let rows = self.block_dofs(i);
            for j in 0..self.n {
                let Some(m) = self.block(i, j) else { continue };
                let partial = m.mult(&x[self.block_cols(j)]);
                for (yi, p) in y[rows.clone()].iter_mut().zip(partial) {
                    *yi += p;
                }
            }
        }
        Ok(y)
    }

    /// Split a global vector into per-block pieces.
    pub fn split_vector(&self, z: &[f64]) -> Vec<Vec<f64>> {
        (0..self.n).map(|i| z[self.block_dofs(i)].to_vec()).collect()
    }

    /// Non-zeros per block, row-major; zero for absent blocks.
    pub fn block_nnz(&self) -> Vec<usize> {
        self.blocks
            .iter()
            .map(|b| b.as_ref().map_or(0, SparseMatrix::nnz))
            .collect()
    }
}
