use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Coordinate-format accumulator. Duplicate entries are summed on conversion.
#[derive(Debug, Clone, Default)]
pub struct TripletMatrix {
    nrows: usize,
    ncols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl TripletMatrix {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self { nrows, ncols, entries: Vec::new() }
    }

    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        debug_assert!(row < self.nrows && col < self.ncols);
        self.entries.push((row, col, value));
    }

    /// Add a dense local block; `values` is row-major `rows.len() x cols.len()`.
    pub fn add_block(&mut self, rows: &[usize], cols: &[usize], values: &[f64]) {
        debug_assert_eq!(values.len(), rows.len() * cols.len());
        for (i, &r) in rows.iter().enumerate() {
            for (j, &c) in cols.iter().enumerate() {
                self.add(r, c, values[i * cols.len() + j]);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compress to CSR. Square matrices always store their diagonal.
    pub fn into_csr(mut self) -> SparseMatrix {
        if self.nrows == self.ncols {
            self.entries.extend((0..self.nrows).map(|i| (i, i, 0.0)));
        }
        self.entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut row_ptr = vec![0usize; self.nrows + 1];
        let mut col_idx = Vec::with_capacity(self.entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(self.entries.len());
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in self.entries {
            if last == Some((r, c)) {
                if let Some(slot) = values.last_mut() {
                    *slot += v;
                }
                continue;
            }
            col_idx.push(c);
            values.push(v);
            row_ptr[r + 1] += 1;
            last = Some((r, c));
        }
        for i in 0..self.nrows {
            row_ptr[i + 1] += row_ptr[i];
        }

        SparseMatrix {
            nrows: self.nrows,
            ncols: self.ncols,
            row_ptr,
            col_idx,
            values,
        }
    }
}

/// Compressed sparse row matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparseMatrix {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl SparseMatrix {
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        TripletMatrix::new(nrows, ncols).into_csr()
    }

    pub fn identity(n: usize) -> Self {
        let mut t = TripletMatrix::new(n, n);
        for i in 0..n {
            t.add(i, i, 1.0);
        }
        t.into_csr()
    }

    /// Rows (`dim == 0`) or columns (`dim == 1`).
    pub fn size(&self, dim: usize) -> usize {
        if dim == 0 { self.nrows } else { self.ncols }
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn row(&self, i: usize) -> (&[usize], &[f64]) {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        (&self.col_idx[range.clone()], &self.values[range])
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (cols, vals) = self.row(i);
        match cols.binary_search(&j) {
            Ok(k) => vals[k],
            Err(_) => 0.0,
        }
    }

    /// `y = A x`.
    ///
    /// # Panics
    /// When `x.len()` differs from the column count.
    pub fn mult(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.ncols, "vector length does not match matrix columns");
        (0..self.nrows)
            .map(|i| {
                let (cols, vals) = self.row(i);
                cols.iter().zip(vals).map(|(&c, v)| v * x[c]).sum()
            })
            .collect()
    }

    pub fn diagonal(&self) -> Vec<f64> {
        (0..self.nrows.min(self.ncols)).map(|i| self.get(i, i)).collect()
    }

    /// Zero the given rows and put `diag` on their diagonal.
    pub fn zero_rows(&mut self, rows: &[usize], diag: f64) {
        for &i in rows {
            let range = self.row_ptr[i]..self.row_ptr[i + 1];
            for k in range {
                self.values[k] = if self.col_idx[k] == i { diag } else { 0.0 };
            }
        }
    }

    /// Replace the given rows by identity rows.
    pub fn ident_rows(&mut self, rows: &[usize]) {
        self.zero_rows(rows, 1.0);
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        if self.nrows != self.ncols {
            return false;
        }
        (0..self.nrows).all(|i| {
            let (cols, vals) = self.row(i);
            cols.iter().zip(vals).all(|(&j, &v)| (v - self.get(j, i)).abs() <= tol)
        })
    }

    /// The block `rows x cols` as its own matrix.
    pub fn submatrix(&self, rows: Range<usize>, cols: Range<usize>) -> SparseMatrix {
        let mut t = TripletMatrix::new(rows.len(), cols.len());
        for i in rows.clone() {
            let (cs, vs) = self.row(i);
            for (&c, &v) in cs.iter().zip(vs) {
                if cols.contains(&c) && v != 0.0 {
                    t.add(i - rows.start, c - cols.start, v);
                }
            }
        }
        // Off-diagonal blocks that happen to be square must not gain a structural diagonal.
        let mut m = t.into_csr();
        m.drop_explicit_zeros();
        m
    }

    fn drop_explicit_zeros(&mut self) {
        let mut row_ptr = vec![0usize; self.nrows + 1];
        let mut col_idx = Vec::with_capacity(self.col_idx.len());
        let mut values = Vec::with_capacity(self.values.len());
        for i in 0..self.nrows {
            let (cs, vs) = self.row(i);
            for (&c, &v) in cs.iter().zip(vs) {
                if v != 0.0 {
                    col_idx.push(c);
                    values.push(v);
                }
            }
            row_ptr[i + 1] = col_idx.len();
        }
        self.row_ptr = row_ptr;
        self.col_idx = col_idx;
        self.values = values;
    }

    /// Row-major dense copy.
    pub fn to_dense(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.nrows * self.ncols];
        for i in 0..self.nrows {
            let (cols, vals) = self.row(i);
            for (&c, &v) in cols.iter().zip(vals) {
                out[i * self.ncols + c] = v;
            }
        }
        out
    }
}
