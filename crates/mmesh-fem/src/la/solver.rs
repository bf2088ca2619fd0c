use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::la::sparse::SparseMatrix;

/// Largest system dense LU accepts; its `n * n` copy stays around 128 MB.
pub const MAX_DENSE_LU_DIM: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMethod {
    /// Dense LU with partial pivoting.
    #[default]
    Lu,
    /// Jacobi-preconditioned BiCGSTAB.
    Bicgstab,
    /// Jacobi-preconditioned conjugate gradients; symmetric positive definite only.
    Cg,
}

impl SolverMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            SolverMethod::Lu => "lu",
            SolverMethod::Bicgstab => "bicgstab",
            SolverMethod::Cg => "cg",
        }
    }
}

impl fmt::Display for SolverMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SolverMethod {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lu" | "default" => Ok(SolverMethod::Lu),
            "bicgstab" => Ok(SolverMethod::Bicgstab),
            "cg" => Ok(SolverMethod::Cg),
            other => Err(SolverError::UnknownMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("unknown solver method '{0}'. Supported methods: lu, bicgstab, cg.")]
    UnknownMethod(String),

    #[error("system is {rows}x{cols} but the right-hand side has {rhs} entries")]
    DimensionMismatch { rows: usize, cols: usize, rhs: usize },

    #[error("{dim} unknowns exceed the dense LU limit of {max}; use bicgstab or cg")]
    TooLargeForDense { dim: usize, max: usize },

    #[error("matrix is singular (zero pivot in column {column})")]
    Singular { column: usize },

    #[error("{method} did not converge in {iterations} iterations (relative residual {residual:e})")]
    NotConverged {
        method: SolverMethod,
        iterations: usize,
        residual: f64,
    },

    #[error("{0} broke down")]
    Breakdown(SolverMethod),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    pub method: SolverMethod,
    /// Relative residual target for iterative methods.
    pub relative_tolerance: f64,
    pub max_iterations: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            method: SolverMethod::Lu,
            relative_tolerance: 1e-10,
            max_iterations: 10_000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveInfo {
    pub method: SolverMethod,
    /// Zero for direct solves.
    pub iterations: usize,
    /// `||b - A x|| / ||b||` (absolute when `b == 0`).
    pub relative_residual: f64,
}

/// Solve `A x = b`, overwriting `x`. Iterative methods start from `x`.
pub fn solve(
    a: &SparseMatrix,
    x: &mut Vec<f64>,
    b: &[f64],
    options: SolverOptions,
) -> Result<SolveInfo, SolverError> {
    let n = a.size(0);
    if a.size(1) != n || b.len() != n {
        return Err(SolverError::DimensionMismatch { rows: n, cols: a.size(1), rhs: b.len() });
    }
    x.resize(n, 0.0);

    let iterations = match options.method {
        SolverMethod::Lu => {
            *x = lu_solve(a, b)?;
            0
        }
        SolverMethod::Bicgstab => bicgstab(a, x, b, &options)?,
        SolverMethod::Cg => cg(a, x, b, &options)?,
    };

    let info = SolveInfo {
        method: options.method,
        iterations,
        relative_residual: relative_residual(a, x, b),
    };
    debug!(
        method = %info.method,
        iterations = info.iterations,
        residual = info.relative_residual,
        "linear solve finished"
    );
    Ok(info)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

fn residual(a: &SparseMatrix, x: &[f64], b: &[f64]) -> Vec<f64> {
    a.mult(x).iter().zip(b).map(|(ax, bi)| bi - ax).collect()
}

fn relative_residual(a: &SparseMatrix, x: &[f64], b: &[f64]) -> f64 {
    let r = norm(&residual(a, x, b));
    let nb = norm(b);
    if nb == 0.0 { r } else { r / nb }
}

fn lu_solve(a: &SparseMatrix, b: &[f64]) -> Result<Vec<f64>, SolverError> {
    let n = a.size(0);
    if n > MAX_DENSE_LU_DIM {
        return Err(SolverError::TooLargeForDense { dim: n, max: MAX_DENSE_LU_DIM });
    }
    let mut m = a.to_dense();
    let mut x = b.to_vec();

    let scale = m.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(f64::MIN_POSITIVE);

    for k in 0..n {
        let (pivot_row, pivot_abs) = (k..n)
            .map(|i| (i, m[i * n + k].abs()))
            .fold((k, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if pivot_abs <= 1e-14 * scale {
            return Err(SolverError::Singular { column: k });
        }
        if pivot_row != k {
            for j in 0..n {
                m.swap(k * n + j, pivot_row * n + j);
            }
            x.swap(k, pivot_row);
        }

        let pivot = m[k * n + k];
        for i in k + 1..n {
            let factor = m[i * n + k] / pivot;
            if factor == 0.0 {
                continue;
            }
            m[i * n + k] = 0.0;
            for j in k + 1..n {
                m[i * n + j] -= factor * m[k * n + j];
            }
            x[i] -= factor * x[k];
        }
    }

    for k in (0..n).rev() {
        let tail: f64 = (k + 1..n).map(|j| m[k * n + j] * x[j]).sum();
        x[k] = (x[k] - tail) / m[k * n + k];
    }
    Ok(x)
}

fn jacobi(a: &SparseMatrix) -> Vec<f64> {
    a.diagonal()
        .into_iter()
        .map(|d| if d.abs() > f64::MIN_POSITIVE { 1.0 / d } else { 1.0 })
        .collect()
}

fn bicgstab(
    a: &SparseMatrix,
    x: &mut [f64],
    b: &[f64],
    options: &SolverOptions,
) -> Result<usize, SolverError> {
    let method = SolverMethod::Bicgstab;
    let target = options.relative_tolerance * norm(b);
    let inv_diag = jacobi(a);
    let precondition = |v: &[f64]| -> Vec<f64> { v.iter().zip(&inv_diag).map(|(vi, d)| vi * d).collect() };

    let mut r = residual(a, x, b);
    if norm(&r) <= target {
        return Ok(0);
    }
    let r_hat = r.clone();
    let (mut rho, mut alpha, mut omega) = (1.0, 1.0, 1.0);
    let mut v = vec![0.0; b.len()];
    let mut p = vec![0.0; b.len()];

    for it in 1..=options.max_iterations {
        let rho_next = dot(&r_hat, &r);
        if rho_next == 0.0 || omega == 0.0 {
            return Err(SolverError::Breakdown(method));
        }
        let beta = (rho_next / rho) * (alpha / omega);
        for i in 0..p.len() {
            p[i] = r[i] + beta * (p[i] - omega * v[i]);
        }

        let y = precondition(&p);
        v = a.mult(&y);
        let denom = dot(&r_hat, &v);
        if denom == 0.0 {
            return Err(SolverError::Breakdown(method));
        }
        alpha = rho_next / denom;

        let s: Vec<f64> = r.iter().zip(&v).map(|(ri, vi)| ri - alpha * vi).collect();
        if norm(&s) <= target {
            for i in 0..x.len() {
                x[i] += alpha * y[i];
            }
            return Ok(it);
        }

        let z = precondition(&s);
        let t = a.mult(&z);
        let tt = dot(&t, &t);
        omega = if tt == 0.0 { 0.0 } else { dot(&t, &s) / tt };

        for i in 0..x.len() {
            x[i] += alpha * y[i] + omega * z[i];
            r[i] = s[i] - omega * t[i];
        }
        if norm(&r) <= target {
            return Ok(it);
        }
        rho = rho_next;
    }

    let residual = relative_residual(a, x, b);
    warn!(residual, "bicgstab hit the iteration limit");
    Err(SolverError::NotConverged { method, iterations: options.max_iterations, residual })
}

fn cg(a: &SparseMatrix, x: &mut [f64], b: &[f64], options: &SolverOptions) -> Result<usize, SolverError> {
    let method = SolverMethod::Cg;
    let target = options.relative_tolerance * norm(b);
    let inv_diag = jacobi(a);

    let mut r = residual(a, x, b);
    if norm(&r) <= target {
        return Ok(0);
    }
    let mut z: Vec<f64> = r.iter().zip(&inv_diag).map(|(ri, d)| ri * d).collect();
    let mut p = z.clone();
    let mut rz = dot(&r, &z);

    for it in 1..=options.max_iterations {
        let ap = a.mult(&p);
        let pap = dot(&p, &ap);
        if pap <= 0.0 {
            return Err(SolverError::Breakdown(method));
        }
        let alpha = rz / pap;
        for i in 0..x.len() {
            x[i] += alpha * p[i];
            r[i] -= alpha * ap[i];
        }
        if norm(&r) <= target {
            return Ok(it);
        }

        z = r.iter().zip(&inv_diag).map(|(ri, d)| ri * d).collect();
        let rz_next = dot(&r, &z);
        let beta = rz_next / rz;
        rz = rz_next;
        for i in 0..p.len() {
            p[i] = z[i] + beta * p[i];
        }
    }

    let residual = relative_residual(a, x, b);
    warn!(residual, "cg hit the iteration limit");
    Err(SolverError::NotConverged { method, iterations: options.max_iterations, residual })
}
