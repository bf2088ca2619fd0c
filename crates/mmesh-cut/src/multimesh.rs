use std::collections::{BTreeMap, BTreeSet};

use mmesh_core::geometry::{point_in_triangle, triangles_overlap, Aabb, Point, DEFAULT_TOLERANCE};
use mmesh_core::{Mesh, QuadratureRule};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::collision::BoundingBoxTree;
use crate::error::MultiMeshError;
use crate::integrator::{facet_interval, interface_segment_rule, overlap_rule, visible_cell_rule, MAX_CUTTING_PARTS};

/// Classification of a cell relative to the parts stacked above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Uncut,
    Cut,
    Covered,
}

impl CellKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            CellKind::Uncut => "uncut",
            CellKind::Cut => "cut",
            CellKind::Covered => "covered",
        }
    }
}

/// Quadrature on the boundary of a higher part, inside a cut cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceRule {
    pub cutting_part: usize,
    /// Cell of `cutting_part` owning the boundary facet.
    pub cutting_cell: usize,
    /// Outward unit normal of the cutting part's boundary facet.
    pub normal: Point,
    pub rule: QuadratureRule,
}

/// Quadrature on the intersection of a cut cell with one cutting cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlapRule {
    pub cutting_part: usize,
    pub cutting_cell: usize,
    pub rule: QuadratureRule,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiMeshOptions {
    /// Polynomial degree integrated exactly by generated rules.
    pub quadrature_degree: usize,
    /// Geometric tolerance (distance) for collisions and classification.
    pub tolerance: f64,
}

impl Default for MultiMeshOptions {
    fn default() -> Self {
        Self {
            quadrature_degree: 2,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Per-part counts and measures, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartSummary {
    pub part: usize,
    pub cells: usize,
    pub uncut: usize,
    pub cut: usize,
    pub covered: usize,
    pub marked: usize,
    pub visible_area: f64,
    pub interface_length: f64,
    pub overlap_area: f64,
}

#[derive(Debug, Clone, Default)]
struct PartData {
    kinds: Vec<CellKind>,
    cutting_cells: BTreeMap<usize, Vec<(usize, usize)>>,
    cut_rules: BTreeMap<usize, QuadratureRule>,
    interface_rules: BTreeMap<usize, Vec<InterfaceRule>>,
    overlap_rules: BTreeMap<usize, Vec<OverlapRule>>,
    marked: BTreeSet<usize>,
}

/// A stack of possibly overlapping mesh parts. Later parts lie on top.
#[derive(Debug, Clone, Default)]
pub struct MultiMesh {
    parts: Vec<Mesh>,
    cell_trees: Vec<BoundingBoxTree>,
    boundary_trees: Vec<BoundingBoxTree>,
    data: Vec<PartData>,
    options: MultiMeshOptions,
    built: bool,
}

impl MultiMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: MultiMeshOptions) -> Self {
        Self { options, ..Self::default() }
    }

    pub fn options(&self) -> &MultiMeshOptions {
        &self.options
    }

    /// Append a part on top of the existing ones.
    ///
    /// Drops the previous build; queries return nothing until `build` runs again.
    pub fn add(&mut self, mesh: Mesh) {
        self.parts.push(mesh);
        self.cell_trees.clear();
        self.boundary_trees.clear();
        self.data.clear();
        self.built = false;
    }

    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    /// # Panics
    ///
    /// Panics if `i >= self.num_parts()`.
    pub fn part(&self, i: usize) -> &Mesh {
        &self.parts[i]
    }

    pub fn parts(&self) -> &[Mesh] {
        &self.parts
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Build collision structures, classify cells and compute quadrature.
    pub fn build(&mut self) -> Result<(), MultiMeshError> {
        if self.parts.is_empty() {
            return Err(MultiMeshError::Empty);
        }
        info!(parts = self.parts.len(), "building multimesh");

        self.cell_trees = self.parts.iter().map(BoundingBoxTree::for_cells).collect();
        self.boundary_trees = self.parts.iter().map(BoundingBoxTree::for_boundary).collect();
        self.data = (0..self.parts.len()).map(|i| self.classify_part(i)).collect();

        for i in 0..self.parts.len() {
            self.build_cut_cell_rules(i)?;
        }
        self.build_interface_rules()?;

        self.built = true;
        for s in self.summary() {
            debug!(
                part = s.part,
                uncut = s.uncut,
                cut = s.cut,
                covered = s.covered,
                "classified part"
            );
        }
        Ok(())
    }

    fn classify_part(&self, i: usize) -> PartData {
        let mesh = &self.parts[i];
        let tol = self.options.tolerance;
        let mut data = PartData {
            kinds: vec![CellKind::Uncut; mesh.num_cells()],
            ..PartData::default()
        };

        for c in 0..mesh.num_cells() {
            let pts = mesh.cell_points(c);
            let bbox = mesh.bounding_box(c);
            let mut colliding = Vec::new();
            let mut crossed = false;

            for j in i + 1..self.parts.len() {
                let upper = &self.parts[j];
                for k in self.cell_trees[j].compute_collisions(&bbox, tol) {
                    if triangles_overlap(&pts, &upper.cell_points(k), tol) {
                        colliding.push((j, k));
                    }
                }
                if !crossed {
                    crossed = self.boundary_trees[j]
                        .compute_collisions(&bbox, tol)
                        .into_iter()
                        .any(|f| {
                            let facet = &upper.boundary_facets()[f];
                            let (a, b) = upper.facet_points(facet);
                            facet_interval(a, b, facet.normal, &pts, tol).is_some()
                        });
                }
            }

            data.kinds[c] = if crossed {
                data.cutting_cells.insert(c, colliding);
                CellKind::Cut
            } else if !colliding.is_empty() {
                CellKind::Covered
            } else {
                CellKind::Uncut
            };
        }
        data
    }

    fn build_cut_cell_rules(&mut self, i: usize) -> Result<(), MultiMeshError> {
        let degree = self.options.quadrature_degree;
        let mesh = &self.parts[i];
        let mut cut_rules = BTreeMap::new();
        let mut overlap_rules = BTreeMap::new();

        for (&c, cutting) in &self.data[i].cutting_cells {
            let pts = mesh.cell_points(c);

            let mut groups: BTreeMap<usize, Vec<[Point; 3]>> = BTreeMap::new();
            for &(j, k) in cutting {
                groups.entry(j).or_default().push(self.parts[j].cell_points(k));
            }
            if groups.len() > MAX_CUTTING_PARTS {
                return Err(MultiMeshError::TooManyCuttingParts {
                    part: i,
                    cell: c,
                    count: groups.len(),
                    max: MAX_CUTTING_PARTS,
                });
            }
            let groups: Vec<Vec<[Point; 3]>> = groups.into_values().collect();
            cut_rules.insert(c, visible_cell_rule(&pts, &groups, degree)?);

            let mut overlaps = Vec::new();
            for &(j, k) in cutting {
                let rule = overlap_rule(&pts, &self.parts[j].cell_points(k), degree)?;
                if !rule.is_empty() {
                    overlaps.push(OverlapRule { cutting_part: j, cutting_cell: k, rule });
                }
            }
            if !overlaps.is_empty() {
                overlap_rules.insert(c, overlaps);
            }
        }

        self.data[i].cut_rules = cut_rules;
        self.data[i].overlap_rules = overlap_rules;
        Ok(())
    }

    /// Interface of part `j` seen from part `i < j`: `∂Ω_j ∩ T` minus every
    /// other part above `i`.
    fn build_interface_rules(&mut self) -> Result<(), MultiMeshError> {
        let degree = self.options.quadrature_degree;
        let tol = self.options.tolerance;
        let n = self.parts.len();
        let mut collected: Vec<BTreeMap<usize, Vec<InterfaceRule>>> = vec![BTreeMap::new(); n];

        for j in 1..n {
            let upper = &self.parts[j];
            for facet in upper.boundary_facets() {
                let (a, b) = upper.facet_points(facet);
                let facet_box = Aabb::from_points(&[a, b]);

                for i in 0..j {
                    let lower = &self.parts[i];
                    let mut excluded = Vec::new();
                    for k in (i + 1..n).filter(|&k| k != j) {
                        for kk in self.cell_trees[k].compute_collisions(&facet_box, tol) {
                            excluded.push(self.parts[k].cell_points(kk));
                        }
                    }

                    for t in self.cell_trees[i].compute_collisions(&facet_box, tol) {
                        if self.data[i].kinds[t] != CellKind::Cut {
                            continue;
                        }
                        let pts = lower.cell_points(t);
                        let rule = interface_segment_rule(a, b, facet.normal, &pts, &excluded, degree, tol)?;
                        if !rule.is_empty() {
                            collected[i].entry(t).or_default().push(InterfaceRule {
                                cutting_part: j,
                                cutting_cell: facet.cell,
                                normal: facet.normal,
                                rule,
                            });
                        }
                    }
                }
            }
        }

        for (data, rules) in self.data.iter_mut().zip(collected) {
            data.interface_rules = rules;
        }
        Ok(())
    }

    /// Mark extra cells of `part` as covered.
    ///
    /// Their own quadrature is dropped, as is every interface or overlap rule
    /// in lower parts that uses one of them as the cutting cell. Regions that
    /// were subtracted from lower parts stay subtracted.
    pub fn mark_covered(&mut self, part: usize, cells: &[usize]) -> Result<(), MultiMeshError> {
        if !self.built {
            return Err(MultiMeshError::NotBuilt);
        }
        self.check_part(part)?;
        let num_cells = self.parts[part].num_cells();
        if let Some(&cell) = cells.iter().find(|&&c| c >= num_cells) {
            return Err(MultiMeshError::CellOutOfRange { part, cell, num_cells });
        }

        let marked: BTreeSet<usize> = cells.iter().copied().collect();
        let data = &mut self.data[part];
        for &c in &marked {
            data.kinds[c] = CellKind::Covered;
            data.cutting_cells.remove(&c);
            data.cut_rules.remove(&c);
            data.interface_rules.remove(&c);
            data.overlap_rules.remove(&c);
            data.marked.insert(c);
        }

        for lower in &mut self.data[..part] {
            for rules in lower.interface_rules.values_mut() {
                rules.retain(|r| !(r.cutting_part == part && marked.contains(&r.cutting_cell)));
            }
            lower.interface_rules.retain(|_, rules| !rules.is_empty());
            for rules in lower.overlap_rules.values_mut() {
                rules.retain(|r| !(r.cutting_part == part && marked.contains(&r.cutting_cell)));
            }
            lower.overlap_rules.retain(|_, rules| !rules.is_empty());
        }

        info!(part, cells = marked.len(), "marked cells as covered");
        Ok(())
    }

    fn check_part(&self, part: usize) -> Result<(), MultiMeshError> {
        if part >= self.parts.len() {
            return Err(MultiMeshError::PartOutOfRange { part, num_parts: self.parts.len() });
        }
        Ok(())
    }

    fn cells_of_kind(&self, part: usize, kind: CellKind) -> Vec<usize> {
        self.data
            .get(part)
            .map(|d| {
                d.kinds
                    .iter()
                    .enumerate()
                    .filter(|(_, k)| **k == kind)
                    .map(|(c, _)| c)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Cells of `part` crossed by the boundary of a higher part, ascending.
    pub fn cut_cells(&self, part: usize) -> Vec<usize> {
        self.cells_of_kind(part, CellKind::Cut)
    }

    pub fn uncut_cells(&self, part: usize) -> Vec<usize> {
        self.cells_of_kind(part, CellKind::Uncut)
    }

    pub fn covered_cells(&self, part: usize) -> Vec<usize> {
        self.cells_of_kind(part, CellKind::Covered)
    }

    /// Cells covered through `mark_covered`, ascending.
    pub fn marked_cells(&self, part: usize) -> Vec<usize> {
        self.data
            .get(part)
            .map(|d| d.marked.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn cell_kind(&self, part: usize, cell: usize) -> Option<CellKind> {
        self.data.get(part).and_then(|d| d.kinds.get(cell).copied())
    }

    /// Cells of higher parts overlapping cut cell `cell`, as `(part, cell)`.
    pub fn cutting_cells(&self, part: usize, cell: usize) -> &[(usize, usize)] {
        self.data
            .get(part)
            .and_then(|d| d.cutting_cells.get(&cell))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn quadrature_rule_cut_cell(&self, part: usize, cell: usize) -> Option<&QuadratureRule> {
        self.data.get(part).and_then(|d| d.cut_rules.get(&cell))
    }

    pub fn interface_rules(&self, part: usize, cell: usize) -> &[InterfaceRule] {
        self.data
            .get(part)
            .and_then(|d| d.interface_rules.get(&cell))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn overlap_rules(&self, part: usize, cell: usize) -> &[OverlapRule] {
        self.data
            .get(part)
            .and_then(|d| d.overlap_rules.get(&cell))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn bounding_box_tree(&self, part: usize) -> Option<&BoundingBoxTree> {
        self.cell_trees.get(part)
    }

    /// Whether `p` lies in (the closure of) some cell of `part`.
    pub fn collides(&self, part: usize, p: Point) -> bool {
        let Some(mesh) = self.parts.get(part) else {
            return false;
        };
        match self.cell_trees.get(part) {
            Some(tree) => tree.collides_entity(mesh, p, self.options.tolerance),
            None => (0..mesh.num_cells()).any(|c| point_in_triangle(p, &mesh.cell_points(c), self.options.tolerance)),
        }
    }

    /// Measure of the region `part` integrates over: uncut cells plus the
    /// visible part of cut cells.
    /// Zero for an unknown part or before `build`.
    pub fn visible_area(&self, part: usize) -> f64 {
        let (Some(mesh), Some(data)) = (self.parts.get(part), self.data.get(part)) else {
            return 0.0;
        };
        let uncut: f64 = self.uncut_cells(part).into_iter().map(|c| mesh.area(c)).sum();
        let cut: f64 = data.cut_rules.values().map(QuadratureRule::total_weight).sum();
        uncut + cut
    }

    pub fn interface_length(&self, part: usize) -> f64 {
        self.data
            .get(part)
            .map(|d| d.interface_rules.values().flatten().map(|r| r.rule.total_weight()).sum())
            .unwrap_or(0.0)
    }

    pub fn overlap_area(&self, part: usize) -> f64 {
        self.data
            .get(part)
            .map(|d| d.overlap_rules.values().flatten().map(|r| r.rule.total_weight()).sum())
            .unwrap_or(0.0)
    }

    /// Per-part counts and measures. Empty until built.
    pub fn summary(&self) -> Vec<PartSummary> {
        if self.data.len() != self.parts.len() {
            return Vec::new();
        }
        (0..self.parts.len())
            .map(|part| PartSummary {
                part,
                cells: self.parts[part].num_cells(),
                uncut: self.uncut_cells(part).len(),
                cut: self.cut_cells(part).len(),
                covered: self.covered_cells(part).len(),
                marked: self.data[part].marked.len(),
                visible_area: self.visible_area(part),
                interface_length: self.interface_length(part),
                overlap_area: self.overlap_area(part),
            })
            .collect()
    }
}
