mod common;

use mmesh_cut::{CellKind, MultiMeshError};

#[test]
fn marking_cut_cells_drops_their_quadrature() {
    let mut mm = common::square_with_patch();
    let cut = mm.cut_cells(0);
    let target = cut[0];
    assert!(mm.quadrature_rule_cut_cell(0, target).is_some());

    mm.mark_covered(0, &[target]).unwrap();

    assert_eq!(mm.cell_kind(0, target), Some(CellKind::Covered));
    assert!(mm.quadrature_rule_cut_cell(0, target).is_none());
    assert!(mm.interface_rules(0, target).is_empty());
    assert!(mm.overlap_rules(0, target).is_empty());
    assert_eq!(mm.marked_cells(0), vec![target]);
    assert_eq!(mm.cut_cells(0).len(), cut.len() - 1);
}

#[test]
fn marking_cutting_cells_drops_lower_interfaces() {
    let mut mm = common::square_with_patch();
    let before = mm.interface_length(0);

    let all: Vec<usize> = (0..mm.part(1).num_cells()).collect();
    mm.mark_covered(1, &all).unwrap();

    assert!(before > 0.0);
    assert_eq!(mm.interface_length(0), 0.0);
    assert_eq!(mm.overlap_area(0), 0.0);
    assert_eq!(mm.covered_cells(1).len(), all.len());
}

#[test]
fn marking_validates_arguments() {
    let mut mm = common::square_with_patch();
    assert_eq!(
        mm.mark_covered(5, &[0]),
        Err(MultiMeshError::PartOutOfRange { part: 5, num_parts: 2 })
    );
    let num_cells = mm.part(0).num_cells();
    assert_eq!(
        mm.mark_covered(0, &[1, num_cells]),
        Err(MultiMeshError::CellOutOfRange { part: 0, cell: num_cells, num_cells })
    );
    // Nothing was marked by the failed call.
    assert!(mm.marked_cells(0).is_empty());
}
