mod common;

use mmesh_core::geometry::Point;
use mmesh_cut::integrator::subtract_intervals;

#[test]
fn visible_areas_partition_the_union_of_two_parts() {
    let mm = common::square_with_patch();
    assert!((common::total_visible_area(&mm) - 1.0).abs() < 1e-10);

    let patch_area = 0.58 * 0.47;
    assert!((mm.visible_area(1) - patch_area).abs() < 1e-10);
    assert!((mm.visible_area(0) - (1.0 - patch_area)).abs() < 1e-10);
}

#[test]
fn visible_areas_partition_the_union_of_three_parts() {
    let mm = common::three_parts();
    assert!((common::total_visible_area(&mm) - 1.0).abs() < 1e-10);

    // Middle part loses the region under the top rectangle.
    let a_area = 0.5 * 0.4;
    let a_under_b = (0.6 - 0.43) * (0.55 - 0.37);
    assert!((mm.visible_area(1) - (a_area - a_under_b)).abs() < 1e-10);
}

#[test]
fn interface_length_matches_the_exposed_boundary() {
    let mm = common::square_with_patch();
    assert!((common::total_interface_length(&mm) - 2.0 * (0.58 + 0.47)).abs() < 1e-10);
    assert_eq!(mm.interface_length(1), 0.0);
}

#[test]
fn stacked_interfaces_exclude_hidden_boundary() {
    let mm = common::three_parts();

    // perimeter(A) + perimeter(B) - |∂A inside B|
    let hidden = (0.55 - 0.37) + (0.6 - 0.43);
    let expected = 1.8 + 2.0 - hidden;
    assert!((common::total_interface_length(&mm) - expected).abs() < 1e-10);

    // ∂B inside A is seen by the middle part.
    assert!((mm.interface_length(1) - hidden).abs() < 1e-10);
}

#[test]
fn interface_normals_are_unit_and_point_away_from_the_cutting_part() {
    let mm = common::square_with_patch();
    let center = Point::new(0.52, 0.505);
    for c in mm.cut_cells(0) {
        for r in mm.interface_rules(0, c) {
            assert_eq!(r.cutting_part, 1);
            assert!((r.normal.norm() - 1.0).abs() < 1e-12);
            for p in &r.rule.points {
                assert!(r.normal.dot(*p - center) > 0.0);
            }
        }
    }
}

#[test]
fn overlap_area_equals_covered_part_of_cut_cells() {
    let mm = common::square_with_patch();
    let mesh = mm.part(0);
    let cut_area: f64 = mm.cut_cells(0).into_iter().map(|c| mesh.area(c)).sum();
    let visible_cut: f64 = mm
        .cut_cells(0)
        .into_iter()
        .filter_map(|c| mm.quadrature_rule_cut_cell(0, c))
        .map(|r| r.total_weight())
        .sum();
    assert!((mm.overlap_area(0) - (cut_area - visible_cut)).abs() < 1e-10);
}

#[test]
fn annulus_geometry_is_partitioned() {
    let mm = common::square_with_annulus();
    assert!((common::total_visible_area(&mm) - 1.0).abs() < 1e-10);

    // Inner and outer polygonal rings of the annulus both lie inside the background.
    let n = 64.0_f64;
    let ring = |r: f64| n * 2.0 * r * (std::f64::consts::PI / n).sin();
    assert!((mm.interface_length(0) - (ring(0.2) + ring(0.41))).abs() < 1e-10);
}

#[test]
fn interval_subtraction() {
    assert_eq!(subtract_intervals((0.0, 1.0), vec![]), vec![(0.0, 1.0)]);
    assert_eq!(
        subtract_intervals((0.0, 1.0), vec![(0.6, 0.8), (0.1, 0.2), (0.15, 0.3)]),
        vec![(0.0, 0.1), (0.3, 0.6), (0.8, 1.0)]
    );
    assert!(subtract_intervals((0.2, 0.4), vec![(0.0, 0.5)]).is_empty());
    assert_eq!(subtract_intervals((0.2, 0.4), vec![(0.5, 0.9)]), vec![(0.2, 0.4)]);
}

#[test]
fn boundary_on_a_grid_line_keeps_its_interface() {
    let mm = common::square_with_aligned_patch();
    assert!((common::total_visible_area(&mm) - 1.0).abs() < 1e-10);
    assert!((common::total_interface_length(&mm) - 2.0 * (0.56 + 0.47)).abs() < 1e-10);

    // The x = 0.25 stretch belongs to the background cells left of it.
    let mesh = mm.part(0);
    let mut left_edge = 0.0;
    for c in mm.cut_cells(0) {
        for r in mm.interface_rules(0, c) {
            if r.normal.x < -0.5 {
                assert!(mesh.midpoint(c).x < 0.25);
                left_edge += r.rule.total_weight();
            }
        }
    }
    assert!((left_edge - 0.47).abs() < 1e-10);
}

#[test]
fn boundary_on_background_edges_is_owned_by_the_outer_neighbour() {
    let mm = common::square_with_grid_patch();
    assert!((common::total_visible_area(&mm) - 1.0).abs() < 1e-10);
    assert!((common::total_interface_length(&mm) - 2.0).abs() < 1e-10);

    // One outside neighbour per patch facet; the 4 x 4 squares underneath are covered.
    assert_eq!(mm.cut_cells(0).len(), 16);
    assert_eq!(mm.covered_cells(0).len(), 32);

    let center = Point::new(0.5, 0.5);
    for c in mm.cut_cells(0) {
        let rules = mm.interface_rules(0, c);
        assert_eq!(rules.len(), 1);
        assert!((rules[0].rule.total_weight() - 0.125).abs() < 1e-12);
        assert!(rules[0].normal.dot(mm.part(0).midpoint(c) - center) > 0.0);
        // Nothing above overlaps these cells, so they integrate in full.
        let full = mm.quadrature_rule_cut_cell(0, c).unwrap().total_weight();
        assert!((full - mm.part(0).area(c)).abs() < 1e-12);
    }
}
