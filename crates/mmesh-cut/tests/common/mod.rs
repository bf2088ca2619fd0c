#![allow(dead_code)]

use mmesh_core::geometry::Point;
use mmesh_core::Mesh;
use mmesh_cut::MultiMesh;

/// Unit square with one rectangle on top, edges off the background grid.
pub fn square_with_patch() -> MultiMesh {
    let mut mm = MultiMesh::new();
    mm.add(Mesh::unit_square(8, 8).unwrap());
    mm.add(Mesh::rectangle(Point::new(0.23, 0.27), Point::new(0.81, 0.74), 6, 5).unwrap());
    mm.build().unwrap();
    mm
}

/// Same patch, but its left edge x = 0.25 runs along a background grid line.
pub fn square_with_aligned_patch() -> MultiMesh {
    let mut mm = MultiMesh::new();
    mm.add(Mesh::unit_square(8, 8).unwrap());
    mm.add(Mesh::rectangle(Point::new(0.25, 0.27), Point::new(0.81, 0.74), 6, 5).unwrap());
    mm.build().unwrap();
    mm
}

/// A patch whose whole boundary lies on background edges.
pub fn square_with_grid_patch() -> MultiMesh {
    let mut mm = MultiMesh::new();
    mm.add(Mesh::unit_square(8, 8).unwrap());
    mm.add(Mesh::rectangle(Point::new(0.25, 0.25), Point::new(0.75, 0.75), 4, 4).unwrap());
    mm.build().unwrap();
    mm
}

/// Unit square with two overlapping rectangles stacked on top.
pub fn three_parts() -> MultiMesh {
    let mut mm = MultiMesh::new();
    mm.add(Mesh::unit_square(8, 8).unwrap());
    mm.add(Mesh::rectangle(Point::new(0.1, 0.15), Point::new(0.6, 0.55), 5, 4).unwrap());
    mm.add(Mesh::rectangle(Point::new(0.43, 0.37), Point::new(0.93, 0.87), 5, 5).unwrap());
    mm.build().unwrap();
    mm
}

pub fn square_with_annulus() -> MultiMesh {
    let mut mm = MultiMesh::new();
    mm.add(Mesh::unit_square(16, 16).unwrap());
    mm.add(Mesh::annulus(Point::new(0.5, 0.5), 0.2, 0.41, 4, 64).unwrap());
    mm.build().unwrap();
    mm
}

pub fn total_visible_area(mm: &MultiMesh) -> f64 {
    (0..mm.num_parts()).map(|p| mm.visible_area(p)).sum()
}

pub fn total_interface_length(mm: &MultiMesh) -> f64 {
    (0..mm.num_parts()).map(|p| mm.interface_length(p)).sum()
}
