mod common;

use mmesh_io::core::Mesh;
use mmesh_io::error::MeshIoError;
use mmesh_io::fem::PartFunction;
use mmesh_io::xdmf::XdmfFile;

fn linear_function() -> PartFunction {
    let mesh = Mesh::unit_square(2, 2).unwrap();
    let values = mesh.vertices().iter().map(|p| p.x + 2.0 * p.y).collect();
    PartFunction { part: 0, mesh, values }
}

#[test]
fn single_step_file_has_topology_geometry_and_values() {
    let tmp = common::temp_dir("xdmf");
    let dir = tmp.path();
    let path = dir.join("u0.xdmf");
    let f = linear_function();

    let mut file = XdmfFile::create(&path).unwrap();
    file.write(&f, 0.0).unwrap();
    file.close().unwrap();

    let xml = std::fs::read_to_string(&path).unwrap();
    assert!(xml.contains(r#"<Xdmf Version="3.0""#));
    assert!(xml.contains(r#"CollectionType="Temporal""#));
    assert!(xml.contains(r#"<Topology NumberOfElements="8" TopologyType="Triangle" NodesPerElement="3">"#));
    assert!(xml.contains(r#"<Geometry GeometryType="XY">"#));
    assert!(xml.contains(r#"Dimensions="9 2""#));
    assert!(xml.contains(r#"<Time Value="0"/>"#));
    assert!(xml.contains(r#"<Attribute Name="u" AttributeType="Scalar" Center="Node">"#));
    // Top-right vertex: 1 + 2 * 1.
    assert!(xml.contains("\n3\n") || xml.contains(">3\n") || xml.contains("\n3<"));
    assert_eq!(xml.matches("<Grid Name=\"mesh\"").count(), 1);
}

#[test]
fn each_write_appends_a_time_step() {
    let tmp = common::temp_dir("xdmf-steps");
    let dir = tmp.path();
    let path = dir.join("nested").join("u.xdmf");
    let f = linear_function();

    let mut file = XdmfFile::create(&path).unwrap().with_name("temperature");
    file.write(&f, 0.0).unwrap();
    file.write(&f, 0.5).unwrap();
    assert_eq!(file.num_steps(), 2);

    // Complete on disk before close.
    let xml = std::fs::read_to_string(&path).unwrap();
    assert_eq!(xml.matches("<Time ").count(), 2);
    assert!(xml.contains(r#"<Time Value="0.5"/>"#));
    assert!(xml.contains(r#"Name="temperature""#));
    file.close().unwrap();
}

#[test]
fn value_count_must_match_vertices() {
    let tmp = common::temp_dir("xdmf-bad");
    let dir = tmp.path();
    let mut f = linear_function();
    f.values.pop();

    let mut file = XdmfFile::create(dir.join("bad.xdmf")).unwrap();
    assert!(matches!(file.write(&f, 0.0), Err(MeshIoError::Format(_))));
    assert_eq!(file.num_steps(), 0);
}
