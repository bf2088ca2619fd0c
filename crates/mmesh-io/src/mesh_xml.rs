//! DOLFIN XML triangle meshes, plain or gzip-compressed.
//!
//! ```text
//! <dolfin>
//!   <mesh celltype="triangle" dim="2">
//!     <vertices size="N"> <vertex index="0" x=".." y=".."/> ... </vertices>
//!     <cells size="M"> <triangle index="0" v0=".." v1=".." v2=".."/> ... </cells>
//!   </mesh>
//! </dolfin>
//! ```

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use mmesh_core::geometry::Point;
use mmesh_core::Mesh;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use tracing::{debug, info};

use crate::error::MeshIoError;

fn xml_err(e: impl Display) -> MeshIoError {
    MeshIoError::Xml(e.to_string())
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "gz")
}

/// Read a mesh file; `.gz` files are decompressed on the fly.
pub fn read_mesh(path: impl AsRef<Path>) -> Result<Mesh, MeshIoError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| MeshIoError::io(path, e))?;

    let mut xml = String::new();
    if is_gzip(path) {
        GzDecoder::new(file)
            .read_to_string(&mut xml)
            .map_err(|e| MeshIoError::io(path, e))?;
    } else {
        let mut file = file;
        file.read_to_string(&mut xml).map_err(|e| MeshIoError::io(path, e))?;
    }

    let mesh = parse_mesh(&xml)?;
    info!(
        path = %path.display(),
        vertices = mesh.num_vertices(),
        cells = mesh.num_cells(),
        "read mesh"
    );
    Ok(mesh)
}

fn attr<T: FromStr>(e: &BytesStart<'_>, name: &str) -> Result<T, MeshIoError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let raw = e
        .try_get_attribute(name)
        .map_err(xml_err)?
        .ok_or_else(|| MeshIoError::Format(format!("<{tag}> is missing attribute '{name}'")))?;
    let value = raw.unescape_value().map_err(xml_err)?;
    value
        .trim()
        .parse()
        .map_err(|_| MeshIoError::Format(format!("<{tag}> attribute {name}=\"{value}\" is not a number")))
}

/// Parse DOLFIN XML text into a mesh.
pub fn parse_mesh(xml: &str) -> Result<Mesh, MeshIoError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut seen_mesh = false;
    let mut vertices: Vec<Option<Point>> = Vec::new();
    let mut cells: Vec<Option<[usize; 3]>> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"mesh" => {
                    let celltype: String = attr(&e, "celltype")?;
                    let dim: usize = attr(&e, "dim")?;
                    if celltype != "triangle" || dim != 2 {
                        return Err(MeshIoError::Format(format!(
                            "only 2D triangle meshes are supported (got celltype=\"{celltype}\" dim={dim})"
                        )));
                    }
                    seen_mesh = true;
                }
                b"vertices" => vertices = vec![None; attr(&e, "size")?],
                b"cells" => cells = vec![None; attr(&e, "size")?],
                b"vertex" => {
                    let index: usize = attr(&e, "index")?;
                    let slot = vertices
                        .get_mut(index)
                        .ok_or_else(|| MeshIoError::Format(format!("vertex index {index} exceeds declared size")))?;
                    *slot = Some(Point::new(attr(&e, "x")?, attr(&e, "y")?));
                }
                b"triangle" => {
                    let index: usize = attr(&e, "index")?;
                    let slot = cells
                        .get_mut(index)
                        .ok_or_else(|| MeshIoError::Format(format!("cell index {index} exceeds declared size")))?;
                    *slot = Some([attr(&e, "v0")?, attr(&e, "v1")?, attr(&e, "v2")?]);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_err(e)),
            _ => {}
        }
    }

    if !seen_mesh {
        return Err(MeshIoError::Format("no <mesh> element found".to_string()));
    }
    let vertices = vertices
        .into_iter()
        .enumerate()
        .map(|(i, v)| v.ok_or_else(|| MeshIoError::Format(format!("vertex {i} is missing"))))
        .collect::<Result<Vec<_>, _>>()?;
    let cells = cells
        .into_iter()
        .enumerate()
        .map(|(i, c)| c.ok_or_else(|| MeshIoError::Format(format!("cell {i} is missing"))))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(vertices = vertices.len(), cells = cells.len(), "parsed DOLFIN XML mesh");

    Ok(Mesh::new(vertices, cells)?)
}

/// Serialize a mesh as DOLFIN XML.
pub fn write_mesh_xml<W: Write>(mesh: &Mesh, out: W) -> Result<(), MeshIoError> {
    let mut w = Writer::new_with_indent(out, b' ', 2);

    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None))).map_err(xml_err)?;
    w.write_event(Event::Start(
        BytesStart::new("dolfin").with_attributes([("xmlns:dolfin", "http://fenicsproject.org")]),
    ))
    .map_err(xml_err)?;
    w.write_event(Event::Start(
        BytesStart::new("mesh").with_attributes([("celltype", "triangle"), ("dim", "2")]),
    ))
    .map_err(xml_err)?;

    let size = mesh.num_vertices().to_string();
    w.write_event(Event::Start(BytesStart::new("vertices").with_attributes([("size", size.as_str())])))
        .map_err(xml_err)?;
    for (i, p) in mesh.vertices().iter().enumerate() {
        let (index, x, y) = (i.to_string(), p.x.to_string(), p.y.to_string());
        w.write_event(Event::Empty(BytesStart::new("vertex").with_attributes([
            ("index", index.as_str()),
            ("x", x.as_str()),
            ("y", y.as_str()),
        ])))
        .map_err(xml_err)?;
    }
    w.write_event(Event::End(BytesEnd::new("vertices"))).map_err(xml_err)?;

    let size = mesh.num_cells().to_string();
    w.write_event(Event::Start(BytesStart::new("cells").with_attributes([("size", size.as_str())])))
        .map_err(xml_err)?;
    for (i, c) in mesh.cells().iter().enumerate() {
        let index = i.to_string();
        let [v0, v1, v2] = c.map(|v| v.to_string());
        w.write_event(Event::Empty(BytesStart::new("triangle").with_attributes([
            ("index", index.as_str()),
            ("v0", v0.as_str()),
            ("v1", v1.as_str()),
            ("v2", v2.as_str()),
        ])))
        .map_err(xml_err)?;
    }
    w.write_event(Event::End(BytesEnd::new("cells"))).map_err(xml_err)?;

    w.write_event(Event::End(BytesEnd::new("mesh"))).map_err(xml_err)?;
    w.write_event(Event::End(BytesEnd::new("dolfin"))).map_err(xml_err)?;
    w.into_inner().write_all(b"\n").map_err(xml_err)?;
    Ok(())
}

/// Write a mesh file; `.gz` paths are gzip-compressed.
pub fn write_mesh(mesh: &Mesh, path: impl AsRef<Path>) -> Result<(), MeshIoError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| MeshIoError::io(path, e))?;
    let out = BufWriter::new(file);

    if is_gzip(path) {
        let mut gz = GzEncoder::new(out, Compression::default());
        write_mesh_xml(mesh, &mut gz)?;
        gz.finish()
            .and_then(|mut w| w.flush())
            .map_err(|e| MeshIoError::io(path, e))?;
    } else {
        let mut out = out;
        write_mesh_xml(mesh, &mut out)?;
        out.flush().map_err(|e| MeshIoError::io(path, e))?;
    }

    info!(path = %path.display(), cells = mesh.num_cells(), "wrote mesh");
    Ok(())
}
