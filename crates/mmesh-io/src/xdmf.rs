//! XDMF 3 output for one part's P1 function, with heavy data inlined as XML.
//!
//! Every `write` appends a time step to a temporal collection and rewrites the
//! file, so the file on disk is complete after each call.

use std::fmt::{Display, Write as _};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use mmesh_fem::PartFunction;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::{debug, info};

use crate::error::MeshIoError;
use crate::version::XDMF_VERSION;

fn xml_err(e: impl Display) -> MeshIoError {
    MeshIoError::Xml(e.to_string())
}

#[derive(Debug)]
pub struct XdmfFile {
    path: PathBuf,
    name: String,
    steps: Vec<(f64, PartFunction)>,
}

impl XdmfFile {
    /// Create (or truncate) `path`. Missing parent directories are created.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, MeshIoError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| MeshIoError::io(parent, e))?;
        }
        File::create(&path).map_err(|e| MeshIoError::io(&path, e))?;
        Ok(Self { path, name: "u".to_string(), steps: Vec::new() })
    }

    /// Attribute name used for the nodal values (default `u`).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn num_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn write(&mut self, function: &PartFunction, t: f64) -> Result<(), MeshIoError> {
        if function.values.len() != function.mesh.num_vertices() {
            return Err(MeshIoError::Format(format!(
                "function has {} values for {} vertices",
                function.values.len(),
                function.mesh.num_vertices()
            )));
        }
        self.steps.push((t, function.clone()));
        self.flush()?;
        debug!(path = %self.path.display(), t, part = function.part, "wrote XDMF time step");
        Ok(())
    }

    pub fn close(self) -> Result<(), MeshIoError> {
        self.flush()?;
        info!(path = %self.path.display(), steps = self.steps.len(), "closed XDMF file");
        Ok(())
    }

    fn flush(&self) -> Result<(), MeshIoError> {
        let file = File::create(&self.path).map_err(|e| MeshIoError::io(&self.path, e))?;
        let mut out = BufWriter::new(file);
        render(&mut out, &self.name, &self.steps)?;
        out.flush().map_err(|e| MeshIoError::io(&self.path, e))
    }
}

fn data_item<W: Write>(w: &mut Writer<W>, dims: &str, number_type: Option<&str>, text: &str) -> Result<(), MeshIoError> {
    let mut start = BytesStart::new("DataItem");
    start.push_attribute(("Dimensions", dims));
    if let Some(nt) = number_type {
        start.push_attribute(("NumberType", nt));
    }
    start.push_attribute(("Format", "XML"));
    w.write_event(Event::Start(start)).map_err(xml_err)?;
    w.write_event(Event::Text(BytesText::new(text))).map_err(xml_err)?;
    w.write_event(Event::End(BytesEnd::new("DataItem"))).map_err(xml_err)?;
    Ok(())
}

fn rows<const N: usize>(items: impl Iterator<Item = [String; N]>) -> String {
    let mut s = String::new();
    for row in items {
        let _ = writeln!(s, "{}", row.join(" "));
    }
    s.trim_end().to_string()
}

fn render<W: Write>(out: W, name: &str, steps: &[(f64, PartFunction)]) -> Result<(), MeshIoError> {
    let mut w = Writer::new_with_indent(out, b' ', 2);

    w.write_event(Event::Decl(BytesDecl::new("1.0", None, None))).map_err(xml_err)?;
    w.write_event(Event::Start(
        BytesStart::new("Xdmf")
            .with_attributes([("Version", XDMF_VERSION), ("xmlns:xi", "http://www.w3.org/2001/XInclude")]),
    ))
    .map_err(xml_err)?;
    w.write_event(Event::Start(BytesStart::new("Domain"))).map_err(xml_err)?;
    let series = format!("TimeSeries_{name}");
    w.write_event(Event::Start(BytesStart::new("Grid").with_attributes([
        ("Name", series.as_str()),
        ("GridType", "Collection"),
        ("CollectionType", "Temporal"),
    ])))
    .map_err(xml_err)?;

    for (t, f) in steps {
        let mesh = &f.mesh;
        let (nv, nc) = (mesh.num_vertices(), mesh.num_cells());

        w.write_event(Event::Start(
            BytesStart::new("Grid").with_attributes([("Name", "mesh"), ("GridType", "Uniform")]),
        ))
        .map_err(xml_err)?;

        let nc_s = nc.to_string();
        w.write_event(Event::Start(BytesStart::new("Topology").with_attributes([
            ("NumberOfElements", nc_s.as_str()),
            ("TopologyType", "Triangle"),
            ("NodesPerElement", "3"),
        ])))
        .map_err(xml_err)?;
        let topology = rows(mesh.cells().iter().map(|c| c.map(|v| v.to_string())));
        data_item(&mut w, &format!("{nc} 3"), Some("UInt"), &topology)?;
        w.write_event(Event::End(BytesEnd::new("Topology"))).map_err(xml_err)?;

        w.write_event(Event::Start(BytesStart::new("Geometry").with_attributes([("GeometryType", "XY")])))
            .map_err(xml_err)?;
        let geometry = rows(mesh.vertices().iter().map(|p| [p.x.to_string(), p.y.to_string()]));
        data_item(&mut w, &format!("{nv} 2"), None, &geometry)?;
        w.write_event(Event::End(BytesEnd::new("Geometry"))).map_err(xml_err)?;

        let t_s = t.to_string();
        w.write_event(Event::Empty(BytesStart::new("Time").with_attributes([("Value", t_s.as_str())])))
            .map_err(xml_err)?;

        w.write_event(Event::Start(BytesStart::new("Attribute").with_attributes([
            ("Name", name),
            ("AttributeType", "Scalar"),
            ("Center", "Node"),
        ])))
        .map_err(xml_err)?;
        let values = rows(f.values.iter().map(|v| [v.to_string()]));
        data_item(&mut w, &format!("{nv} 1"), None, &values)?;
        w.write_event(Event::End(BytesEnd::new("Attribute"))).map_err(xml_err)?;

        w.write_event(Event::End(BytesEnd::new("Grid"))).map_err(xml_err)?;
    }

    w.write_event(Event::End(BytesEnd::new("Grid"))).map_err(xml_err)?;
    w.write_event(Event::End(BytesEnd::new("Domain"))).map_err(xml_err)?;
    w.write_event(Event::End(BytesEnd::new("Xdmf"))).map_err(xml_err)?;
    w.into_inner().write_all(b"\n").map_err(xml_err)?;
    Ok(())
}
