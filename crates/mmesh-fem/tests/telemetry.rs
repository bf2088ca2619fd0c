use mmesh_fem::{AssemblyStats, SolveTelemetry};

#[test]
fn telemetry_omits_missing_sections() {
    let t = SolveTelemetry::new("run");
    let json = serde_json::to_value(&t).unwrap();
    assert_eq!(json["op"], "run");
    assert_eq!(json["ok"], false);
    assert!(json.get("solver").is_none());
    assert!(json.get("error_code").is_none());
}

#[test]
fn telemetry_round_trips() {
    let mut t = SolveTelemetry::new("run");
    t.ok = true;
    t.dofs = 12;
    t.assembly = Some(AssemblyStats { uncut_cells: 3, nnz: 40, ..AssemblyStats::default() });
    let back: SolveTelemetry = serde_json::from_str(&serde_json::to_string(&t).unwrap()).unwrap();
    assert_eq!(back, t);
}
