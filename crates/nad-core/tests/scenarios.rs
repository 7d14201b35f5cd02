//! Integration tests: concrete drag scenarios on fixture diagrams.

use nad_core::geometry::rotation_deg;
use nad_core::{
    Affine, Diagram, DiagramId, EngineConfig, FragmentTransform, GeometryCache, GeometryError,
    NodeMove, Point, RenderedScene, Reprojection, Target, Vec2, reproject,
};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected ~{expected}, got {actual}"
    );
}

fn load(json: &str) -> Diagram {
    Diagram::from_json(json).unwrap()
}

fn run(
    d: &Diagram,
    scene: &impl RenderedScene,
    config: &EngineConfig,
    node: &str,
    to: Point,
) -> Reprojection {
    let id = DiagramId::intern(node);
    let from = d.node(id).unwrap().original();
    let mut cache = GeometryCache::new();
    reproject(d, scene, &mut cache, config, NodeMove::new(id, from, to))
}

/// Scene that hides some nodes and lacks some fragments.
struct PartialScene<'a> {
    diagram: &'a Diagram,
    hidden: HashSet<DiagramId>,
    missing: HashSet<DiagramId>,
}

impl<'a> PartialScene<'a> {
    fn new(diagram: &'a Diagram) -> Self {
        Self {
            diagram,
            hidden: HashSet::new(),
            missing: HashSet::new(),
        }
    }
}

impl RenderedScene for PartialScene<'_> {
    fn node_position(&self, id: DiagramId) -> Option<Point> {
        if self.hidden.contains(&id) {
            return None;
        }
        self.diagram.node_position(id)
    }

    fn contains_fragment(&self, id: DiagramId) -> bool {
        !self.missing.contains(&id)
    }
}

// ─── Scenario A: plain edge ──────────────────────────────────────────────

#[test]
fn scenario_a_rotates_and_stretches() {
    let d = load(include_str!("fixtures/two_bus.json"));
    let out = run(&d, &d, &EngineConfig::default(), "vl-p", Point::new(0.0, 50.0));

    let frame = out.frame("line-pq".into()).unwrap();
    assert_eq!(frame.budget.total(), 20.0);
    close(frame.d0, 100.0, 1e-12);
    close(frame.d1, 111.803_398_874_989_5, 1e-9);
    close(frame.scale, (111.803_398_874_989_5 - 20.0) / 80.0, 1e-9);
    close(frame.scale, 1.148, 1e-3);
    close(frame.a0, 0.0, 1e-12);
    close(frame.a1, -26.565_051_177_077_99, 1e-9);
    assert!(out.recovered.is_empty());

    // Every part is a full matrix; node labels are plain translations.
    for p in &d.edge("line-pq".into()).unwrap().parts {
        assert!(matches!(out.get(Target::Part(p.id)), Some(FragmentTransform::Matrix(_))));
    }
    assert_eq!(
        out.get(Target::Label("vl-p-textnode".into())),
        Some(FragmentTransform::Translate(Vec2::new(0.0, 50.0)))
    );
}

// ─── Scenario B: dangling line ───────────────────────────────────────────

#[test]
fn scenario_b_rotates_boundary_node() {
    let d = load(include_str!("fixtures/dangling.json"));
    let out = run(&d, &d, &EngineConfig::default(), "vl-d", Point::new(0.0, 50.0));

    let frame = out.frame("dl-1".into()).unwrap();
    assert_eq!(frame.budget.total(), 20.0);
    close(frame.rotation_delta(), -26.565_051_177_077_99, 1e-9);

    let Some(FragmentTransform::Matrix(rotation)) =
        out.get(Target::BoundaryRotation("bn-d".into()))
    else {
        panic!("boundary node was not rotated");
    };
    close(rotation_deg(rotation), -26.57, 1e-2);
    assert_eq!(rotation.translation(), Vec2::ZERO);
}

#[test]
fn dragging_the_boundary_node_also_rotates_it() {
    let d = load(include_str!("fixtures/dangling.json"));
    let out = run(&d, &d, &EngineConfig::default(), "bn-d", Point::new(0.0, 100.0));
    let m = out
        .get(Target::BoundaryRotation("bn-d".into()))
        .unwrap()
        .to_affine();
    // Direction bn → vl turns from 180° to -90°.
    close(rotation_deg(m), 90.0, 1e-9);
}

#[test]
fn translated_dangling_line_drops_earlier_boundary_rotation() {
    let mut d = load(include_str!("fixtures/dangling.json"));
    let mut cache = GeometryCache::new();
    let config = EngineConfig::default();
    let (vl, bn) = (DiagramId::intern("vl-d"), DiagramId::intern("bn-d"));
    let rotation = Target::BoundaryRotation(bn);

    let to = Point::new(0.0, 50.0);
    reproject(&d, &d, &mut cache, &config, NodeMove::new(vl, Point::ZERO, to));
    d.set_position(vl, to);
    close(rotation_deg(cache.matrix_of(rotation).unwrap()), -26.57, 1e-2);

    // With the voltage level hidden, dragging the boundary only translates.
    let mut scene = PartialScene::new(&d);
    scene.hidden.insert(vl);
    let from = Point::new(100.0, 0.0);
    let out = reproject(
        &d,
        &scene,
        &mut cache,
        &config,
        NodeMove::new(bn, from, Point::new(120.0, 30.0)),
    );

    assert!(out.frame("dl-1".into()).is_none());
    assert_eq!(
        out.get(Target::Part("dl-1-line".into())),
        Some(FragmentTransform::Translate(Vec2::new(20.0, 30.0)))
    );
    assert_eq!(
        out.get(rotation),
        Some(FragmentTransform::Matrix(Affine::IDENTITY))
    );
    assert_eq!(cache.matrix_of(rotation), Some(Affine::IDENTITY));
}

// ─── Scenario C: hidden sibling ──────────────────────────────────────────

#[test]
fn scenario_c_hidden_sibling_translates_everything() {
    init_logger();
    let d = load(include_str!("fixtures/two_bus.json"));
    let mut scene = PartialScene::new(&d);
    scene.hidden.insert("vl-q".into());
    let to = Point::new(12.0, -7.0);
    let out = run(&d, &scene, &EngineConfig::default(), "vl-p", to);

    let delta = to - Point::ZERO;
    let edge = d.edge("line-pq".into()).unwrap();
    for p in &edge.parts {
        assert_eq!(out.get(Target::Part(p.id)), Some(FragmentTransform::Translate(delta)));
    }
    assert!(out.iter().all(|u| u.transform.is_translate()));
    assert!(out.frame("line-pq".into()).is_none());

    let json: serde_json::Value = serde_json::from_str(&out.to_json().unwrap()).unwrap();
    for record in json.as_array().unwrap() {
        assert!(record.get("matrix").is_none());
        assert_eq!(record["translate"], serde_json::json!([12.0, -7.0]));
    }
}

// ─── Three-terminal members ──────────────────────────────────────────────

#[test]
fn three_terminal_center_side_keeps_fixed_margin() {
    let d = load(include_str!("fixtures/three_winding.json"));
    let out = run(&d, &d, &EngineConfig::default(), "t3-vl1", Point::new(200.0, 0.0));

    let frame = out.frame("t3-leg1".into()).unwrap();
    // Explicit winding decoration is 5, the margin of 20 wins.
    assert_eq!(frame.budget.side1, 20.0);
    assert_eq!(frame.budget.side2, 0.0);
    close(frame.scale, (200.0 - 20.0) / (100.0 - 20.0), 1e-12);

    let config = EngineConfig {
        three_terminal_margin: 0.0,
        ..Default::default()
    };
    let out = run(&d, &d, &config, "t3-vl1", Point::new(200.0, 0.0));
    assert_eq!(out.frame("t3-leg1".into()).unwrap().budget.side1, 5.0);
}

#[test]
fn moving_the_center_updates_all_three_legs() {
    let d = load(include_str!("fixtures/three_winding.json"));
    let out = run(&d, &d, &EngineConfig::default(), "t3-center", Point::new(10.0, 10.0));

    let legs: Vec<&str> = out.frames.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(legs, vec!["t3-leg1", "t3-leg2", "t3-leg3"]);
    // The center is node 2 of the third leg.
    let leg3 = out.frame("t3-leg3".into()).unwrap();
    assert_eq!(leg3.budget.side1, 0.0);
    assert_eq!(leg3.budget.side2, 20.0);
}

#[test]
fn short_three_terminal_leg_never_collapses() {
    init_logger();
    let d = load(
        r#"{
        "nodes": [
            { "diagramId": "sl-center", "equipmentId": "T3", "x": 0, "y": 0,
              "kind": "three-winding-center" },
            { "diagramId": "sl-vl", "equipmentId": "VL", "x": 15, "y": 0 }
        ],
        "edges": [
            { "diagramId": "sl-leg", "node1": "sl-center", "node2": "sl-vl",
              "markers": ["three-terminal-member"],
              "parts": [ { "id": "sl-leg-line", "markers": ["stretchable"] } ] }
        ]
    }"#,
    );
    let out = run(&d, &d, &EngineConfig::default(), "sl-vl", Point::new(100.0, 0.0));

    let frame = out.frame("sl-leg".into()).unwrap();
    // The margin of 20 does not fit a leg of 15.
    assert_eq!(frame.budget.side1, 15.0);
    assert_eq!(frame.d0, 15.0);
    assert_eq!(frame.scale, 1.0);
    assert_eq!(
        out.recovered,
        vec![GeometryError::DegenerateGeometry {
            edge: "sl-leg".into()
        }]
    );

    // The line keeps its length and follows the moved node.
    let m = out.get(Target::Part("sl-leg-line".into())).unwrap().to_affine();
    let end = m * Point::new(15.0, 0.0);
    close(end.x, 100.0, 1e-9);
    close(end.y, 0.0, 1e-9);
}

// ─── Recovered failures ──────────────────────────────────────────────────

#[test]
fn missing_endpoint_degrades_to_translation() {
    init_logger();
    let d = load(include_str!("fixtures/loop_and_orphan.json"));
    let to = Point::new(30.0, 30.0);
    let out = run(&d, &d, &EngineConfig::default(), "lo-a", to);

    assert!(out.recovered.contains(&GeometryError::MissingEndpoint {
        edge: "lo-ghost".into(),
        node: "lo-missing".into(),
    }));
    assert_eq!(
        out.get(Target::Part("lo-ghost-line".into())),
        Some(FragmentTransform::Translate(to - Point::new(10.0, 10.0)))
    );
}

#[test]
fn unresolved_fragment_is_skipped_alone() {
    init_logger();
    let d = load(include_str!("fixtures/two_bus.json"));
    let mut scene = PartialScene::new(&d);
    scene.missing.insert("line-pq-arrow".into());
    scene.missing.insert("vl-p-textedge".into());
    let out = run(&d, &scene, &EngineConfig::default(), "vl-p", Point::new(0.0, 50.0));

    assert_eq!(
        out.recovered,
        vec![GeometryError::UnresolvedFragment {
            edge: "line-pq".into(),
            fragment: "line-pq-arrow".into(),
        }]
    );
    assert!(out.get(Target::Part("line-pq-arrow".into())).is_none());
    assert!(out.get(Target::Part("line-pq-body".into())).is_some());
    // Missing labels are not an error: the conventional ids are optional.
    assert!(out.get(Target::Label("vl-p-textedge".into())).is_none());
    assert!(out.get(Target::Label("vl-p-textnode".into())).is_some());
}

// ─── Configuration ───────────────────────────────────────────────────────

#[test]
fn scale_all_parts_ignores_fixed_budget() {
    let d = load(include_str!("fixtures/two_bus.json"));
    let config = EngineConfig {
        scale_all_parts: true,
        ..Default::default()
    };
    let to = Point::new(-100.0, 0.0);
    let out = run(&d, &d, &config, "vl-p", to);

    let frame = out.frame("line-pq".into()).unwrap();
    assert_eq!(frame.budget.total(), 0.0);
    close(frame.scale, 2.0, 1e-12);

    // A fixed decoration now stretches with the line.
    let m = out
        .get(Target::Part("line-pq-breaker1".into()))
        .unwrap()
        .to_affine();
    let far = m * Point::new(10.0, 0.0);
    close(far.x, -80.0, 1e-9);
}

#[test]
fn summary_reports_final_positions_by_equipment() {
    let mut d = load(include_str!("fixtures/two_bus.json"));
    d.set_position("vl-p".into(), Point::new(0.0, 50.0));
    assert_eq!(
        d.position_summary().to_json().unwrap(),
        r#"{"VL_P":{"x":0.0,"y":50.0},"VL_Q":{"x":100.0,"y":0.0}}"#
    );
}
