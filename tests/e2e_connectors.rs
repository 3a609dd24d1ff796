//! End-to-end tests for connector routing on top of real layouts.
//!
//! Each test: people + relationships -> LayoutEngine -> ConnectionRenderer.

use family_tree::{
    ConnectionRenderer, Connector, ConnectorKind, LayoutEngine, Person, PersonId, Point, PositionMap, Relationship, Shape,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

fn people(ids: &[&str]) -> Vec<Person> {
    ids.iter().map(|id| Person::new(*id, id.to_uppercase())).collect()
}

fn route(people: &[Person], rels: &[Relationship]) -> (PositionMap, Vec<Connector>) {
    let positions = LayoutEngine::default().generate_layout(people, rels).positions();
    let connectors = ConnectionRenderer::default().render(people, rels, &positions);
    (positions, connectors)
}

fn count(connectors: &[Connector], pred: impl Fn(&ConnectorKind) -> bool) -> usize {
    connectors.iter().filter(|c| pred(&c.kind)).count()
}

fn is_spouse(k: &ConnectorKind) -> bool {
    matches!(k, ConnectorKind::Spouse { .. })
}

fn is_direct(k: &ConnectorKind) -> bool {
    matches!(k, ConnectorKind::ParentChild { .. })
}

fn couple_with_children(n: usize) -> (Vec<Person>, Vec<Relationship>) {
    let mut ids = vec!["a".to_string(), "b".to_string()];
    let mut rels = vec![Relationship::spouse("a", "b")];
    for i in 0..n {
        let kid = format!("k{i}");
        rels.push(Relationship::parent("a", kid.as_str()));
        rels.push(Relationship::parent("b", kid.as_str()));
        ids.push(kid);
    }
    let people = ids.iter().map(|id| Person::new(id.as_str(), id.as_str())).collect();
    (people, rels)
}

// ============================================================================
// 1. Example scenario
// ============================================================================

#[test]
fn test_example_scenario() {
    let (_, out) = route(
        &people(&["a", "b", "c"]),
        &[
            Relationship::spouse("a", "b"),
            Relationship::parent("a", "c"),
            Relationship::parent("b", "c"),
        ],
    );
    assert_eq!(count(&out, is_spouse), 1);
    assert_eq!(count(&out, |k| matches!(k, ConnectorKind::CoupleChild { .. })), 1);
    assert_eq!(count(&out, is_direct), 0);
    assert!(out.iter().all(Connector::is_orthogonal));
}

// ============================================================================
// 2. Spouse pairs are drawn once
// ============================================================================

#[test]
fn test_spouse_rows_in_both_directions_render_once() {
    let rels = vec![
        Relationship::spouse("a", "b"),
        Relationship::spouse("b", "a"),
        Relationship::spouse("a", "b"),
    ];
    let (_, out) = route(&people(&["a", "b"]), &rels);
    assert_eq!(count(&out, is_spouse), 1);
    assert_eq!(out.iter().filter(|c| c.is_marker()).count(), 1);
}

#[test]
fn test_marker_sits_between_cards() {
    let (positions, out) = route(&people(&["a", "b"]), &[Relationship::spouse("a", "b")]);
    let a = positions[&PersonId::from("a")].center();
    let b = positions[&PersonId::from("b")].center();
    let marker = out.iter().find_map(|c| match c.shape {
        Shape::Marker { center, .. } => Some(center),
        Shape::Polyline(_) => None,
    });
    assert_eq!(marker, Some(a.midpoint(b)));
}

// ============================================================================
// 3. Couple routing supersedes direct edges
// ============================================================================

#[test]
fn test_couple_children_get_no_direct_edges() {
    let (people, rels) = couple_with_children(3);
    let (_, out) = route(&people, &rels);
    assert_eq!(count(&out, is_direct), 0);
    assert_eq!(count(&out, |k| matches!(k, ConnectorKind::Stem { .. })), 3);
}

#[test]
fn test_child_of_other_partner_gets_direct_edges() {
    // c's parents are a and x, but a is married to b
    let rels = vec![
        Relationship::spouse("a", "b"),
        Relationship::parent("a", "c"),
        Relationship::parent("x", "c"),
    ];
    let (_, out) = route(&people(&["a", "b", "c", "x"]), &rels);
    assert_eq!(count(&out, is_direct), 2);
    assert_eq!(count(&out, |k| matches!(k, ConnectorKind::CoupleChild { .. })), 0);
}

#[test]
fn test_single_parent_child_routes_through_couple() {
    let rels = vec![Relationship::spouse("a", "b"), Relationship::parent("b", "c")];
    let (_, out) = route(&people(&["a", "b", "c"]), &rels);
    assert_eq!(count(&out, |k| matches!(k, ConnectorKind::CoupleChild { .. })), 1);
    assert_eq!(count(&out, is_direct), 0);
}

// ============================================================================
// 4. Single vs multi-child routing
// ============================================================================

#[test]
fn test_single_child_is_one_elbow_from_marker() {
    let (people, rels) = couple_with_children(1);
    let (positions, out) = route(&people, &rels);
    let marker = out.iter().find(|c| c.is_marker()).unwrap();
    let Shape::Marker { center, .. } = marker.shape else { unreachable!() };

    let elbow = out
        .iter()
        .find(|c| matches!(c.kind, ConnectorKind::CoupleChild { .. }))
        .unwrap();
    let pts = elbow.points();
    assert_eq!(pts.len(), 4);
    assert_eq!(pts[0], center);
    let kid = positions[&PersonId::from("k0")].center();
    assert_eq!(pts[3], Point::new(kid.x, kid.y - 90.0));
    assert_eq!(count(&out, |k| matches!(k, ConnectorKind::Bar { .. })), 0);
}

#[test]
fn test_bar_spans_exactly_the_children() {
    let (people, rels) = couple_with_children(4);
    let (positions, out) = route(&people, &rels);

    let xs: Vec<f64> = (0..4).map(|i| positions[&PersonId::new(format!("k{i}"))].x).collect();
    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let bar = out.iter().find(|c| matches!(c.kind, ConnectorKind::Bar { .. })).unwrap();
    let pts = bar.points();
    assert_eq!((pts[0].x, pts[1].x), (lo, hi));
    assert_eq!(pts[0].y, pts[1].y);

    let trunk = out.iter().find(|c| matches!(c.kind, ConnectorKind::Trunk { .. })).unwrap();
    assert_eq!(trunk.points()[1].y, pts[0].y);
    assert_eq!(count(&out, |k| matches!(k, ConnectorKind::CoupleChild { .. })), 0);
}

#[test]
fn test_svg_paths_for_every_polyline() {
    let (people, rels) = couple_with_children(2);
    let (_, out) = route(&people, &rels);
    for c in &out {
        match c.shape {
            Shape::Polyline(_) => assert!(c.svg_path().unwrap().starts_with('M')),
            Shape::Marker { .. } => assert!(c.svg_path().is_none()),
        }
    }
}
