//! Generational depth assignment.
//!
//! 1. Depth-first walk up the parent edges with an on-stack set. An edge that
//!    points back into the stack closes a cycle; it is dropped and reported.
//!    The post-order of that walk is a topological order (parents first).
//! 2. Monotone relaxation until nothing moves, starting from 0:
//!    - child = max(parent depths) + 1
//!    - spouses take the deeper of their two depths
//!
//!    Both rules only ever increase a depth, so on consistent data the loop
//!    settles on the smallest depths satisfying both. Contradictory data
//!    (someone married to their own ancestor) cannot settle; it is cut off
//!    after a fixed number of rounds and reported.
//! 3. One pass over unmarried people without parents: each moves down to sit
//!    right above their shallowest child. No spouse depends on them, so this
//!    cannot undo step 2.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::diagnostics::{DiagnosticEvent, Diagnostics};
use crate::kinship::Kinship;
use crate::model::{Person, PersonId};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnStack,
    Done,
}

struct Frame<'a> {
    node: &'a PersonId,
    parents: Vec<&'a PersonId>,
    next: usize,
}

/// Acyclic view of the parent edges plus a parents-first ordering.
struct ParentDag<'a> {
    parents: HashMap<&'a PersonId, Vec<&'a PersonId>>,
    children: HashMap<&'a PersonId, Vec<&'a PersonId>>,
    topo: Vec<&'a PersonId>,
}

fn break_cycles<'a>(people: &'a [Person], kin: &'a Kinship, diag: &dyn Diagnostics) -> ParentDag<'a> {
    let mut marks: HashMap<&PersonId, Mark> = HashMap::new();
    let mut broken: HashSet<(&PersonId, &PersonId)> = HashSet::new();
    let mut topo = Vec::with_capacity(people.len());

    let parent_list = |id: &PersonId| -> Vec<&'a PersonId> {
        kin.parents_of(id).map(|set| set.iter().collect()).unwrap_or_default()
    };

    for person in people {
        let root = &person.id;
        if marks.contains_key(root) {
            continue;
        }
        marks.insert(root, Mark::OnStack);
        let mut stack = vec![Frame { node: root, parents: parent_list(root), next: 0 }];

        while let Some(frame) = stack.last_mut() {
            if frame.next < frame.parents.len() {
                let (node, parent) = (frame.node, frame.parents[frame.next]);
                frame.next += 1;
                match marks.get(parent) {
                    Some(Mark::OnStack) => {
                        broken.insert((parent, node));
                        diag.record(DiagnosticEvent::CycleBroken {
                            parent: parent.clone(),
                            child: node.clone(),
                        });
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(parent, Mark::OnStack);
                        stack.push(Frame { node: parent, parents: parent_list(parent), next: 0 });
                    }
                }
            } else {
                let node = frame.node;
                marks.insert(node, Mark::Done);
                topo.push(node);
                stack.pop();
            }
        }
    }

    let mut parents: HashMap<&PersonId, Vec<&PersonId>> = HashMap::new();
    let mut children: HashMap<&PersonId, Vec<&PersonId>> = HashMap::new();
    for (parent, child) in kin.parent_edges() {
        if broken.contains(&(parent, child)) {
            continue;
        }
        parents.entry(child).or_default().push(parent);
        children.entry(parent).or_default().push(child);
    }

    ParentDag { parents, children, topo }
}

/// Depth for every person that takes part in at least one edge.
///
/// People without any parent or spouse edge are left out; the caller places
/// them in the overflow row.
pub fn assign_depths(people: &[Person], kin: &Kinship, diag: &dyn Diagnostics) -> BTreeMap<PersonId, u32> {
    let dag = break_cycles(people, kin, diag);
    let spouse_pairs = kin.spouse_pairs();

    let mut depth: HashMap<&PersonId, u32> =
        people.iter().filter(|p| kin.is_connected(&p.id)).map(|p| (&p.id, 0)).collect();

    let max_rounds = 2 * people.len() + 2;
    let mut settled = false;

    for _ in 0..max_rounds {
        let mut changed = false;

        for &child in &dag.topo {
            let Some(parents) = dag.parents.get(child) else { continue };
            let wanted = parents.iter().map(|p| depth.get(p).copied().unwrap_or(0)).max().unwrap_or(0) + 1;
            if let Some(d) = depth.get_mut(child) {
                if wanted > *d {
                    *d = wanted;
                    changed = true;
                }
            }
        }

        for (a, b) in &spouse_pairs {
            let (da, db) = (depth.get(a).copied().unwrap_or(0), depth.get(b).copied().unwrap_or(0));
            if da != db {
                let deeper = da.max(db);
                depth.insert(a, deeper);
                depth.insert(b, deeper);
                changed = true;
            }
        }

        if !changed {
            settled = true;
            break;
        }
    }

    if !settled {
        diag.record(DiagnosticEvent::LayoutNotConverged { rounds: max_rounds });
    }

    for &person in &dag.topo {
        if dag.parents.contains_key(person) || kin.spouses_of(person).is_some_and(|s| !s.is_empty()) {
            continue;
        }
        let Some(kids) = dag.children.get(person) else { continue };
        let Some(shallowest) = kids.iter().filter_map(|k| depth.get(k).copied()).min() else {
            continue;
        };
        if let Some(d) = depth.get_mut(person) {
            *d = (*d).max(shallowest.saturating_sub(1));
        }
    }

    depth.into_iter().map(|(id, d)| (id.clone(), d)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingDiagnostics, NoopDiagnostics};
    use crate::model::Relationship;

    fn people(ids: &[&str]) -> Vec<Person> {
        ids.iter().map(|id| Person::new(*id, *id)).collect()
    }

    fn depths(ids: &[&str], rels: &[Relationship]) -> BTreeMap<PersonId, u32> {
        let people = people(ids);
        let kin = Kinship::build(&people, rels, &NoopDiagnostics);
        assign_depths(&people, &kin, &NoopDiagnostics)
    }

    fn d(map: &BTreeMap<PersonId, u32>, id: &str) -> u32 {
        map[&PersonId::from(id)]
    }

    #[test]
    fn test_spouse_without_parents_joins_partner_row() {
        let rels = vec![
            Relationship::parent("gp", "a"),
            Relationship::spouse("b", "a"),
            Relationship::parent("a", "c"),
            Relationship::parent("b", "c"),
        ];
        let m = depths(&["a", "b", "c", "gp"], &rels);
        assert_eq!((d(&m, "gp"), d(&m, "a"), d(&m, "b"), d(&m, "c")), (0, 1, 1, 2));
    }

    #[test]
    fn test_cycle_is_broken_not_looped() {
        let diag = CollectingDiagnostics::new();
        let people = people(&["a", "b", "c"]);
        let rels = vec![
            Relationship::parent("a", "b"),
            Relationship::parent("b", "c"),
            Relationship::parent("c", "a"),
        ];
        let kin = Kinship::build(&people, &rels, &NoopDiagnostics);
        let m = assign_depths(&people, &kin, &*diag);
        assert_eq!(m.len(), 3);
        assert_eq!(
            diag.count(|e| matches!(e, DiagnosticEvent::CycleBroken { .. })),
            1
        );
        // the two surviving edges still point downwards
        let surviving = [("a", "b"), ("b", "c"), ("c", "a")]
            .iter()
            .filter(|(p, c)| d(&m, c) > d(&m, p))
            .count();
        assert_eq!(surviving, 2);
    }

    #[test]
    fn test_married_to_own_ancestor_terminates() {
        let diag = CollectingDiagnostics::new();
        let people = people(&["a", "b"]);
        let rels = vec![Relationship::parent("a", "b"), Relationship::spouse("a", "b")];
        let kin = Kinship::build(&people, &rels, &NoopDiagnostics);
        let m = assign_depths(&people, &kin, &*diag);
        assert_eq!(m.len(), 2);
        assert_eq!(
            diag.count(|e| matches!(e, DiagnosticEvent::LayoutNotConverged { .. })),
            1
        );
    }

    #[test]
    fn test_in_law_root_moves_down_to_child() {
        // x has no parents and one child c at depth 2
        let rels = vec![
            Relationship::parent("g", "p"),
            Relationship::parent("p", "c"),
            Relationship::parent("x", "c"),
        ];
        let m = depths(&["c", "g", "p", "x"], &rels);
        assert_eq!(d(&m, "x"), 1);
        assert_eq!(d(&m, "c"), 2);
    }

    #[test]
    fn test_married_in_law_stays_with_spouse() {
        // a+b married, b -> c -> d, a -> e, d+e married
        let rels = vec![
            Relationship::spouse("a", "b"),
            Relationship::parent("b", "c"),
            Relationship::parent("c", "d"),
            Relationship::parent("a", "e"),
            Relationship::spouse("d", "e"),
        ];
        let m = depths(&["a", "b", "c", "d", "e"], &rels);
        assert_eq!(
            (d(&m, "a"), d(&m, "b"), d(&m, "c"), d(&m, "d"), d(&m, "e")),
            (0, 0, 1, 2, 2)
        );
    }

    #[test]
    fn test_parents_at_different_depths() {
        // k's parents are g (row 0) and p (row 1)
        let rels = vec![
            Relationship::parent("g", "p"),
            Relationship::parent("g", "k"),
            Relationship::parent("p", "k"),
            Relationship::spouse("k", "s"),
        ];
        let m = depths(&["g", "k", "p", "s"], &rels);
        assert_eq!((d(&m, "g"), d(&m, "p"), d(&m, "k"), d(&m, "s")), (0, 1, 2, 2));
    }

    #[test]
    fn test_isolated_people_have_no_depth() {
        let m = depths(&["a", "b", "solo"], &[Relationship::spouse("a", "b")]);
        assert!(!m.contains_key(&PersonId::from("solo")));
        assert_eq!(d(&m, "a"), d(&m, "b"));
    }
}
