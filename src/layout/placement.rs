//! Horizontal placement of generational rows.
//!
//! A row is a sequence of *units*: a spouse group (everyone linked by spouse
//! edges inside the same row) or a single person. Rows are placed top-down:
//! units that share the same set of parents form a sibling block centered
//! under those parents, blocks are laid left to right and pushed right until
//! they clear their left neighbour. A bottom-up pass then slides each unit
//! toward the middle of its children as far as its neighbours allow.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use crate::config::LayoutConfig;
use crate::kinship::Kinship;
use crate::model::{LayoutNode, Person, PersonId};

struct Unit<'a> {
    members: Vec<&'a PersonId>,
    /// Already placed parents of any member, sorted.
    parent_key: Vec<&'a PersonId>,
    anchor: Option<f64>,
    component: usize,
    birth: i32,
}

pub(super) fn place(
    people: &[Person],
    kin: &Kinship,
    depths: &BTreeMap<PersonId, u32>,
    config: &LayoutConfig,
) -> Vec<LayoutNode> {
    let unit_pitch = config.card_width + config.h_gap;
    let components = components(people, kin);
    let births: HashMap<&PersonId, i32> = people
        .iter()
        .map(|p| (&p.id, p.birth_year.unwrap_or(i32::MAX)))
        .collect();

    let mut rows: BTreeMap<u32, Vec<&PersonId>> = BTreeMap::new();
    for (id, d) in depths {
        rows.entry(*d).or_default().push(id);
    }

    let mut x: HashMap<&PersonId, f64> = HashMap::new();
    let mut placed_rows: Vec<(u32, Vec<Vec<&PersonId>>)> = Vec::new();

    for (&row_depth, row) in &rows {
        let mut units: Vec<Unit> = spouse_groups(row, kin, depths, row_depth)
            .into_iter()
            .map(|members| {
                let mut parent_key: Vec<&PersonId> = members
                    .iter()
                    .filter_map(|m| kin.parents_of(m))
                    .flatten()
                    .filter(|p| x.contains_key(p))
                    .collect();
                parent_key.sort();
                parent_key.dedup();
                let anchor = mean(parent_key.iter().map(|p| x[p]));
                let mut members = members;
                order_pair_by_parents(&mut members, kin, &x);
                let component = components.get(members[0]).copied().unwrap_or(usize::MAX);
                let birth = members.iter().map(|m| births[m]).min().unwrap_or(i32::MAX);
                Unit { members, parent_key, anchor, component, birth }
            })
            .collect();

        units.sort_by(|a, b| {
            a.component
                .cmp(&b.component)
                .then(a.anchor.is_none().cmp(&b.anchor.is_none()))
                .then(a.anchor.unwrap_or(0.0).total_cmp(&b.anchor.unwrap_or(0.0)))
                .then_with(|| a.parent_key.cmp(&b.parent_key))
                .then(a.birth.cmp(&b.birth))
                .then_with(|| a.members[0].cmp(b.members[0]))
        });

        let mut last_center: Option<f64> = None;
        let mut start = 0;
        while start < units.len() {
            let mut end = start + 1;
            if !units[start].parent_key.is_empty() {
                while end < units.len() && units[end].parent_key == units[start].parent_key {
                    end += 1;
                }
            }
            let block = &units[start..end];

            let span: f64 = block.iter().map(|u| unit_span(u.members.len(), config)).sum::<f64>()
                + (block.len() - 1) as f64 * unit_pitch;
            let floor = last_center.map(|c| c + unit_pitch);
            let first = match (block[0].anchor, floor) {
                (Some(anchor), Some(floor)) => (anchor - span / 2.0).max(floor),
                (Some(anchor), None) => anchor - span / 2.0,
                (None, Some(floor)) => floor,
                (None, None) => 0.0,
            };

            let mut cursor = first;
            for unit in block {
                for (i, member) in unit.members.iter().enumerate() {
                    x.insert(*member, cursor + i as f64 * config.spouse_pitch());
                }
                cursor += unit_span(unit.members.len(), config);
                last_center = Some(cursor);
                cursor += unit_pitch;
            }
            start = end;
        }

        placed_rows.push((row_depth, units.into_iter().map(|u| u.members).collect()));
    }

    center_over_children(&placed_rows, kin, depths, &mut x, unit_pitch);

    let mut nodes: Vec<LayoutNode> = depths
        .iter()
        .filter_map(|(id, d)| {
            x.get(id).map(|&cx| LayoutNode::new(id.clone(), cx, *d as f64 * config.row_pitch(), *d))
        })
        .collect();

    let overflow_depth = depths.values().max().map_or(0, |d| d + 1);
    let overflow_y = overflow_depth as f64 * config.row_pitch();
    let isolated = people.iter().filter(|p| !depths.contains_key(&p.id));
    for (i, person) in isolated.enumerate() {
        nodes.push(LayoutNode::new(
            person.id.clone(),
            i as f64 * unit_pitch,
            overflow_y,
            overflow_depth,
        ));
    }

    nodes
}

/// Center-to-center width of a unit with `members` cards.
fn unit_span(members: usize, config: &LayoutConfig) -> f64 {
    members.saturating_sub(1) as f64 * config.spouse_pitch()
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Connected components over parent and spouse edges, numbered in id order.
fn components<'a>(people: &'a [Person], kin: &'a Kinship) -> HashMap<&'a PersonId, usize> {
    let mut component: HashMap<&PersonId, usize> = HashMap::new();
    let mut next = 0;
    for person in people {
        if component.contains_key(&person.id) || !kin.is_connected(&person.id) {
            continue;
        }
        let mut queue = VecDeque::from([&person.id]);
        component.insert(&person.id, next);
        while let Some(id) = queue.pop_front() {
            let neighbours = [kin.parents_of(id), kin.children_of(id), kin.spouses_of(id)];
            for other in neighbours.into_iter().flatten().flatten() {
                if !component.contains_key(other) {
                    component.insert(other, next);
                    queue.push_back(other);
                }
            }
        }
        next += 1;
    }
    component
}

/// Split a row into spouse groups, each in chain order.
fn spouse_groups<'a>(
    row: &[&'a PersonId],
    kin: &'a Kinship,
    depths: &BTreeMap<PersonId, u32>,
    row_depth: u32,
) -> Vec<Vec<&'a PersonId>> {
    let same_row_spouses = |id: &PersonId| -> Vec<&'a PersonId> {
        kin.spouses_of(id)
            .map(|set| set.iter().filter(|s| depths.get(*s) == Some(&row_depth)).collect())
            .unwrap_or_default()
    };

    let mut seen: BTreeSet<&PersonId> = BTreeSet::new();
    let mut groups = Vec::new();
    for &id in row {
        if seen.contains(id) {
            continue;
        }
        let mut group: BTreeSet<&PersonId> = BTreeSet::new();
        let mut queue = VecDeque::from([id]);
        group.insert(id);
        while let Some(cur) = queue.pop_front() {
            for s in same_row_spouses(cur) {
                if group.insert(s) {
                    queue.push_back(s);
                }
            }
        }
        seen.extend(group.iter().copied());

        // walk from a chain end so spouses sit next to each other
        let start = group
            .iter()
            .copied()
            .min_by_key(|m| (same_row_spouses(m).len(), *m))
            .unwrap_or(id);
        let mut order = Vec::with_capacity(group.len());
        let mut visited: BTreeSet<&PersonId> = BTreeSet::new();
        let mut stack = vec![start];
        while let Some(cur) = stack.pop() {
            if !visited.insert(cur) {
                continue;
            }
            order.push(cur);
            let mut next = same_row_spouses(cur);
            next.retain(|s| !visited.contains(*s));
            next.reverse();
            stack.extend(next);
        }
        groups.push(order);
    }
    groups
}

/// For a couple, put the partner whose parents sit further left on the left.
fn order_pair_by_parents(members: &mut [&PersonId], kin: &Kinship, x: &HashMap<&PersonId, f64>) {
    if members.len() != 2 {
        return;
    }
    let own_anchor = |id: &PersonId| {
        kin.parents_of(id)
            .and_then(|ps| mean(ps.iter().filter_map(|p| x.get(p).copied())))
    };
    if let (Some(left), Some(right)) = (own_anchor(members[0]), own_anchor(members[1])) {
        if right < left {
            members.swap(0, 1);
        }
    }
}

fn center_over_children(
    rows: &[(u32, Vec<Vec<&PersonId>>)],
    kin: &Kinship,
    depths: &BTreeMap<PersonId, u32>,
    x: &mut HashMap<&PersonId, f64>,
    unit_pitch: f64,
) {
    for (row_depth, units) in rows.iter().rev() {
        for i in 0..units.len() {
            let members = &units[i];
            let kids: Vec<f64> = members
                .iter()
                .filter_map(|m| kin.children_of(m))
                .flatten()
                .filter(|k| depths.get(*k) == Some(&(row_depth + 1)))
                .filter_map(|k| x.get(k).copied())
                .collect();
            if kids.is_empty() {
                continue;
            }
            let lo = kids.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = kids.iter().copied().fold(f64::NEG_INFINITY, f64::max);

            let first = x[members[0]];
            let last = x[members[members.len() - 1]];
            let mut shift = (lo + hi) / 2.0 - (first + last) / 2.0;

            if i > 0 {
                let prev = &units[i - 1];
                let min_shift = x[prev[prev.len() - 1]] + unit_pitch - first;
                shift = shift.max(min_shift);
            }
            if i + 1 < units.len() {
                let max_shift = x[units[i + 1][0]] - unit_pitch - last;
                shift = shift.min(max_shift);
            }
            if shift != 0.0 {
                for m in members {
                    if let Some(v) = x.get_mut(*m) {
                        *v += shift;
                    }
                }
            }
        }
    }
}
