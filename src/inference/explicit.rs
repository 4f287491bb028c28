// Generation leveling from explicit parent links.
//
// Levels are assigned breadth-first from the roots (linked people with no
// recorded parent), taking the longest path so that a child always sits below
// every one of its parents. Each id is enqueued at most once. When every
// remaining person waits on a parent inside a cycle, the first of them is
// placed below the parents visited so far, which breaks the cycle. People no
// root reaches at all (pure cycles) stay on level 0.
//
// Afterwards a root whose children all landed two or more levels down (an
// in-law who married into a deeper generation) is pulled down to sit directly
// above its shallowest child. Levels are then compacted so no level is empty.
//
// People with no parent/child link at all go to the child band.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use crate::family::{Band, PersonId};
use super::adjacency::Adjacency;

#[derive(Debug, Clone, PartialEq)]
pub struct Leveling {
    pub levels: BTreeMap<PersonId, usize>,
    pub level_count: usize,
}

/// Assign a level to every id in `people` (input order, deduplicated).
pub fn assign_levels(people: &[PersonId], adj: &Adjacency) -> Leveling {
    let linked: Vec<PersonId> = people.iter().copied().filter(|id| adj.is_linked(*id)).collect();

    let mut in_degree: HashMap<PersonId, usize> = linked
        .iter()
        .map(|&id| (id, adj.parents_of(id).len()))
        .collect();
    let mut raw: HashMap<PersonId, usize> = HashMap::new();
    let mut visited: HashSet<PersonId> = HashSet::new();
    let mut queue: VecDeque<PersonId> = VecDeque::new();

    let roots: Vec<PersonId> = linked
        .iter()
        .copied()
        .filter(|id| adj.parents_of(*id).is_empty())
        .collect();
    for &id in &roots {
        raw.insert(id, 0);
        visited.insert(id);
        queue.push_back(id);
    }

    loop {
        while let Some(id) = queue.pop_front() {
            let level = raw.get(&id).copied().unwrap_or(0);
            for &child in adj.children_of(id) {
                // Back edge into a cycle that was already broken.
                if visited.contains(&child) {
                    continue;
                }
                let entry = raw.entry(child).or_insert(0);
                *entry = (*entry).max(level + 1);

                if let Some(d) = in_degree.get_mut(&child) {
                    *d = d.saturating_sub(1);
                    if *d == 0 && visited.insert(child) {
                        queue.push_back(child);
                    }
                }
            }
        }

        // Someone is waiting on a parent inside a cycle. Release the first
        // such person below the parents placed so far and carry on.
        let blocked = linked.iter().copied().find(|id| {
            !visited.contains(id) && adj.parents_of(*id).iter().any(|p| visited.contains(p))
        });
        match blocked {
            Some(id) => {
                visited.insert(id);
                queue.push_back(id);
            }
            None => break,
        }
    }

    // Unreachable from any root (pure cycles): level 0.
    for &id in &linked {
        if !visited.contains(&id) {
            raw.insert(id, 0);
        }
    }

    for &root in &roots {
        let shallowest_child = adj
            .children_of(root)
            .iter()
            .filter_map(|c| raw.get(c).copied())
            .min();
        if let Some(m) = shallowest_child {
            if m >= 2 {
                raw.insert(root, m - 1);
            }
        }
    }

    // Compact to 0..level_count.
    let distinct: BTreeSet<usize> = linked.iter().filter_map(|id| raw.get(id).copied()).collect();
    let rank: HashMap<usize, usize> = distinct.iter().enumerate().map(|(i, &l)| (l, i)).collect();
    let level_count = distinct.len();

    let child_level = Band::child_level(level_count);
    let levels = people
        .iter()
        .map(|&id| {
            let level = raw
                .get(&id)
                .and_then(|l| rank.get(l).copied())
                .unwrap_or(child_level);
            (id, level)
        })
        .collect();

    Leveling {
        levels,
        level_count: level_count.max(1),
    }
}
