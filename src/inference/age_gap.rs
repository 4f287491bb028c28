// Age-gap heuristic used when no explicit parent links exist.
//
// 1. People with a resolvable age are ordered eldest first (stable on ties).
// 2. Everyone at least `gap_years` younger than the eldest is a confirmed
//    child. The eldest is a parent iff at least one confirmed child exists.
//    Near-peers of the eldest (a co-parent, say) do not disqualify them.
// 3. A second parent is the first remaining candidate (eldest first) that is
//    at least `gap_years` older than every other confirmed child, with at
//    least one such child left over. A candidate whose gender differs from
//    the first parent's is preferred; gender never excludes anyone.
// 4. Everyone else is a child. Children get inferred links to each parent they
//    clear the gap against, bounded by the configured caps. People who clear
//    no gap are still children, just unlinked. People without an age are
//    appended to the child band unlinked.

use crate::family::{Gender, Person, PersonId};
use super::adjacency::Adjacency;
use super::InferenceConfig;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgeGapOutcome {
    /// Selected parents, first parent first.
    pub parents: Vec<PersonId>,
    /// Everyone else: aged children eldest first, then people without an age.
    pub children: Vec<PersonId>,
    /// Inferred parent/child links only.
    pub links: Adjacency,
}

#[derive(Debug, Clone)]
struct Aged<'a> {
    id: PersonId,
    age: i64,
    gender: Option<&'a Gender>,
}

pub fn infer_by_age<'a>(
    people: impl IntoIterator<Item = &'a Person>,
    cfg: &InferenceConfig,
) -> AgeGapOutcome {
    let gap = i64::from(cfg.gap_years);

    let mut aged: Vec<Aged<'a>> = Vec::new();
    let mut unaged: Vec<PersonId> = Vec::new();
    for p in people {
        match p.resolved_age(cfg.reference_date) {
            Some(age) => aged.push(Aged {
                id: p.id,
                age: i64::from(age),
                gender: p.gender.as_ref(),
            }),
            None => unaged.push(p.id),
        }
    }
    // sort_by is stable, so equal ages keep input order.
    aged.sort_by(|a, b| b.age.cmp(&a.age));

    let parent_budget = cfg.max_parents.unwrap_or(usize::MAX);
    let confirmed: Vec<usize> = match aged.first() {
        Some(first) => (1..aged.len()).filter(|&i| first.age - aged[i].age >= gap).collect(),
        None => Vec::new(),
    };

    if parent_budget == 0 || confirmed.is_empty() {
        let children = aged.iter().map(|a| a.id).chain(unaged).collect();
        return AgeGapOutcome {
            parents: Vec::new(),
            children,
            links: Adjacency::default(),
        };
    }

    let second_idx = if parent_budget >= 2 {
        pick_second_parent(&aged, &confirmed, gap)
    } else {
        None
    };

    let mut parents: Vec<&Aged<'_>> = vec![&aged[0]];
    if let Some(i) = second_idx {
        parents.push(&aged[i]);
    }

    let aged_children: Vec<&Aged<'_>> = aged
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(i, _)| Some(*i) != second_idx)
        .map(|(_, c)| c)
        .collect();

    let max_children = cfg.max_children.unwrap_or(usize::MAX);
    let mut links = Adjacency::default();
    for parent in &parents {
        for child in &aged_children {
            if parent.age - child.age < gap {
                continue;
            }
            if links.children_of(parent.id).len() >= max_children
                || links.parents_of(child.id).len() >= parent_budget
            {
                continue;
            }
            links.link_parent(parent.id, child.id);
        }
    }

    AgeGapOutcome {
        parents: parents.iter().map(|p| p.id).collect(),
        children: aged_children.iter().map(|c| c.id).chain(unaged).collect(),
        links,
    }
}

/// Index into `aged` of the second parent, if any candidate qualifies.
///
/// `confirmed` holds the indices of the first parent's confirmed children.
fn pick_second_parent(aged: &[Aged<'_>], confirmed: &[usize], gap: i64) -> Option<usize> {
    let first = &aged[0];

    let qualifies = |i: usize| {
        let candidate = &aged[i];
        let mut rest = confirmed.iter().filter(|&&j| j != i).peekable();
        rest.peek().is_some() && rest.all(|&j| candidate.age - aged[j].age >= gap)
    };
    let differs = |i: usize| match (first.gender, aged[i].gender) {
        (Some(a), Some(b)) => a != b,
        _ => false,
    };

    let mut fallback = None;
    for i in 1..aged.len() {
        if !qualifies(i) {
            continue;
        }
        if differs(i) {
            return Some(i);
        }
        fallback.get_or_insert(i);
    }
    fallback
}
