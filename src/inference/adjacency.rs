// Adjacency maps built from active relationships.
//
// This is the only place relationship direction is normalized: `child` rows
// are rewritten to `parent` with operands swapped on the way in, so nothing
// downstream ever looks at `RelationType::Child` again.
//
// Relationships that reference unknown people (or themselves) are excluded
// from the maps and reported in `ignored` for diagnostics.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::family::{PersonId, RelationType, Relationship, RelationshipId};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Adjacency {
    /// Parent -> children, in relationship order.
    pub parent_to_children: BTreeMap<PersonId, Vec<PersonId>>,
    /// Child -> parents, in relationship order.
    pub child_to_parents: BTreeMap<PersonId, Vec<PersonId>>,
    /// Symmetric: each spouse pair is recorded under both ids.
    pub spouses: BTreeMap<PersonId, Vec<PersonId>>,
    /// Active relationships dropped because an endpoint is unknown.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored: Vec<RelationshipId>,
}

impl Adjacency {
    /// Build adjacency from the active relationships whose endpoints are both
    /// in `known`. Inactive rows are skipped silently.
    pub fn from_relationships(known: &HashSet<PersonId>, relationships: &[Relationship]) -> Self {
        let mut adj = Adjacency::default();

        for rel in relationships.iter().filter(|r| r.active) {
            let rel = rel.normalized();
            let (a, b) = (rel.person_a, rel.person_b);

            if a == b || !known.contains(&a) || !known.contains(&b) {
                adj.ignored.push(rel.id.clone());
                continue;
            }

            match rel.kind {
                RelationType::Parent => adj.link_parent(a, b),
                RelationType::Spouse => {
                    push_unique(adj.spouses.entry(a).or_default(), b);
                    push_unique(adj.spouses.entry(b).or_default(), a);
                }
                // Other kinds carry no structure for banding.
                _ => {}
            }
        }

        adj
    }

    /// Record `parent` -> `child`. Duplicates are ignored.
    pub fn link_parent(&mut self, parent: PersonId, child: PersonId) {
        push_unique(self.parent_to_children.entry(parent).or_default(), child);
        push_unique(self.child_to_parents.entry(child).or_default(), parent);
    }

    /// Whether any parent/child link survived filtering.
    pub fn has_parent_links(&self) -> bool {
        self.parent_to_children.values().any(|c| !c.is_empty())
    }

    /// Drop all parent/child links, keeping spouses and diagnostics.
    pub fn clear_parent_links(&mut self) {
        self.parent_to_children.clear();
        self.child_to_parents.clear();
    }

    pub fn children_of(&self, id: PersonId) -> &[PersonId] {
        self.parent_to_children.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn parents_of(&self, id: PersonId) -> &[PersonId] {
        self.child_to_parents.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn spouses_of(&self, id: PersonId) -> &[PersonId] {
        self.spouses.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Whether `id` has any parent or child link.
    pub fn is_linked(&self, id: PersonId) -> bool {
        !self.children_of(id).is_empty() || !self.parents_of(id).is_empty()
    }
}

fn push_unique(list: &mut Vec<PersonId>, id: PersonId) {
    if !list.contains(&id) {
        list.push(id);
    }
}
