//! Role inference: partition people into generational bands.
//!
//! Two paths:
//! - **Explicit**: at least one active, resolvable `parent` link exists. Levels
//!   come from a breadth-first walk over the parent links (see [`explicit`]).
//! - **Age gap**: no usable parent links. At most two parents are guessed
//!   from age gaps (see [`age_gap`]).
//!
//! `infer` is a pure function of its inputs. It never fails and never drops a
//! person: every input id lands in exactly one generation.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::family::{Band, Person, PersonId, Relationship};

pub mod adjacency;
pub mod age_gap;
pub mod explicit;

pub use adjacency::Adjacency;

/// Default minimum age difference between a parent and a child.
pub const DEFAULT_GAP_YEARS: u32 = 10;
/// Higher-confidence gap used by [`InferenceConfig::strict`].
pub const STRICT_GAP_YEARS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Minimum age difference for the age-gap heuristic.
    pub gap_years: u32,
    /// Ceiling on inferred parents per child (and on parent selection).
    pub max_parents: Option<usize>,
    /// Ceiling on inferred children linked to one parent. Bounds links only;
    /// unlinked children still appear in the child band.
    pub max_children: Option<usize>,
    /// Date ages are derived against when only a birth date is known.
    pub reference_date: Option<NaiveDate>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            gap_years: DEFAULT_GAP_YEARS,
            max_parents: Some(4),
            max_children: Some(12),
            reference_date: None,
        }
    }
}

impl InferenceConfig {
    pub fn strict() -> Self {
        Self {
            gap_years: STRICT_GAP_YEARS,
            ..Self::default()
        }
    }

    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferencePath {
    /// No people.
    Empty,
    /// Bands derived from explicit parent links.
    Explicit,
    /// Bands guessed from age gaps.
    AgeGap,
}

/// One generational tier, top to bottom by `level`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation {
    pub level: usize,
    pub band: Band,
    pub members: Vec<PersonId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyStructure {
    pub path: InferencePath,
    /// Non-empty generations in level order.
    pub generations: Vec<Generation>,
    pub bands: BTreeMap<PersonId, Band>,
    pub levels: BTreeMap<PersonId, usize>,
    #[serde(flatten)]
    pub adjacency: Adjacency,
}

impl FamilyStructure {
    pub fn empty() -> Self {
        Self {
            path: InferencePath::Empty,
            generations: Vec::new(),
            bands: BTreeMap::new(),
            levels: BTreeMap::new(),
            adjacency: Adjacency::default(),
        }
    }

    pub fn band_of(&self, id: PersonId) -> Option<Band> {
        self.bands.get(&id).copied()
    }

    pub fn level_of(&self, id: PersonId) -> Option<usize> {
        self.levels.get(&id).copied()
    }

    /// Members of every generation labelled `band`, in display order.
    pub fn members_of(&self, band: Band) -> Vec<PersonId> {
        self.generations
            .iter()
            .filter(|g| g.band == band)
            .flat_map(|g| g.members.iter().copied())
            .collect()
    }

    pub fn person_count(&self) -> usize {
        self.levels.len()
    }

    fn from_levels(
        path: InferencePath,
        order: &[PersonId],
        levels: BTreeMap<PersonId, usize>,
        level_count: usize,
        adjacency: Adjacency,
    ) -> Self {
        let generations: Vec<Generation> = (0..level_count)
            .map(|level| Generation {
                level,
                band: Band::for_level(level, level_count),
                members: order
                    .iter()
                    .copied()
                    .filter(|id| levels.get(id) == Some(&level))
                    .collect(),
            })
            .filter(|g| !g.members.is_empty())
            .collect();

        let bands = levels
            .iter()
            .map(|(&id, &level)| (id, Band::for_level(level, level_count)))
            .collect();

        Self {
            path,
            generations,
            bands,
            levels,
            adjacency,
        }
    }
}

/// Infer generational bands and adjacency for one snapshot.
///
/// Duplicate person ids keep their first occurrence. Relationships that
/// reference unknown ids are excluded and listed in `adjacency.ignored`.
pub fn infer(people: &[Person], relationships: &[Relationship], cfg: &InferenceConfig) -> FamilyStructure {
    let mut seen: HashSet<PersonId> = HashSet::new();
    let unique: Vec<&Person> = people.iter().filter(|p| seen.insert(p.id)).collect();
    let ids: Vec<PersonId> = unique.iter().map(|p| p.id).collect();

    let mut adjacency = Adjacency::from_relationships(&seen, relationships);

    if unique.is_empty() {
        return FamilyStructure {
            adjacency,
            ..FamilyStructure::empty()
        };
    }

    if adjacency.has_parent_links() {
        let leveling = explicit::assign_levels(&ids, &adjacency);
        return FamilyStructure::from_levels(
            InferencePath::Explicit,
            &ids,
            leveling.levels,
            leveling.level_count,
            adjacency,
        );
    }

    let outcome = age_gap::infer_by_age(unique.iter().copied(), cfg);
    adjacency.clear_parent_links();
    adjacency.parent_to_children = outcome.links.parent_to_children;
    adjacency.child_to_parents = outcome.links.child_to_parents;

    let (child_level, level_count) = if outcome.parents.is_empty() { (0, 1) } else { (1, 2) };
    let mut levels = BTreeMap::new();
    for &id in &outcome.parents {
        levels.insert(id, 0);
    }
    for &id in &outcome.children {
        levels.insert(id, child_level);
    }
    let order: Vec<PersonId> = outcome.parents.iter().chain(&outcome.children).copied().collect();

    FamilyStructure::from_levels(InferencePath::AgeGap, &order, levels, level_count, adjacency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{RelationType, RelationshipId};
    use proptest::prelude::*;

    fn person(id: i64, age: Option<u32>, gender: Option<&str>) -> Person {
        let mut p = Person::new(id, format!("P{id}"));
        p.age = age;
        if let Some(g) = gender {
            p = p.with_gender(g);
        }
        p
    }

    fn ids(raw: &[i64]) -> Vec<PersonId> {
        raw.iter().copied().map(PersonId).collect()
    }

    fn family(second_age: u32) -> Vec<Person> {
        vec![
            person(1, Some(45), Some("M")),
            person(2, Some(second_age), Some("F")),
            person(3, Some(15), None),
            person(4, Some(12), None),
        ]
    }

    #[test]
    fn test_empty_input() {
        let s = infer(&[], &[], &InferenceConfig::default());
        assert_eq!(s.path, InferencePath::Empty);
        assert!(s.generations.is_empty());
        assert!(s.bands.is_empty());
    }

    #[test]
    fn test_age_gap_two_parents() {
        let s = infer(&family(42), &[], &InferenceConfig::default());
        assert_eq!(s.path, InferencePath::AgeGap);
        assert_eq!(s.members_of(Band::Parent), ids(&[1, 2]));
        assert_eq!(s.members_of(Band::Child), ids(&[3, 4]));
    }

    #[test]
    fn test_age_gap_single_parent() {
        let s = infer(&family(20), &[], &InferenceConfig::default());
        assert_eq!(s.members_of(Band::Parent), ids(&[1]));
        assert_eq!(s.members_of(Band::Child), ids(&[2, 3, 4]));
    }

    #[test]
    fn test_explicit_parent_with_unlinked_person() {
        let people = vec![person(1, None, None), person(2, None, None), person(3, None, None)];
        let rels = vec![Relationship::new("r", 1, 3, RelationType::Parent)];
        let s = infer(&people, &rels, &InferenceConfig::default());

        assert_eq!(s.path, InferencePath::Explicit);
        assert_eq!(s.members_of(Band::Parent), ids(&[1]));
        assert_eq!(s.members_of(Band::Child), ids(&[2, 3]));
    }

    #[test]
    fn test_spouse_only_falls_back_to_age_gap() {
        let rels = vec![Relationship::new("s", 1, 2, RelationType::Spouse)];
        let s = infer(&family(42), &rels, &InferenceConfig::default());

        assert_eq!(s.path, InferencePath::AgeGap);
        assert_eq!(s.members_of(Band::Parent), ids(&[1, 2]));
        assert_eq!(s.adjacency.spouses_of(PersonId(1)), &[PersonId(2)]);
    }

    #[test]
    fn test_unknown_ids_fall_back_and_are_reported() {
        let rels = vec![Relationship::new("ghost", 77, 3, RelationType::Parent)];
        let s = infer(&family(42), &rels, &InferenceConfig::default());

        assert_eq!(s.path, InferencePath::AgeGap);
        assert_eq!(s.adjacency.ignored, vec![RelationshipId("ghost".into())]);
    }

    #[test]
    fn test_no_ages_no_links_is_single_band() {
        let people = vec![person(1, None, None), person(2, None, None)];
        let s = infer(&people, &[], &InferenceConfig::default());
        assert_eq!(s.generations.len(), 1);
        assert_eq!(s.generations[0].band, Band::Child);
        assert_eq!(s.generations[0].members, ids(&[1, 2]));
    }

    #[test]
    fn test_birth_dates_need_reference_date() {
        let born = |y| NaiveDate::from_ymd_opt(y, 1, 1).unwrap();
        let people = vec![
            Person::new(1, "A").with_birth_date(born(1970)),
            Person::new(2, "B").with_birth_date(born(2005)),
        ];
        let plain = infer(&people, &[], &InferenceConfig::default());
        assert!(plain.members_of(Band::Parent).is_empty());

        let dated = InferenceConfig::default().with_reference_date(born(2024));
        let s = infer(&people, &[], &dated);
        assert_eq!(s.members_of(Band::Parent), ids(&[1]));
    }

    #[test]
    fn test_three_generations_explicit() {
        let people: Vec<Person> = (1..=5).map(|i| person(i, None, None)).collect();
        let rels = vec![
            Relationship::new("a", 1, 2, RelationType::Parent),
            Relationship::new("b", 5, 3, RelationType::Child),
            Relationship::new("c", 2, 5, RelationType::Parent),
        ];
        let s = infer(&people, &rels, &InferenceConfig::default());

        assert_eq!(s.generations.len(), 3);
        assert_eq!(s.members_of(Band::Grandparent), ids(&[1]));
        assert_eq!(s.members_of(Band::Parent), ids(&[2, 3]));
        assert_eq!(s.members_of(Band::Child), ids(&[4, 5]));
    }

    #[test]
    fn test_duplicate_people_are_collapsed() {
        let people = vec![person(1, Some(40), None), person(1, Some(5), None), person(2, Some(8), None)];
        let s = infer(&people, &[], &InferenceConfig::default());
        assert_eq!(s.person_count(), 2);
        assert_eq!(s.members_of(Band::Parent), ids(&[1]));
    }

    fn arb_people() -> impl Strategy<Value = Vec<Person>> {
        prop::collection::vec(
            (prop::option::of(0u32..95), prop::option::of(prop::sample::select(vec!["m", "f", "x"]))),
            0..24,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (age, gender))| person(i as i64, age, gender))
                .collect()
        })
    }

    fn arb_relationships(max_id: i64) -> impl Strategy<Value = Vec<Relationship>> {
        let kinds = vec![
            RelationType::Parent,
            RelationType::Child,
            RelationType::Spouse,
            RelationType::Sibling,
            RelationType::Cousin,
        ];
        prop::collection::vec(
            (0..max_id + 3, 0..max_id + 3, prop::sample::select(kinds), any::<bool>()),
            0..16,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .enumerate()
                .map(|(i, (a, b, kind, active))| {
                    let r = Relationship::new(format!("r{i}"), a, b, kind);
                    if active { r } else { r.deactivated() }
                })
                .collect()
        })
    }

    fn arb_family() -> impl Strategy<Value = (Vec<Person>, Vec<Relationship>)> {
        arb_people().prop_flat_map(|people| {
            let n = people.len() as i64;
            (Just(people), arb_relationships(n))
        })
    }

    proptest! {
        #[test]
        fn prop_every_person_in_exactly_one_generation((people, rels) in arb_family()) {
            let s = infer(&people, &rels, &InferenceConfig::default());
            let mut seen = HashSet::new();
            for g in &s.generations {
                for id in &g.members {
                    prop_assert!(seen.insert(*id), "{id} appears twice");
                }
            }
            prop_assert_eq!(seen.len(), people.len());
            prop_assert_eq!(s.bands.len(), people.len());
        }

        #[test]
        fn prop_inferred_links_clear_the_gap(people in arb_people()) {
            let cfg = InferenceConfig::default();
            let s = infer(&people, &[], &cfg);
            let age = |id: PersonId| people.iter().find(|p| p.id == id).and_then(|p| p.age);
            for (parent, children) in &s.adjacency.parent_to_children {
                prop_assert_eq!(s.band_of(*parent), Some(Band::Parent));
                for child in children {
                    prop_assert_eq!(s.band_of(*child), Some(Band::Child));
                    let (pa, ca) = (age(*parent).unwrap_or(0), age(*child).unwrap_or(0));
                    prop_assert!(pa as i64 - ca as i64 >= cfg.gap_years as i64);
                }
            }
            prop_assert!(s.members_of(Band::Parent).len() <= 2);
        }

        #[test]
        fn prop_child_rows_match_parent_rows((people, rels) in arb_family()) {
            let flipped: Vec<Relationship> = rels
                .iter()
                .map(|r| {
                    if r.kind == RelationType::Parent {
                        Relationship { person_a: r.person_b, person_b: r.person_a, kind: RelationType::Child, ..r.clone() }
                    } else {
                        r.clone()
                    }
                })
                .collect();
            let cfg = InferenceConfig::default();
            prop_assert_eq!(infer(&people, &rels, &cfg), infer(&people, &flipped, &cfg));
        }

        #[test]
        fn prop_infer_is_deterministic((people, rels) in arb_family()) {
            let cfg = InferenceConfig::default();
            prop_assert_eq!(infer(&people, &rels, &cfg), infer(&people, &rels, &cfg));
        }
    }
}
