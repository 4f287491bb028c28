//! Family data model.
//!
//! People and relationships arrive wholesale from the family service on every
//! load and are treated as an immutable snapshot for one render cycle.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub mod normalize;
pub mod propose;

pub use normalize::{parse_birth_date, snapshot_from_payload};
pub use propose::{propose_relationship, propose_relationship_named, ProposalError};

/// Name shown for people whose record carries no usable name.
pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(pub i64);

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationshipId(pub String);

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form gender tag, compared case-insensitively.
///
/// Only used to prefer an "opposite" second parent, never to exclude anyone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gender(String);

impl Gender {
    /// Returns `None` for blank input.
    pub fn new(raw: &str) -> Option<Self> {
        let tag = raw.trim().to_lowercase();
        if tag.is_empty() { None } else { Some(Gender(tag)) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl Person {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: PersonId(id),
            name: name.into(),
            age: None,
            birth_date: None,
            gender: None,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_gender(mut self, gender: &str) -> Self {
        self.gender = Gender::new(gender);
        self
    }

    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// Explicit age first, else whole years elapsed since the birth date as of
    /// `reference`. `None` means the person cannot take part in age ordering.
    pub fn resolved_age(&self, reference: Option<NaiveDate>) -> Option<u32> {
        self.age.or_else(|| {
            let birth = self.birth_date?;
            age_on(birth, reference?)
        })
    }

    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() { UNKNOWN_NAME } else { trimmed }
    }
}

/// Whole years elapsed between `birth` and `on`. Birthdays not yet reached in
/// the year of `on` do not count. A birth date after `on` has no age.
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> Option<u32> {
    if birth > on {
        return None;
    }
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Parent,
    Child,
    Spouse,
    Sibling,
    Grandparent,
    Grandchild,
    AuntUncle,
    NieceNephew,
    Cousin,
    Other,
}

impl RelationType {
    /// Relation type registry: (alias, type). Matched after lowercasing and
    /// replacing spaces/dashes with underscores.
    const ALIASES: &'static [(&'static str, RelationType)] = &[
        ("parent", RelationType::Parent),
        ("mother", RelationType::Parent),
        ("father", RelationType::Parent),
        ("child", RelationType::Child),
        ("son", RelationType::Child),
        ("daughter", RelationType::Child),
        ("spouse", RelationType::Spouse),
        ("husband", RelationType::Spouse),
        ("wife", RelationType::Spouse),
        ("partner", RelationType::Spouse),
        ("sibling", RelationType::Sibling),
        ("brother", RelationType::Sibling),
        ("sister", RelationType::Sibling),
        ("grandparent", RelationType::Grandparent),
        ("grandchild", RelationType::Grandchild),
        ("aunt_uncle", RelationType::AuntUncle),
        ("aunt", RelationType::AuntUncle),
        ("uncle", RelationType::AuntUncle),
        ("niece_nephew", RelationType::NieceNephew),
        ("niece", RelationType::NieceNephew),
        ("nephew", RelationType::NieceNephew),
        ("cousin", RelationType::Cousin),
        ("other", RelationType::Other),
    ];

    /// Look up a known relation type, or `None` for unrecognised text.
    pub fn parse_known(raw: &str) -> Option<Self> {
        let key = raw.trim().to_lowercase().replace([' ', '-'], "_");
        Self::ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, kind)| *kind)
    }

    /// Lenient parse: unknown text becomes `Other`.
    pub fn parse(raw: &str) -> Self {
        Self::parse_known(raw).unwrap_or(RelationType::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Parent => "parent",
            RelationType::Child => "child",
            RelationType::Spouse => "spouse",
            RelationType::Sibling => "sibling",
            RelationType::Grandparent => "grandparent",
            RelationType::Grandchild => "grandchild",
            RelationType::AuntUncle => "aunt_uncle",
            RelationType::NieceNephew => "niece_nephew",
            RelationType::Cousin => "cousin",
            RelationType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    /// For `parent`, the parent. Symmetric for `spouse`/`sibling`.
    pub person_a: PersonId,
    /// For `parent`, the child.
    pub person_b: PersonId,
    #[serde(rename = "type")]
    pub kind: RelationType,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Relationship {
    pub fn new(id: impl Into<String>, person_a: i64, person_b: i64, kind: RelationType) -> Self {
        Self {
            id: RelationshipId(id.into()),
            person_a: PersonId(person_a),
            person_b: PersonId(person_b),
            kind,
            active: true,
        }
    }

    pub fn deactivated(mut self) -> Self {
        self.active = false;
        self
    }

    /// Rewrites the inverse conveniences (`child`, `grandchild`) into their
    /// forward form with the operands swapped. Everything else is unchanged.
    pub fn normalized(&self) -> Relationship {
        let (kind, swap) = match self.kind {
            RelationType::Child => (RelationType::Parent, true),
            RelationType::Grandchild => (RelationType::Grandparent, true),
            other => (other, false),
        };
        let (person_a, person_b) = if swap {
            (self.person_b, self.person_a)
        } else {
            (self.person_a, self.person_b)
        };
        Relationship {
            id: self.id.clone(),
            person_a,
            person_b,
            kind,
            active: self.active,
        }
    }
}

/// Generational tier. Names are display labels; vertical order comes from
/// the level a band is assigned, top to bottom.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Band {
    Grandparent,
    Parent,
    Child,
    Grandchild,
}

impl Band {
    /// Label for `level` in a layout with `level_count` generations.
    pub fn for_level(level: usize, level_count: usize) -> Band {
        match level_count {
            0 | 1 => Band::Child,
            2 => {
                if level == 0 { Band::Parent } else { Band::Child }
            }
            _ => match level {
                0 => Band::Grandparent,
                1 => Band::Parent,
                2 => Band::Child,
                _ => Band::Grandchild,
            },
        }
    }

    /// Level of the `child` band in a layout with `level_count` generations.
    pub fn child_level(level_count: usize) -> usize {
        match level_count {
            0 | 1 => 0,
            2 => 1,
            _ => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Band::Grandparent => "grandparent",
            Band::Parent => "parent",
            Band::Child => "child",
            Band::Grandchild => "grandchild",
        }
    }
}

/// One load's worth of people and relationships.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilySnapshot {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl FamilySnapshot {
    pub fn new(people: Vec<Person>, relationships: Vec<Relationship>) -> Self {
        Self { people, relationships }
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// New snapshot with `draft` appended, for immediate visual feedback while
    /// the host persists it. A draft with an id already present replaces it.
    pub fn with_draft(&self, draft: Relationship) -> FamilySnapshot {
        let mut relationships: Vec<Relationship> = self
            .relationships
            .iter()
            .filter(|r| r.id != draft.id)
            .cloned()
            .collect();
        relationships.push(draft);
        FamilySnapshot {
            people: self.people.clone(),
            relationships,
        }
    }
}
