// Defensive normalization of family service payloads.
//
// The service has shipped several record shapes over time. Members may carry
// their fields at the top level or nested under `person`/`contact`, ids may be
// numbers or numeric strings, and relationship endpoints may be bare ids,
// nested objects or alternate key names. Everything here coalesces those
// shapes into `Person`/`Relationship` and never fails: unusable records are
// dropped with a debug event.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};
use tracing::debug;

use super::{FamilySnapshot, Gender, Person, PersonId, RelationType, Relationship, RelationshipId};

/// Objects a member record may nest its fields under.
const NESTED_KEYS: &[&str] = &["person", "member", "contact", "phonebook_entry", "entry"];

const PERSON_ID_KEYS: &[&str] = &["id", "person_id", "personId", "member_id", "memberId", "contact_id"];
const NAME_KEYS: &[&str] = &["name", "full_name", "fullName", "display_name", "displayName"];
const FIRST_NAME_KEYS: &[&str] = &["first_name", "firstName", "given_name"];
const LAST_NAME_KEYS: &[&str] = &["last_name", "lastName", "surname", "family_name"];
const AGE_KEYS: &[&str] = &["age", "age_years"];
const DOB_KEYS: &[&str] = &["dob", "date_of_birth", "dateOfBirth", "birth_date", "birthDate", "birthday"];
const GENDER_KEYS: &[&str] = &["gender", "sex"];

const REL_ID_KEYS: &[&str] = &["id", "relationship_id", "relationshipId"];
const PERSON_A_KEYS: &[&str] = &[
    "person_a", "personA", "person_a_id", "personAId", "from", "from_person", "from_person_id",
    "fromPersonId", "source", "person1", "person1_id",
];
const PERSON_B_KEYS: &[&str] = &[
    "person_b", "personB", "person_b_id", "personBId", "to", "to_person", "to_person_id",
    "toPersonId", "target", "person2", "person2_id",
];
const REL_TYPE_KEYS: &[&str] = &["type", "relationship_type", "relationshipType", "relation", "kind"];
const ACTIVE_KEYS: &[&str] = &["active", "is_active", "isActive"];

const MEMBER_LIST_KEYS: &[&str] = &["members", "people", "persons", "family_members", "familyMembers"];
const RELATIONSHIP_LIST_KEYS: &[&str] = &["relationships", "relations", "edges"];
/// Envelopes a payload may be wrapped in.
const ENVELOPE_KEYS: &[&str] = &["data", "family", "family_group", "familyGroup", "result"];

/// Build a snapshot from a success payload of the family service.
///
/// Duplicate person ids keep their first record.
pub fn snapshot_from_payload(body: &Value) -> FamilySnapshot {
    let root = unwrap_envelope(body);

    let mut seen: HashSet<PersonId> = HashSet::new();
    let mut people = Vec::new();
    for (index, record) in list_field(root, MEMBER_LIST_KEYS).iter().enumerate() {
        match person_from_record(record) {
            Some(person) => {
                if seen.insert(person.id) {
                    people.push(person);
                } else {
                    debug!(id = person.id.0, "dropping duplicate member record");
                }
            }
            None => debug!(index, "dropping member record without a usable id"),
        }
    }

    let relationships = list_field(root, RELATIONSHIP_LIST_KEYS)
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let rel = relationship_from_record(record, index);
            if rel.is_none() {
                debug!(index, "dropping relationship record with unresolvable endpoints");
            }
            rel
        })
        .collect();

    FamilySnapshot { people, relationships }
}

/// Coalesce one member record. Returns `None` only when no id can be found.
pub fn person_from_record(record: &Value) -> Option<Person> {
    let obj = record.as_object()?;
    let id = lookup(obj, PERSON_ID_KEYS).and_then(coerce_i64)?;

    let name = lookup(obj, NAME_KEYS)
        .and_then(coerce_string)
        .or_else(|| {
            let first = lookup(obj, FIRST_NAME_KEYS).and_then(coerce_string);
            let last = lookup(obj, LAST_NAME_KEYS).and_then(coerce_string);
            match (first, last) {
                (Some(f), Some(l)) => Some(format!("{f} {l}")),
                (f, l) => f.or(l),
            }
        })
        .unwrap_or_default();

    let age = lookup(obj, AGE_KEYS).and_then(coerce_u32);
    let birth_date = lookup(obj, DOB_KEYS)
        .and_then(coerce_string)
        .and_then(|raw| {
            let parsed = parse_birth_date(&raw);
            if parsed.is_none() {
                debug!(id, raw = raw.as_str(), "ignoring unparsable date of birth");
            }
            parsed
        });
    let gender = lookup(obj, GENDER_KEYS)
        .and_then(coerce_string)
        .and_then(|g| Gender::new(&g));

    Some(Person {
        id: PersonId(id),
        name,
        age,
        birth_date,
        gender,
    })
}

/// Coalesce one relationship record. Records without an id get a positional
/// one (`rel-<index>`). Returns `None` when either endpoint is unresolvable.
pub fn relationship_from_record(record: &Value, index: usize) -> Option<Relationship> {
    let obj = record.as_object()?;
    let person_a = first_field(obj, PERSON_A_KEYS).and_then(person_ref)?;
    let person_b = first_field(obj, PERSON_B_KEYS).and_then(person_ref)?;

    let id = first_field(obj, REL_ID_KEYS)
        .and_then(coerce_string)
        .unwrap_or_else(|| format!("rel-{index}"));
    let kind = first_field(obj, REL_TYPE_KEYS)
        .and_then(coerce_string)
        .map(|raw| RelationType::parse(&raw))
        .unwrap_or(RelationType::Other);
    let active = first_field(obj, ACTIVE_KEYS).and_then(coerce_bool).unwrap_or(true);

    Some(Relationship {
        id: RelationshipId(id),
        person_a,
        person_b,
        kind,
        active,
    })
}

/// Parse the date formats the service has been seen to emit.
pub fn parse_birth_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    // "1980-05-02T00:00:00" without an offset
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn unwrap_envelope(body: &Value) -> &Value {
    let mut current = body;
    // Bounded: envelopes are at most a couple of levels deep.
    for _ in 0..3 {
        let Some(obj) = current.as_object() else { break };
        if MEMBER_LIST_KEYS.iter().any(|k| obj.contains_key(*k)) {
            break;
        }
        match ENVELOPE_KEYS.iter().find_map(|k| obj.get(*k)) {
            Some(inner) if inner.is_object() => current = inner,
            _ => break,
        }
    }
    current
}

fn list_field<'a>(root: &'a Value, keys: &[&str]) -> &'a [Value] {
    root.as_object()
        .and_then(|obj| first_field(obj, keys))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// First non-null value among `keys` at the top level of `obj`.
fn first_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Like `first_field`, falling back to nested member objects.
fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    first_field(obj, keys).or_else(|| {
        NESTED_KEYS
            .iter()
            .filter_map(|k| obj.get(*k).and_then(Value::as_object))
            .find_map(|nested| first_field(nested, keys))
    })
}

/// A person reference: bare id, numeric string, or an object carrying an id.
fn person_ref(value: &Value) -> Option<PersonId> {
    match value {
        Value::Object(obj) => lookup(obj, PERSON_ID_KEYS).and_then(coerce_i64).map(PersonId),
        other => coerce_i64(other).map(PersonId),
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.floor() as u64))
            .and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Some(true),
            "false" | "0" | "no" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn coerce_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_person_from_flat_record() {
        let p = person_from_record(&json!({
            "id": 7, "name": "Ada", "age": "36", "gender": "F", "dob": "1988-02-03"
        }))
        .unwrap();
        assert_eq!(p.id, PersonId(7));
        assert_eq!(p.name, "Ada");
        assert_eq!(p.age, Some(36));
        assert_eq!(p.gender, Gender::new("f"));
        assert_eq!(p.birth_date, NaiveDate::from_ymd_opt(1988, 2, 3));
    }

    #[test]
    fn test_person_from_nested_record() {
        let p = person_from_record(&json!({
            "member_id": "12",
            "person": { "first_name": "Grace", "last_name": "Hopper", "birthDate": "12/09/1906" }
        }))
        .unwrap();
        assert_eq!(p.id, PersonId(12));
        assert_eq!(p.name, "Grace Hopper");
        assert_eq!(p.birth_date, NaiveDate::from_ymd_opt(1906, 12, 9));
        assert_eq!(p.age, None);
    }

    #[test]
    fn test_person_without_id_is_dropped() {
        assert!(person_from_record(&json!({ "name": "Nobody" })).is_none());
        assert!(person_from_record(&json!("not an object")).is_none());
    }

    #[test]
    fn test_unparsable_dob_is_ignored() {
        let p = person_from_record(&json!({ "id": 1, "dob": "sometime in spring" })).unwrap();
        assert_eq!(p.birth_date, None);
        assert_eq!(p.name, "");
    }

    #[test]
    fn test_relationship_endpoint_shapes() {
        let r = relationship_from_record(
            &json!({
                "relationship_id": 99,
                "personA": { "id": 1, "name": "Mum" },
                "person_b_id": "3",
                "relationshipType": "Mother",
                "is_active": "false"
            }),
            0,
        )
        .unwrap();
        assert_eq!(r.id, RelationshipId("99".into()));
        assert_eq!(r.person_a, PersonId(1));
        assert_eq!(r.person_b, PersonId(3));
        assert_eq!(r.kind, RelationType::Parent);
        assert!(!r.active);
    }

    #[test]
    fn test_relationship_defaults() {
        let r = relationship_from_record(&json!({ "from": 1, "to": 2, "type": "frenemy" }), 4).unwrap();
        assert_eq!(r.id, RelationshipId("rel-4".into()));
        assert_eq!(r.kind, RelationType::Other);
        assert!(r.active);

        assert!(relationship_from_record(&json!({ "from": 1, "type": "spouse" }), 0).is_none());
    }

    #[test]
    fn test_snapshot_from_enveloped_payload() {
        let snap = snapshot_from_payload(&json!({
            "data": {
                "family_members": [
                    { "id": 1, "name": "A" },
                    { "id": 1, "name": "A again" },
                    { "name": "no id" },
                    { "id": 2, "name": "B" }
                ],
                "relationships": [
                    { "person_a": 1, "person_b": 2, "type": "parent" },
                    { "person_a": 1, "type": "parent" }
                ]
            }
        }));
        assert_eq!(snap.people.len(), 2);
        assert_eq!(snap.people[0].name, "A");
        assert_eq!(snap.relationships.len(), 1);
    }

    #[test]
    fn test_snapshot_from_garbage_is_empty() {
        assert!(snapshot_from_payload(&json!(null)).is_empty());
        assert!(snapshot_from_payload(&json!({ "members": "nope" })).is_empty());
    }

    #[test]
    fn test_parse_birth_date_formats() {
        let d = NaiveDate::from_ymd_opt(1980, 5, 2);
        assert_eq!(parse_birth_date("1980-05-02"), d);
        assert_eq!(parse_birth_date("05/02/1980"), d);
        assert_eq!(parse_birth_date("1980/05/02"), d);
        assert_eq!(parse_birth_date("1980-05-02T10:00:00Z"), d);
        assert_eq!(parse_birth_date("1980-05-02T00:00:00"), d);
        assert_eq!(parse_birth_date(""), None);
    }
}
