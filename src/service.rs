//! Contract with the external family/phonebook service.
//!
//! The host performs the HTTP calls; this module only interprets what comes
//! back and builds what goes out, so the engines only ever see a complete
//! snapshot or an explicit empty state.

use serde_json::{json, Value};
use tracing::warn;

use crate::error::ServiceError;
use crate::family::normalize::relationship_from_record;
use crate::family::{snapshot_from_payload, FamilySnapshot, Relationship};

/// Keys a validation error message may be reported under.
const MESSAGE_KEYS: &[&str] = &["message", "error", "detail", "errors"];

#[derive(Debug, Clone, PartialEq)]
pub enum FamilyLookup {
    /// No family group exists yet for the queried address.
    NotFound,
    Found(FamilySnapshot),
}

impl FamilyLookup {
    /// Snapshot to render; `NotFound` renders as an empty tree.
    pub fn into_snapshot(self) -> FamilySnapshot {
        match self {
            FamilyLookup::NotFound => FamilySnapshot::default(),
            FamilyLookup::Found(snapshot) => snapshot,
        }
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Interpret the reply to a family lookup.
pub fn parse_family_response(status: u16, body: &str) -> Result<FamilyLookup, ServiceError> {
    if status == 404 {
        return Ok(FamilyLookup::NotFound);
    }
    if !is_success(status) {
        warn!(status, "family lookup failed");
        return Err(ServiceError::Http { status });
    }
    if body.trim().is_empty() {
        return Ok(FamilyLookup::Found(FamilySnapshot::default()));
    }
    let value: Value = serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "family lookup returned malformed JSON");
        ServiceError::Malformed(e)
    })?;
    Ok(FamilyLookup::Found(snapshot_from_payload(&value)))
}

/// JSON body the host sends to persist a draft relationship.
pub fn create_relationship_body(rel: &Relationship) -> Value {
    json!({
        "person_a_id": rel.person_a,
        "person_b_id": rel.person_b,
        "relationship_type": rel.kind.as_str(),
        "active": rel.active,
    })
}

/// Interpret the reply to a relationship write.
///
/// On success returns the stored relationship when the service echoes it.
/// The host re-fetches the family afterwards either way.
pub fn parse_write_response(status: u16, body: &str) -> Result<Option<Relationship>, ServiceError> {
    let value: Option<Value> = serde_json::from_str(body).ok();

    if is_success(status) {
        return Ok(value.as_ref().and_then(|v| {
            let record = v.get("relationship").or_else(|| v.get("data")).unwrap_or(v);
            relationship_from_record(record, 0)
        }));
    }

    if status == 400 || status == 409 || status == 422 {
        let message = value
            .as_ref()
            .and_then(validation_message)
            .unwrap_or_else(|| "the relationship could not be saved".to_string());
        warn!(status, %message, "relationship write rejected");
        return Err(ServiceError::Validation { message });
    }

    warn!(status, "relationship write failed");
    Err(ServiceError::Http { status })
}

fn validation_message(body: &Value) -> Option<String> {
    MESSAGE_KEYS.iter().find_map(|key| match body.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join("; "))
        }
        Value::Object(inner) => inner.get("message").and_then(Value::as_str).map(str::to_string),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::family::{propose_relationship, PersonId, RelationType};

    #[test]
    fn test_not_found_is_an_empty_state() {
        let lookup = parse_family_response(404, "").unwrap();
        assert_eq!(lookup, FamilyLookup::NotFound);
        assert!(lookup.into_snapshot().is_empty());
    }

    #[test]
    fn test_success_is_normalized() {
        let body = r#"{"members":[{"id":1,"name":"Ann","age":40},{"id":"2","name":"Cy","age":8}],
                       "relationships":[{"person_a":1,"person_b":2,"type":"parent"}]}"#;
        let FamilyLookup::Found(snapshot) = parse_family_response(200, body).unwrap() else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.people.len(), 2);
        assert_eq!(snapshot.relationships[0].person_b, PersonId(2));
    }

    #[test]
    fn test_failures() {
        assert!(matches!(parse_family_response(500, ""), Err(ServiceError::Http { status: 500 })));
        assert!(matches!(parse_family_response(200, "{oops"), Err(ServiceError::Malformed(_))));
    }

    #[test]
    fn test_create_body() {
        let draft = propose_relationship(PersonId(5), PersonId(2), RelationType::Child).unwrap();
        let body = create_relationship_body(&draft);
        assert_eq!(body["person_a_id"], 2);
        assert_eq!(body["person_b_id"], 5);
        assert_eq!(body["relationship_type"], "parent");
        assert_eq!(body["active"], true);
    }

    #[test]
    fn test_write_responses() {
        let ok = parse_write_response(201, r#"{"id":"r9","person_a":1,"person_b":2,"type":"spouse"}"#).unwrap();
        assert_eq!(ok.unwrap().kind, RelationType::Spouse);
        assert_eq!(parse_write_response(204, "").unwrap(), None);

        match parse_write_response(422, r#"{"errors":["already related","try again"]}"#) {
            Err(ServiceError::Validation { message }) => assert_eq!(message, "already related; try again"),
            other => panic!("unexpected {other:?}"),
        }
        match parse_write_response(400, "nope") {
            Err(ServiceError::Validation { message }) => assert!(message.contains("could not be saved")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(parse_write_response(503, ""), Err(ServiceError::Http { status: 503 })));
    }
}
