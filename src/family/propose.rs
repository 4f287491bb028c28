//! Draft relationships for interactive edit flows.
//!
//! A draft is appended to the local snapshot for immediate feedback and handed
//! to the host for persistence. Draft ids are derived from the relationship
//! itself, so proposing the same link twice yields the same draft.

use thiserror::Error;

use super::{PersonId, RelationType, Relationship, RelationshipId};

/// Prefix of client-generated relationship ids.
pub const DRAFT_ID_PREFIX: &str = "draft";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProposalError {
    #[error("a person cannot be related to themselves (id {0})")]
    SelfRelationship(PersonId),
    #[error("unknown relationship type '{0}'")]
    UnknownType(String),
}

/// Build a draft relationship from `from` to `to`.
///
/// `child` drafts are normalized to `parent` here, so a draft never needs
/// normalizing again downstream.
pub fn propose_relationship(
    from: PersonId,
    to: PersonId,
    kind: RelationType,
) -> Result<Relationship, ProposalError> {
    if from == to {
        return Err(ProposalError::SelfRelationship(from));
    }
    let draft = Relationship {
        id: RelationshipId(String::new()),
        person_a: from,
        person_b: to,
        kind,
        active: true,
    }
    .normalized();

    let id = format!(
        "{DRAFT_ID_PREFIX}-{}-{}-{}",
        draft.person_a,
        draft.person_b,
        draft.kind.as_str()
    );
    Ok(Relationship {
        id: RelationshipId(id),
        ..draft
    })
}

/// Same as [`propose_relationship`] for relationship type text coming from a
/// picker. Unlike payload normalization, unknown text is rejected here.
pub fn propose_relationship_named(
    from: PersonId,
    to: PersonId,
    kind: &str,
) -> Result<Relationship, ProposalError> {
    let kind = RelationType::parse_known(kind)
        .ok_or_else(|| ProposalError::UnknownType(kind.to_string()))?;
    propose_relationship(from, to, kind)
}

pub fn is_draft(rel: &Relationship) -> bool {
    rel.id.0.starts_with(DRAFT_ID_PREFIX)
}
