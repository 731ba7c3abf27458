// src/services/policy.rs - owner-or-read-only, in one place
//
// Every handler goes through these two predicates instead of re-deriving
// ownership checks per entity.
use uuid::Uuid;

/// Mutating operations require the requester to be the record's owner.
pub fn can_write(requester: Option<Uuid>, owner_id: Uuid) -> bool {
    requester == Some(owner_id)
}

/// Reads are allowed on shared records, and on anything the requester owns.
pub fn can_read(requester: Option<Uuid>, owner_id: Uuid, shared: bool) -> bool {
    shared || can_write(requester, owner_id)
}
