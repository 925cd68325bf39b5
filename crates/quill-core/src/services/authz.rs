//! Ownership checks.

use crate::domain::UserId;

/// True iff `acting` is the owner of a resource owned by `owner`.
///
/// Both sides are compared in canonical form, so a UUID taken from a token
/// claim matches the same UUID read back from the database regardless of notation.
pub fn is_owner(acting: &UserId, owner: &UserId) -> bool {
    !acting.is_empty() && acting.as_str() == owner.as_str()
}
