use uuid::Uuid;

use crate::error::ApiError;

/// Kind of access being attempted on a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// Ownership policy: reads are open to any authenticated identity, writes
/// only to the recipe's owner. Pure predicate, no side effects.
pub fn check(op: Operation, identity: Uuid, owner: Uuid) -> Result<(), ApiError> {
    match op {
        Operation::Read => Ok(()),
        Operation::Write if identity == owner => Ok(()),
        Operation::Write => Err(ApiError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_may_write() {
        let owner = Uuid::new_v4();
        assert!(check(Operation::Write, owner, owner).is_ok());
    }

    #[test]
    fn non_owner_may_not_write() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let err = check(Operation::Write, other, owner).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn anyone_authenticated_may_read() {
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        assert!(check(Operation::Read, other, owner).is_ok());
        assert!(check(Operation::Read, owner, owner).is_ok());
    }
}
