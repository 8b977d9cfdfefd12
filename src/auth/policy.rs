use super::claims::Identity;
use crate::error::ApiError;

/// The single privileged role value. Roles stay an open string set; this
/// is the only place the privileged one is spelled out.
pub const ADMIN_ROLE: &str = "admin";

/// Exact string equality, no hierarchy.
pub fn has_role(identity: &Identity, role: &str) -> bool {
    identity.role == role
}

pub fn is_admin(identity: &Identity) -> bool {
    has_role(identity, ADMIN_ROLE)
}

/// Gate for admin-only endpoints. Rejects with a 403, distinct from the
/// 401 used when no identity could be resolved at all.
pub fn require_admin(identity: &Identity) -> Result<(), ApiError> {
    if is_admin(identity) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_role(role: &str) -> Identity {
        Identity {
            user_id: 1,
            username: "alice".into(),
            role: role.into(),
        }
    }

    #[test]
    fn admin_role_passes() {
        assert!(is_admin(&with_role("admin")));
        assert!(require_admin(&with_role("admin")).is_ok());
    }

    #[test]
    fn any_other_role_is_rejected() {
        for role in ["user", "Admin", "ADMIN", "", "superadmin"] {
            assert!(!is_admin(&with_role(role)), "{role:?} must not pass");
            assert!(matches!(
                require_admin(&with_role(role)),
                Err(ApiError::Forbidden)
            ));
        }
    }
}
