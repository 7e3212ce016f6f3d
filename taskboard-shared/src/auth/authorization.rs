/// Role-based access checks
///
/// A [`RolePolicy`] is the set of roles allowed through a route group. The
/// caller's role is not carried in the token; [`require_role`] reads it from
/// the user store on every request, so a demotion takes effect immediately.
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::auth::authorization::{require_role, RolePolicy};
/// use taskboard_shared::auth::middleware::AuthContext;
/// use taskboard_shared::store::UserStore;
///
/// # async fn example(users: &dyn UserStore, auth: &AuthContext) -> Result<(), Box<dyn std::error::Error>> {
/// require_role(users, auth, &RolePolicy::admin_only()).await?;
/// # Ok(())
/// # }
/// ```

use std::fmt;

use super::middleware::AuthContext;
use crate::models::Role;
use crate::store::{StoreError, UserStore};

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Role is not in the policy's allowed set
    #[error("Insufficient permissions: role {0} is not allowed")]
    Forbidden(Role),

    /// Token subject no longer exists
    #[error("Unknown subject")]
    UnknownSubject,

    /// Role lookup failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Allowed-roles set attached to a route group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePolicy {
    allowed: Vec<Role>,
}

impl RolePolicy {
    /// Policy over `allowed`; repeats are dropped, first occurrence wins
    pub fn new(allowed: impl IntoIterator<Item = Role>) -> Self {
        let mut roles = Vec::new();
        for role in allowed {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }
        Self { allowed: roles }
    }

    pub fn admin_only() -> Self {
        Self::new([Role::Admin])
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed.contains(&role)
    }

    pub fn check(&self, role: Role) -> Result<(), AuthzError> {
        if !self.allows(role) {
            return Err(AuthzError::Forbidden(role));
        }

        Ok(())
    }
}

impl fmt::Display for RolePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.allowed.iter().map(Role::as_str).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Looks up the caller's current role and checks it against `policy`
///
/// Returns the role on success.
pub async fn require_role(
    users: &dyn UserStore,
    auth: &AuthContext,
    policy: &RolePolicy,
) -> Result<Role, AuthzError> {
    let user = users
        .find_by_id(auth.user_id)
        .await?
        .ok_or(AuthzError::UnknownSubject)?;

    policy.check(user.role)?;

    Ok(user.role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewUser;
    use crate::store::memory::MemoryStore;
    use uuid::Uuid;

    async fn seeded(role: Role) -> (MemoryStore, AuthContext) {
        let store = MemoryStore::new();
        let user = store
            .create(NewUser {
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
                password_hash: "hash".to_string(),
                role,
            })
            .await
            .unwrap();

        let auth = AuthContext {
            user_id: user.id,
            email: user.email,
        };
        (store, auth)
    }

    #[test]
    fn test_policy_check() {
        let policy = RolePolicy::admin_only();
        assert!(policy.check(Role::Admin).is_ok());
        assert!(matches!(
            policy.check(Role::User),
            Err(AuthzError::Forbidden(Role::User))
        ));

        let everyone = RolePolicy::new([Role::Admin, Role::User]);
        assert!(everyone.allows(Role::User));
        assert_eq!(everyone.to_string(), "{admin, user}");
    }

    #[test]
    fn test_policy_drops_repeated_roles() {
        let policy = RolePolicy::new([Role::Admin, Role::User, Role::Admin]);
        assert_eq!(policy, RolePolicy::new([Role::Admin, Role::User]));
        assert_eq!(policy.to_string(), "{admin, user}");
    }

    #[tokio::test]
    async fn test_require_role_admin() {
        let (store, auth) = seeded(Role::Admin).await;
        let role = require_role(&store, &auth, &RolePolicy::admin_only())
            .await
            .unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[tokio::test]
    async fn test_require_role_forbidden() {
        let (store, auth) = seeded(Role::User).await;
        let result = require_role(&store, &auth, &RolePolicy::admin_only()).await;
        assert!(matches!(result, Err(AuthzError::Forbidden(Role::User))));
    }

    #[tokio::test]
    async fn test_require_role_unknown_subject() {
        let store = MemoryStore::new();
        let auth = AuthContext {
            user_id: Uuid::new_v4(),
            email: "ghost@example.com".to_string(),
        };

        let result = require_role(&store, &auth, &RolePolicy::admin_only()).await;
        assert!(matches!(result, Err(AuthzError::UnknownSubject)));
    }
}
