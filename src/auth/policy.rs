use super::AuthContext;

/// Decides whether an authenticated principal may use the admin routes
pub trait AccessPolicy: Send + Sync {
    fn allows(&self, ctx: &AuthContext) -> bool;
}

/// Admits principals whose `role` claim is one of the configured roles
#[derive(Debug, Clone)]
pub struct RoleAccessPolicy {
    roles: Vec<String>,
}

impl RoleAccessPolicy {
    pub fn new(roles: Vec<String>) -> Self {
        Self { roles }
    }
}

impl AccessPolicy for RoleAccessPolicy {
    fn allows(&self, ctx: &AuthContext) -> bool {
        ctx.role
            .as_deref()
            .is_some_and(|role| self.roles.iter().any(|allowed| allowed == role))
    }
}
