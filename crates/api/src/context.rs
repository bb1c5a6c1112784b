use toyshelf_core::UserId;

/// Authenticated caller of a protected route.
///
/// Inserted by the auth middleware; handlers never read identity from the
/// request body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UserContext {
    user_id: UserId,
}

impl UserContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
