use kernel::id::PrincipalId;

/// Principal identifier shared with the rest of the workspace
pub type UserId = PrincipalId;
