use tracing::warn;

use tipster_db::Database;
use tipster_types::models::User;

use crate::error::ApiError;

const ADMIN_REQUIRED: &str = "Admin access required";

/// A user that passed [`require_admin`].
#[derive(Debug, Clone)]
pub struct AdminUser(User);

impl AdminUser {
    pub fn id(&self) -> &str {
        &self.0.id
    }
}

/// The single authorization check for admin routes.
///
/// Call it in the same blocking task as the mutation it protects, or before
/// taking the fixture store's write lock.
pub fn require_admin(db: &Database, user_id: &str) -> Result<AdminUser, ApiError> {
    match db.get_user(user_id)? {
        Some(user) if user.is_admin => Ok(AdminUser(user)),
        Some(_) => {
            warn!("Non-admin '{}' attempted an admin action", user_id);
            Err(ApiError::Forbidden(ADMIN_REQUIRED.to_string()))
        }
        None => {
            warn!("Unknown user '{}' attempted an admin action", user_id);
            Err(ApiError::Forbidden(ADMIN_REQUIRED.to_string()))
        }
    }
}

/// Look up a user that must exist.
pub fn require_user(db: &Database, user_id: &str) -> Result<User, ApiError> {
    db.get_user(user_id)?.ok_or_else(|| ApiError::user_not_found(user_id))
}
