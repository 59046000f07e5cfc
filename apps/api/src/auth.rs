mod bootstrap;
mod password;
mod session;

use tasklane_core::{AppError, UserIdentity};
use tower_sessions::Session;

pub use bootstrap::bootstrap_handler;
pub use password::{change_password_handler, forgot_password_handler, reset_password_handler};
pub use session::{login_handler, logout_handler, me_handler};

pub const SESSION_USER_KEY: &str = "user_identity";

/// Rotates the session id and stores the signed-in identity.
async fn establish_session(session: &Session, identity: &UserIdentity) -> Result<(), AppError> {
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, identity)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist session identity: {error}")))
}
