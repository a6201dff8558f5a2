//! Startup bootstrap of the `users` table

use crate::error::Result;
use crate::store::UserStore;
use crate::types::ADMIN_ROLE;
use tracing::info;

/// Create the `users` table and force `admin_email` to the admin role.
///
/// Safe to run on every start: the admin row always ends with role `admin`,
/// whatever it held before.
pub async fn bootstrap<S>(store: &S, admin_email: &str) -> Result<()>
where
    S: UserStore + ?Sized,
{
    store.ensure_schema().await?;
    info!("Users table ready");

    store.force_role(admin_email, ADMIN_ROLE).await?;
    info!(email = admin_email, "Bootstrap administrator ensured");

    Ok(())
}
