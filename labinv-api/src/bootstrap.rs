/// Startup tasks
///
/// Registration is ADMIN-only, so a fresh database needs one administrator
/// created out of band. When `BOOTSTRAP_ADMIN_CORREO` and
/// `BOOTSTRAP_ADMIN_PASSWORD` are set, [`ensure_admin`] creates that
/// account unless the correo is already taken. An existing account is
/// never modified.

use crate::config::BootstrapAdmin;
use labinv_shared::{
    auth::password::hash_password,
    models::user::{CreateUser, Role},
    store::Store,
};

/// Creates the bootstrap administrator if its correo is free
///
/// Returns `true` when an account was created.
pub async fn ensure_admin(store: &dyn Store, admin: &BootstrapAdmin) -> anyhow::Result<bool> {
    if store.find_user_by_correo(&admin.correo).await?.is_some() {
        tracing::debug!(correo = %admin.correo, "Bootstrap admin already exists");
        return Ok(false);
    }

    let user = store
        .create_user(CreateUser {
            nombre: admin.nombre.clone(),
            correo: admin.correo.clone(),
            password_hash: hash_password(&admin.password)?,
            rol: Role::Admin,
        })
        .await?;

    tracing::info!(user_id = user.id, correo = %user.correo, "Bootstrap admin created");
    Ok(true)
}
