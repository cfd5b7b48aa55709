use crate::models::{NewUser, Role};
use crate::store::UserStore;

/// Create the first admin from `ADMIN_EMAIL`/`ADMIN_PASSWORD` when the user
/// table is empty.
pub async fn seed_admin(users: &dyn UserStore, email: Option<&str>, password: Option<&str>) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (email, password) else {
        tracing::debug!("ADMIN_EMAIL/ADMIN_PASSWORD not set, skipping admin seed");
        return Ok(());
    };

    let count = users.count_users().await?;
    if count > 0 {
        tracing::info!(users = count, "Database already has users, skipping admin seed");
        return Ok(());
    }

    let email = email.trim().to_lowercase();
    tracing::info!(%email, "Creating initial admin user...");

    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    let user = users
        .create_user(NewUser {
            email,
            password_hash,
            display_name: "Administrator".to_string(),
            role: Role::Admin,
        })
        .await?;

    tracing::info!(user_id = %user.id, "Initial admin user created successfully");
    Ok(())
}
