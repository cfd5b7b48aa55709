// Create an admin account, or promote an existing user to admin.
// Usage: cargo run --bin create_admin -- --email admin@example.com --password <password> [--name "Site Admin"]

use anyhow::{bail, Context};
use bcrypt::{hash, DEFAULT_COST};
use clap::Parser;
use std::sync::Arc;

use bookit_api::database;
use bookit_api::handlers::auth::{looks_like_email, normalize_email, MIN_PASSWORD_LEN};
use bookit_api::models::{NewUser, Role};
use bookit_api::store::{PgStore, UserStore};

#[derive(Parser, Debug)]
#[command(name = "create_admin", about = "Create or promote a BookIt admin account")]
struct Args {
    #[arg(long)]
    email: String,

    /// Required when the account does not exist yet.
    #[arg(long)]
    password: Option<String>,

    #[arg(long, default_value = "Administrator")]
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables
    dotenv::dotenv().ok();

    let email = normalize_email(&args.email);
    if !looks_like_email(&email) {
        bail!("'{}' is not a valid email address", args.email);
    }

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = database::new_pool(&database_url).await?;
    let store = Arc::new(PgStore::new(pool));

    if let Some(user) = store.find_user_by_email(&email).await? {
        if user.role.is_admin() {
            println!("{} is already an admin", email);
        } else {
            store.set_role(user.id, Role::Admin).await?;
            println!("Promoted {} to admin", email);
        }
        return Ok(());
    }

    let Some(password) = args.password else {
        bail!("No user with email {}; pass --password to create one", email);
    };
    if password.chars().count() < MIN_PASSWORD_LEN {
        bail!("Password must be at least {} characters", MIN_PASSWORD_LEN);
    }

    let password_hash = hash(&password, DEFAULT_COST)?;
    let user = store
        .create_user(NewUser {
            email,
            password_hash,
            display_name: args.name.trim().to_string(),
            role: Role::Admin,
        })
        .await?;

    println!("Admin user created: {} ({})", user.email, user.id);
    Ok(())
}
