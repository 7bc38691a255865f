use anyhow::{Context, bail};
use std::io::Write;

use crate::config::Config;
use crate::db::{NewUser, Store};

pub async fn cmd_user_create(
    config: &Config,
    username: &str,
    email: &str,
    is_admin: bool,
) -> anyhow::Result<()> {
    if username.trim().is_empty() || email.trim().is_empty() {
        bail!("Username and email are required");
    }

    print!("Password: ");
    std::io::stdout().flush()?;
    let mut password = String::new();
    std::io::stdin()
        .read_line(&mut password)
        .context("Failed to read password")?;
    let password = password.trim_end_matches(['\r', '\n']);

    if password.is_empty() {
        bail!("Password cannot be empty");
    }

    let store = Store::with_options(&config.database).await?;
    let created = store
        .create_user(&NewUser {
            username: username.trim(),
            email: email.trim(),
            password,
            is_admin,
        })
        .await?;

    match created {
        Some(user) => {
            println!(
                "✓ Created user {} <{}> (id {}){}",
                user.username,
                user.email,
                user.id,
                if user.is_admin { " as administrator" } else { "" }
            );
            Ok(())
        }
        None => bail!("Username or email already exists"),
    }
}

pub async fn cmd_user_set_active(config: &Config, email: &str, active: bool) -> anyhow::Result<()> {
    let store = Store::with_options(&config.database).await?;
    if !store.set_user_active(email, active).await? {
        bail!("No user with email {email}");
    }

    println!(
        "✓ {email} is now {}",
        if active { "active" } else { "inactive" }
    );
    Ok(())
}

pub async fn cmd_user_set_admin(config: &Config, email: &str, admin: bool) -> anyhow::Result<()> {
    let store = Store::with_options(&config.database).await?;
    if !store.set_user_admin(email, admin).await? {
        bail!("No user with email {email}");
    }

    println!(
        "✓ {email} {} administrator rights",
        if admin { "now has" } else { "no longer has" }
    );
    Ok(())
}
