use anyhow::{Context, Result};
use roster::domain::ports::outbound::{AuthClient, KeyValueStore, TableStore};

use crate::app::App;
use crate::prompt::{read_line, read_password};

pub async fn login<S: TableStore, K: KeyValueStore, A: AuthClient>(
    app: &App<S, K, A>,
    identifier: Option<String>,
) -> Result<()> {
    let identifier = match identifier {
        Some(identifier) => identifier,
        None => read_line("Username or email: ")?,
    };
    let password = read_password("Password: ")?;

    match app.auth.sign_in(&identifier, &password).await? {
        Some(identity) => println!("Signed in as {} <{}>.", identity.username, identity.email),
        None => println!("Sign-in accepted, but no account details came back. Nothing was saved."),
    }
    Ok(())
}

pub async fn register<S: TableStore, K: KeyValueStore, A: AuthClient>(
    app: &App<S, K, A>,
    username: &str,
    email: &str,
) -> Result<()> {
    let password = read_password("Password: ")?;
    let message = app.auth.register(username, email, &password).await?;
    println!(
        "{} Run `roster login` to sign in.",
        message.as_deref().unwrap_or("Account created.")
    );
    Ok(())
}

pub async fn logout<S: TableStore, K: KeyValueStore, A: AuthClient>(
    app: &App<S, K, A>,
) -> Result<()> {
    app.gate
        .sign_out()
        .await
        .context("Failed to remove local session")?;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami<S: TableStore, K: KeyValueStore, A: AuthClient>(
    app: &App<S, K, A>,
) -> Result<()> {
    if !app.gate.is_authenticated().await {
        println!("Not signed in.");
        return Ok(());
    }
    if let Some(identity) = app.gate.identity() {
        println!("{} <{}> (id {})", identity.username, identity.email, identity.id);
    }
    Ok(())
}
