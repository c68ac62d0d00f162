mod auth;
mod programmers;
mod standby;
mod tasks;

use anyhow::Result;
use roster::domain::ports::outbound::{AuthClient, KeyValueStore, TableStore};

use crate::app::App;
use crate::cli::Commands;
use crate::config::RosterConfig;

pub async fn run<S: TableStore, K: KeyValueStore, A: AuthClient>(
    app: &App<S, K, A>,
    command: Commands,
) -> Result<()> {
    match command {
        Commands::Login { identifier } => auth::login(app, identifier).await,
        Commands::Register { username, email } => auth::register(app, &username, &email).await,
        Commands::Logout => auth::logout(app).await,
        Commands::Whoami => auth::whoami(app).await,
        Commands::ConfigPath => config_path(),
        Commands::Standby(command) => standby::run(app, command).await,
        Commands::Tasks(command) => tasks::run(app, command).await,
        Commands::Programmers(command) => programmers::run(app, command).await,
    }
}

pub fn config_path() -> Result<()> {
    let path = RosterConfig::config_path()?;
    if !path.exists() {
        RosterConfig::default().save()?;
        println!("Created default config at {}", path.display());
    } else {
        println!("{}", path.display());
    }
    Ok(())
}
