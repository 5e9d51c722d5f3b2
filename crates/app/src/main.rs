mod commands;
mod config;
mod error;
mod local_state;
mod render;

use std::io::{self, BufRead};

use client::{RestIdentity, RestStore};

use crate::{commands::Context, error::Result, local_state::LocalState};

#[tokio::main]
async fn main() -> Result<()> {
    let (settings, command) = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "finance={level},client={level},engine={level}",
            level = settings.level
        ))
        .with_writer(io::stderr)
        .init();

    let store =
        RestStore::new(&settings.base_url, &settings.anon_key)?.with_table(&settings.table);
    let identity = RestIdentity::new(&settings.base_url, &settings.anon_key)?;
    let state = LocalState::load(&settings.state_path)?;

    let mut context = Context::open(
        store,
        identity,
        state,
        settings.owner,
        chrono::Local::now(),
    )
    .await;

    let mut input: Box<dyn BufRead> = match std::env::var("FINANCE_PASSWORD") {
        Ok(password) => Box::new(io::Cursor::new(format!("{password}\n"))),
        Err(_) => Box::new(io::stdin().lock()),
    };
    let outcome = context
        .execute(command, &mut input, &mut io::stdout().lock())
        .await;

    // the session may have been refreshed even when the command failed
    context.finish().save(&settings.state_path)?;
    outcome
}
