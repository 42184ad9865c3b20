//! Command implementations and dispatch logic.
//!
//! Each command is an async function taking the shared [`CommandContext`].
//! Text rendering lives in small pure functions next to each handler.

use anyhow::Result;
use tracing::debug;
use x07_config::{AuthStrategy, SettingsLayering, SettingsLoader, TokenStore};
use x07_registry::Registry;

pub mod account;
pub mod index;
pub mod packages;

#[cfg(test)]
mod tests;

use crate::output::OutputHandler;
use crate::{Commands, GlobalArgs, TokenCommands};

/// Shared context for all commands
pub struct CommandContext {
    pub registry: Registry,
    pub tokens: TokenStore,
    pub output: OutputHandler,
    /// Print canonical JSON instead of text
    pub json: bool,
}

impl CommandContext {
    /// Layer settings (file, environment, flags) and fall back to the saved
    /// token when no credential was configured.
    pub async fn from_args(args: &GlobalArgs) -> Result<Self> {
        let file_settings = SettingsLoader::global()?.load().await?;
        let env_overrides = SettingsLayering::collect_env_overrides();
        let mut settings =
            SettingsLayering::merge(file_settings, &env_overrides, &args.overrides())?;

        let tokens = TokenStore::global()?;
        if settings.auth.is_anonymous() {
            if let Some(token) = tokens.load().await? {
                debug!("using saved token from {}", tokens.path());
                settings.auth = AuthStrategy::Bearer { token };
            }
        }

        Ok(Self::with_parts(Registry::new(&settings)?, tokens, args.json))
    }

    pub fn with_parts(registry: Registry, tokens: TokenStore, json: bool) -> Self {
        Self {
            registry,
            tokens,
            output: OutputHandler::new(),
            json,
        }
    }
}

/// Dispatch a command to its handler
pub async fn dispatch_command(command: Commands, ctx: &CommandContext) -> Result<()> {
    match command {
        Commands::Path { name } => index::path(&name, ctx),
        Commands::Entries { name } => index::entries(&name, ctx).await,
        Commands::Latest { name, req } => index::latest(&name, req.as_deref(), ctx).await,
        Commands::Info { name, version } => index::info(&name, version.as_deref(), ctx).await,
        Commands::Catalog => index::catalog(ctx).await,
        Commands::DownloadUrl { name, version } => index::download_url(&name, &version, ctx).await,
        Commands::Search {
            query,
            limit,
            offset,
        } => packages::search(query.as_deref().unwrap_or_default(), limit, offset, ctx).await,
        Commands::Owners { name } => packages::owners(&name, ctx).await,
        Commands::Yank {
            name,
            version,
            undo,
        } => packages::yank(&name, &version, !undo, ctx).await,
        Commands::Tokens { action } => match action {
            TokenCommands::List => account::list_tokens(ctx).await,
            TokenCommands::Create { label, scopes } => {
                account::create_token(&label, &scopes, ctx).await
            },
            TokenCommands::Revoke { id } => account::revoke_token(&id, ctx).await,
        },
        Commands::Whoami => account::whoami(ctx).await,
        Commands::Login { token } => account::login(&token, ctx).await,
        Commands::Logout => account::logout(ctx).await,
    }
}
