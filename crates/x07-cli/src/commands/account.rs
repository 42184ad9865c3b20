//! Credential and account commands: `tokens`, `whoami`, `login` and
//! `logout`.

use anyhow::Result;
use x07_config::AuthStrategy;
use x07_core::types::{AccountResponse, AuthSessionResponse, TokenInfo};

use super::CommandContext;

pub async fn list_tokens(ctx: &CommandContext) -> Result<()> {
    let list = ctx.registry.list_tokens().await?;
    if ctx.json {
        return ctx.output.json(&list);
    }
    ctx.output.lines(render_tokens(&list.tokens));
    Ok(())
}

pub async fn create_token(label: &str, scopes: &[String], ctx: &CommandContext) -> Result<()> {
    let created = ctx.registry.create_token(label, scopes).await?;
    if ctx.json {
        return ctx.output.json(&created);
    }

    ctx.output
        .success(&format!("created token {} ({})", created.token_id, created.scopes.join(", ")));
    ctx.output.line(&created.token);
    ctx.output.warn("store this token now; it will not be shown again");
    Ok(())
}

pub async fn revoke_token(id: &str, ctx: &CommandContext) -> Result<()> {
    ctx.registry.revoke_token(id).await?;
    ctx.output.success(&format!("revoked token {}", id.trim()));
    Ok(())
}

/// Bearer credentials identify an account; otherwise ask for the session
pub async fn whoami(ctx: &CommandContext) -> Result<()> {
    if let AuthStrategy::Bearer { .. } = ctx.registry.auth() {
        let account = ctx.registry.account().await?;
        if ctx.json {
            return ctx.output.json(&account);
        }
        ctx.output.lines(render_account(&account));
        return Ok(());
    }

    let session = ctx.registry.auth_session().await?;
    if ctx.json {
        return ctx.output.json(&session);
    }
    ctx.output.lines(render_session(&session));
    Ok(())
}

pub async fn login(token: &str, ctx: &CommandContext) -> Result<()> {
    ctx.tokens.store(token).await?;
    ctx.output
        .success(&format!("token saved to {}", ctx.tokens.path()));
    Ok(())
}

/// Forget the saved token; session deployments also end the server session
pub async fn logout(ctx: &CommandContext) -> Result<()> {
    if let AuthStrategy::Session { .. } = ctx.registry.auth() {
        ctx.registry.logout().await?;
    }
    ctx.tokens.clear().await?;
    ctx.output.success("logged out");
    Ok(())
}

pub fn render_tokens(tokens: &[TokenInfo]) -> Vec<String> {
    if tokens.is_empty() {
        return vec!["no tokens".to_string()];
    }

    tokens
        .iter()
        .map(|token| {
            let mut line = format!(
                "{}  {}  [{}]  created {}",
                token.id,
                token.label,
                token.scopes.join(", "),
                token.created_at
            );
            if token.is_revoked() {
                line.push_str(&format!("  revoked {}", token.revoked_at.as_deref().unwrap_or("-")));
            } else if let Some(last_used_at) = &token.last_used_at {
                line.push_str(&format!("  last used {}", last_used_at));
            }
            line
        })
        .collect()
}

pub fn render_account(account: &AccountResponse) -> Vec<String> {
    vec![
        format!("{} ({})", account.handle, account.user_id),
        format!("token:  {}", account.token_id),
        format!("scopes: {}", account.scopes.join(", ")),
    ]
}

pub fn render_session(session: &AuthSessionResponse) -> Vec<String> {
    let user = match (&session.user, session.authenticated) {
        (Some(user), true) => user,
        _ => return vec!["not logged in".to_string()],
    };

    let mut lines = vec![format!("{} ({})", user.handle, user.id)];
    if let Some(email) = &user.email {
        let verified = if user.email_verified { "verified" } else { "unverified" };
        lines.push(format!("email:  {} ({})", email, verified));
    }
    if user.is_admin {
        lines.push("admin".to_string());
    }
    lines.push(format!("scopes: {}", user.scopes.join(", ")));
    lines
}
