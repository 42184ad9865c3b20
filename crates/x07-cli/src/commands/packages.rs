//! Registry API commands about packages: `search`, `owners` and `yank`.

use anyhow::Result;
use x07_core::types::{OwnersResponse, SearchResponse};

use super::CommandContext;

pub async fn search(query: &str, limit: u64, offset: u64, ctx: &CommandContext) -> Result<()> {
    let page = ctx.registry.search(query, limit, offset).await?;
    if ctx.json {
        return ctx.output.json(&page);
    }
    ctx.output.lines(render_search(&page));
    Ok(())
}

pub async fn owners(name: &str, ctx: &CommandContext) -> Result<()> {
    let owners = ctx.registry.owners(name).await?;
    if ctx.json {
        return ctx.output.json(&owners);
    }
    ctx.output.lines(render_owners(&owners));
    Ok(())
}

pub async fn yank(name: &str, version: &str, yanked: bool, ctx: &CommandContext) -> Result<()> {
    let response = ctx.registry.yank(name, version, yanked).await?;
    if ctx.json {
        return ctx.output.json(&response);
    }

    let action = if response.yanked { "yanked" } else { "un-yanked" };
    ctx.output
        .success(&format!("{} {}@{}", action, response.name, response.version));
    Ok(())
}

pub fn render_search(page: &SearchResponse) -> Vec<String> {
    if page.packages.is_empty() {
        return vec!["no packages found".to_string()];
    }

    let width = page.packages.iter().map(|p| p.name.len()).max().unwrap_or(0);
    let mut lines: Vec<String> = page
        .packages
        .iter()
        .map(|hit| {
            let latest = hit.latest_version.as_deref().unwrap_or("-");
            let mut line = format!("{:width$}  {}", hit.name, latest, width = width);
            if let Some(description) = &hit.description {
                line.push_str("  ");
                line.push_str(description);
            }
            line
        })
        .collect();

    let first = page.offset + 1;
    let last = page.offset + page.packages.len() as u64;
    lines.push(format!("showing {} to {} of {}", first, last, page.total));
    lines
}

pub fn render_owners(owners: &OwnersResponse) -> Vec<String> {
    if owners.owners.is_empty() {
        return vec![format!("{} has no owners", owners.name)];
    }
    owners.owners.clone()
}
