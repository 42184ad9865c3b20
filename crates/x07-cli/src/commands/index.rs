//! Read-only commands backed by the sparse index: `path`, `entries`,
//! `latest`, `info`, `catalog` and `download-url`.

use anyhow::{anyhow, Result};
use serde::Serialize;
use x07_core::error::ApiError;
use x07_core::types::{Catalog, IndexEntry, PackageMetadataResponse};
use x07_core::utils::index_relative_path;
use x07_resolver::{parse_version, Version, VersionReq, VersionSelector};

use super::CommandContext;

#[derive(Serialize)]
struct PathReport<'a> {
    name: &'a str,
    path: String,
}

#[derive(Serialize)]
struct LatestReport<'a> {
    name: &'a str,
    version: Option<String>,
}

#[derive(Serialize)]
struct InfoReport<'a> {
    #[serde(flatten)]
    metadata: &'a PackageMetadataResponse,
    official: bool,
    download_url: &'a str,
}

#[derive(Serialize)]
struct UrlReport<'a> {
    name: &'a str,
    version: &'a str,
    url: &'a str,
}

/// Print the shard path; no request is made
pub fn path(name: &str, ctx: &CommandContext) -> Result<()> {
    let path = index_relative_path(name)?;
    if ctx.json {
        return ctx.output.json(&PathReport { name, path });
    }
    ctx.output.line(&path);
    Ok(())
}

pub async fn entries(name: &str, ctx: &CommandContext) -> Result<()> {
    let entries = ctx.registry.index_entries(name).await?;
    if ctx.json {
        return ctx.output.json(&entries);
    }

    if entries.is_empty() {
        ctx.output.info(&format!("{} has no published versions", name));
    }
    ctx.output.lines(render_entries(&entries));
    Ok(())
}

pub async fn latest(name: &str, req: Option<&str>, ctx: &CommandContext) -> Result<()> {
    let entries = ctx.registry.index_entries(name).await?;
    let version = select_version(&entries, req)?;

    if ctx.json {
        let version = version.map(|v| v.to_string());
        return ctx.output.json(&LatestReport { name, version });
    }
    match version {
        Some(version) => {
            ctx.output.line(&version.to_string());
            Ok(())
        },
        None => Err(anyhow!("no usable version of {}", name)),
    }
}

pub async fn info(name: &str, version: Option<&str>, ctx: &CommandContext) -> Result<()> {
    let version = match version {
        Some(version) => version.to_string(),
        None => {
            let entries = ctx.registry.index_entries(name).await?;
            let latest = select_version(&entries, None)?
                .ok_or_else(|| anyhow!("no usable version of {}", name))?;
            published_version(&entries, &latest)
        },
    };

    let metadata = ctx.registry.package_metadata(name, &version).await?;
    let official = ctx.registry.is_official(name).await?;
    let download_url = ctx.registry.download_url(name, &version).await?;

    if ctx.json {
        return ctx.output.json(&InfoReport {
            metadata: &metadata,
            official,
            download_url: download_url.as_str(),
        });
    }
    ctx.output
        .lines(render_info(&metadata, official, download_url.as_str()));
    Ok(())
}

pub async fn catalog(ctx: &CommandContext) -> Result<()> {
    let catalog = ctx.registry.catalog().await?;
    if ctx.json {
        return ctx.output.json(&catalog);
    }
    ctx.output.lines(render_catalog(&catalog));
    Ok(())
}

pub async fn download_url(name: &str, version: &str, ctx: &CommandContext) -> Result<()> {
    let url = ctx.registry.download_url(name, version).await?;
    if ctx.json {
        return ctx.output.json(&UrlReport {
            name,
            version,
            url: url.as_str(),
        });
    }
    ctx.output.line(url.as_str());
    Ok(())
}

/// Latest usable version, restricted to `req` when given
pub fn select_version(entries: &[IndexEntry], req: Option<&str>) -> Result<Option<Version>> {
    let selector = VersionSelector::from_entries(entries);
    let Some(req) = req else {
        return Ok(selector.latest_usable().cloned());
    };

    let parsed = VersionReq::parse(req).map_err(|e| {
        ApiError::invalid_input(format!("invalid version requirement {}: {}", req, e))
    })?;
    Ok(selector.select_matching(&parsed).cloned())
}

/// Version string as the index publishes it, so `v1.0.0` stays `v1.0.0`
pub fn published_version(entries: &[IndexEntry], version: &Version) -> String {
    entries
        .iter()
        .filter(|entry| !entry.yanked)
        .find(|entry| parse_version(&entry.version).ok().as_ref() == Some(version))
        .map(|entry| entry.version.clone())
        .unwrap_or_else(|| version.to_string())
}

/// One line per entry, in index order
pub fn render_entries(entries: &[IndexEntry]) -> Vec<String> {
    let width = entries.iter().map(|e| e.version.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|entry| {
            let mut line = format!("{:width$}  {}", entry.version, entry.cksum, width = width);
            if entry.yanked {
                line.push_str("  (yanked)");
            }
            line
        })
        .collect()
}

pub fn render_info(
    metadata: &PackageMetadataResponse,
    official: bool,
    download_url: &str,
) -> Vec<String> {
    let package = &metadata.package;
    let badge = if official { " (official)" } else { "" };

    let mut lines = vec![format!("{} {}{}", package.name, package.version, badge)];
    if let Some(description) = &package.description {
        lines.push(description.clone());
    }
    lines.push(String::new());
    lines.push(format!("module root: {}", package.module_root));
    lines.push(format!("modules:     {}", package.modules.join(", ")));
    lines.push(format!("checksum:    {}", metadata.cksum));
    lines.push(format!("download:    {}", download_url));
    lines
}

pub fn render_catalog(catalog: &Catalog) -> Vec<String> {
    let width = catalog
        .packages
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(0);
    catalog
        .packages
        .iter()
        .map(|package| {
            let latest = package.latest.as_deref().unwrap_or("-");
            format!("{:width$}  {}", package.name, latest, width = width)
        })
        .collect()
}
