//! Package name validation and sparse-index sharding.

use crate::error::{ApiError, X07Result};

/// Namespaces that are always considered official
const BUILTIN_NAMESPACES: [&str; 2] = ["x07lang", "x07"];

/// Validate a package name against `^[a-z][a-z0-9_-]*$`
pub fn validate_package_name(name: &str) -> X07Result<()> {
    let mut chars = name.chars();
    let first = chars
        .next()
        .ok_or_else(|| ApiError::invalid_input("package name must be non-empty"))?;

    let valid = first.is_ascii_lowercase()
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid {
        return Err(ApiError::invalid_input(format!(
            "package name must match ^[a-z][a-z0-9_-]*$: {}",
            name
        )));
    }
    Ok(())
}

/// Map a package name to its shard path inside the sparse index.
///
/// | length | path |
/// |---|---|
/// | 1 | `1/<name>` |
/// | 2 | `2/<name>` |
/// | 3 | `3/<c0>/<name>` |
/// | 4+ | `<c0c1>/<c2c3>/<name>` |
pub fn index_relative_path(name: &str) -> X07Result<String> {
    validate_package_name(name)?;

    // Validated names are ASCII, so byte slicing is char slicing.
    let path = match name.len() {
        1 => format!("1/{}", name),
        2 => format!("2/{}", name),
        3 => format!("3/{}/{}", &name[..1], name),
        _ => format!("{}/{}/{}", &name[..2], &name[2..4], name),
    };
    Ok(path)
}

/// Check whether a package belongs to a verified or built-in namespace
pub fn is_official_package(name: &str, verified_namespaces: Option<&[String]>) -> bool {
    let verified = verified_namespaces.unwrap_or_default().iter().map(String::as_str);

    verified
        .chain(BUILTIN_NAMESPACES)
        .map(str::trim)
        .filter(|ns| !ns.is_empty())
        .any(|ns| {
            name == ns
                || name
                    .strip_prefix(ns)
                    .is_some_and(|rest| rest.starts_with('-') || rest.starts_with('/'))
        })
}
