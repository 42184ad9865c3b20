//! Common utilities and fixtures for benchmarks

use std::time::Duration;

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};
use serde_json::json;
use x07_core::types::IndexEntry;

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(Duration::from_secs(2))
        .measurement_time(Duration::from_secs(5))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// Version string number `i` of a release history; every seventh is a
/// pre-release and every tenth is not valid semver
pub fn version_at(i: usize) -> String {
    let (major, minor, patch) = (i / 100, (i / 10) % 10, i % 10);
    match i {
        i if i % 10 == 9 => format!("v{}.{}", major, minor),
        i if i % 7 == 0 => format!("{}.{}.{}-rc.{}", major, minor, patch, i % 3),
        _ => format!("{}.{}.{}", major, minor, patch),
    }
}

/// Index entries for `count` published versions, every fifth yanked
pub fn index_entries(count: usize) -> Vec<IndexEntry> {
    (0..count)
        .map(|i| {
            IndexEntry::new(
                "x07lang-bench",
                version_at(i),
                format!("sha256:{:064x}", i),
                i % 5 == 4,
            )
        })
        .collect()
}

/// NDJSON index file text for `count` versions
pub fn index_file(count: usize) -> String {
    index_entries(count)
        .iter()
        .map(|entry| {
            json!({
                "schema_version": entry.schema_version,
                "name": entry.name,
                "version": entry.version,
                "cksum": entry.cksum,
                "yanked": entry.yanked,
            })
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Package names of lengths 1 through `max_len`
pub fn package_names(max_len: usize) -> Vec<String> {
    (1..=max_len)
        .map(|len| "x07lang-bench-package".chars().cycle().take(len).collect())
        .collect()
}
