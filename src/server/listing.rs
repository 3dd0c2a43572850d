// Tailview - server/listing.rs
//
// Expands filespecs into the grouped file listing shipped to clients, and
// maintains the allowed-path set consulted by streaming and download
// authorisation. The listing is rebuilt on every "list" request so globs
// and directories pick up new files.

use crate::config::{FileSpec, FileSpecKind};
use crate::core::model::{ListEntry, Listing};
use crate::util::constants::DEFAULT_GROUP_KEY;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::Path;

/// A listing snapshot together with the set of paths a client is allowed
/// to tail or download.
#[derive(Debug, Default)]
pub struct ListingSnapshot {
    pub groups: Listing,
    allowed: HashSet<String>,
}

impl ListingSnapshot {
    pub fn is_allowed(&self, path: &str) -> bool {
        self.allowed.contains(path)
    }
}

/// Stat a path into a list entry. Missing files produce `exists: false`
/// with zeroed metadata — a filespec may point at a file that has not been
/// created yet.
fn file_info(path: &str) -> ListEntry {
    let mut entry = ListEntry {
        path: path.to_string(),
        alias: String::new(),
        size: 0,
        mtime: None,
        exists: false,
    };

    if let Ok(meta) = std::fs::metadata(path) {
        entry.exists = true;
        entry.size = meta.len();
        entry.mtime = meta
            .modified()
            .ok()
            .map(|mtime| DateTime::<Utc>::from(mtime));
    }

    entry
}

/// Display alias for a matched path when the spec has no explicit alias:
/// the path relative to the current directory, falling back to the path
/// itself.
fn relative_alias(path: &str) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| {
            Path::new(path)
                .strip_prefix(&cwd)
                .ok()
                .map(|rel| rel.display().to_string())
        })
        .unwrap_or_else(|| path.to_string())
}

/// Join a spec alias with a matched file's basename, as shown for glob and
/// directory matches (`alias=nginx` + `/var/log/nginx/access.log` ->
/// `nginx/access.log`).
fn joined_alias(alias: &str, path: &str) -> String {
    let base = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    format!("{alias}/{base}")
}

/// Build a fresh listing snapshot from the configured filespecs.
pub fn build_listing(specs: &[FileSpec]) -> ListingSnapshot {
    let mut snapshot = ListingSnapshot::default();

    for spec in specs {
        let group = spec
            .group
            .clone()
            .unwrap_or_else(|| DEFAULT_GROUP_KEY.to_string());

        let mut push = |mut entry: ListEntry| {
            snapshot.allowed.insert(entry.path.clone());
            if entry.alias.is_empty() {
                entry.alias = entry.path.clone();
            }
            snapshot.groups.entry(group.clone()).or_default().push(entry);
        };

        match spec.kind {
            FileSpecKind::File => {
                let mut entry = file_info(&spec.path);
                entry.alias = spec.alias.clone().unwrap_or_else(|| spec.path.clone());
                push(entry);
            }
            FileSpecKind::Glob => {
                let matches = match glob::glob(&spec.path) {
                    Ok(paths) => paths,
                    Err(e) => {
                        tracing::warn!(pattern = %spec.path, error = %e, "Bad glob pattern");
                        continue;
                    }
                };
                for path in matches.flatten() {
                    let path_str = path.display().to_string();
                    let mut entry = file_info(&path_str);
                    entry.alias = match &spec.alias {
                        Some(alias) => joined_alias(alias, &path_str),
                        None => relative_alias(&path_str),
                    };
                    push(entry);
                }
            }
            FileSpecKind::Dir => {
                for item in walkdir::WalkDir::new(&spec.path)
                    .follow_links(true)
                    .into_iter()
                    .filter_map(|item| item.ok())
                    .filter(|item| item.file_type().is_file())
                {
                    let path_str = item.path().display().to_string();
                    let mut entry = file_info(&path_str);
                    entry.alias = match &spec.alias {
                        Some(alias) => joined_alias(alias, &path_str),
                        None => relative_alias(&path_str),
                    };
                    push(entry);
                }
            }
        }
    }

    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_file_spec;
    use std::fs;

    fn fixture_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for name in ["1.log", "2.log", "3.log", "4.log"] {
            fs::write(dir.path().join(name), "line\n").unwrap();
        }
        dir
    }

    fn aliases(snapshot: &ListingSnapshot, group: &str) -> Vec<String> {
        snapshot.groups[group]
            .iter()
            .map(|e| e.alias.clone())
            .collect()
    }

    #[test]
    fn glob_spec_lists_matches_with_joined_aliases() {
        let dir = fixture_dir();
        let pattern = format!("{}/*.log", dir.path().display());

        let snapshot = build_listing(&[parse_file_spec(&pattern)]);
        assert_eq!(snapshot.groups[DEFAULT_GROUP_KEY].len(), 4);

        let spec = parse_file_spec(&format!("alias=logs,{pattern}"));
        let snapshot = build_listing(&[spec]);
        let mut got = aliases(&snapshot, DEFAULT_GROUP_KEY);
        got.sort();
        assert_eq!(got, ["logs/1.log", "logs/2.log", "logs/3.log", "logs/4.log"]);
    }

    #[test]
    fn file_specs_use_alias_and_group() {
        let dir = fixture_dir();
        let p1 = dir.path().join("1.log").display().to_string();
        let p2 = dir.path().join("2.log").display().to_string();

        let snapshot = build_listing(&[parse_file_spec(&p1), parse_file_spec(&p2)]);
        assert_eq!(aliases(&snapshot, DEFAULT_GROUP_KEY), [p1.clone(), p2.clone()]);

        let snapshot = build_listing(&[
            parse_file_spec(&format!("group=a,alias=a.log,{p1}")),
            parse_file_spec(&format!("group=b,alias=b.log,{p2}")),
        ]);
        assert_eq!(snapshot.groups["a"][0].alias, "a.log");
        assert!(snapshot.groups["a"][0].exists);
        assert_eq!(snapshot.groups["b"][0].alias, "b.log");
    }

    #[test]
    fn missing_file_is_listed_but_marked_absent() {
        let dir = fixture_dir();
        let missing = dir.path().join("na.log").display().to_string();
        let snapshot = build_listing(&[parse_file_spec(&missing)]);

        let entry = &snapshot.groups[DEFAULT_GROUP_KEY][0];
        assert!(!entry.exists);
        assert_eq!(entry.size, 0);
        assert!(entry.mtime.is_none());
        // Still tailable: tail -F waits for the file to appear.
        assert!(snapshot.is_allowed(&missing));
    }

    #[test]
    fn dir_spec_lists_recursively() {
        let dir = fixture_dir();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/5.log"), "line\n").unwrap();

        let snapshot = build_listing(&[parse_file_spec(&dir.path().display().to_string())]);
        assert_eq!(snapshot.groups[DEFAULT_GROUP_KEY].len(), 5);
    }

    #[test]
    fn paths_outside_the_specs_are_not_allowed() {
        let dir = fixture_dir();
        let p1 = dir.path().join("1.log").display().to_string();
        let snapshot = build_listing(&[parse_file_spec(&p1)]);
        assert!(snapshot.is_allowed(&p1));
        assert!(!snapshot.is_allowed("/etc/passwd"));
    }
}
