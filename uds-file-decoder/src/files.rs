//! Definition file lookup
//!
//! Finds table files by name or pattern, resolves a module name to its
//! definition file through the redirect table and collects the files it
//! includes.

use crate::config::ReaderConfig;
use crate::fields::field;
use crate::segments::extract_segment;
use crate::tables::{Redirect, RedirectMap};
use crate::types::{DecoderError, Result};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Segment marker of the include list
pub const INCLUDE_SEGMENT: &str = "INC";

/// Match `name` against a pattern with `*` and `?` wildcards, ignoring ASCII case
pub fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().map(|c| c.to_ascii_lowercase()).collect();
    let name: Vec<char> = name.chars().map(|c| c.to_ascii_lowercase()).collect();

    let (mut p, mut n) = (0, 0);
    // Position of the last `*` and the name index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    p = star + 1;
                    n = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

/// Find the one regular file in `dir` (not recursive) whose name matches `pattern`
pub fn find_unique_file(dir: &Path, pattern: &str) -> Result<PathBuf> {
    let mut matches = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| DecoderError::io(dir, e))? {
        let entry = entry.map_err(|e| DecoderError::io(dir, e))?;
        if !entry.path().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if wildcard_match(pattern, name) {
                matches.push(entry.path());
            }
        }
    }

    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(DecoderError::Format(format!(
            "No file matching {} in {:?}",
            pattern, dir
        ))),
        n => Err(DecoderError::Format(format!(
            "{} files matching {} in {:?}, expected exactly one",
            n, pattern, dir
        ))),
    }
}

/// Locate `file_name` in `dir`.
///
/// The exact name wins. With `case_insensitive` set, a plain file name that
/// does not exist as spelled is searched for ignoring ASCII case.
pub fn locate_file(dir: &Path, file_name: &str, case_insensitive: bool) -> Option<PathBuf> {
    let exact = dir.join(file_name);
    if exact.is_file() {
        return Some(exact);
    }
    if !case_insensitive || Path::new(file_name).components().count() != 1 {
        return None;
    }

    let search_dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    fs::read_dir(search_dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .find(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.eq_ignore_ascii_case(file_name))
                && entry.path().is_file()
        })
        .map(|entry| dir.join(entry.file_name()))
}

fn not_found(path: PathBuf, what: &str) -> DecoderError {
    let source = io::Error::new(io::ErrorKind::NotFound, what.to_string());
    DecoderError::io(path, source)
}

/// Resolve a requested module file to the definition file backing it.
///
/// The module's own definition file is used when present. Otherwise the
/// upper-cased stem is looked up in `redirects`; an `EMPTY` target yields
/// [`DecoderError::UndefinedModule`].
pub fn resolve_definition_file(
    requested: &Path,
    redirects: &RedirectMap,
    config: &ReaderConfig,
) -> Result<PathBuf> {
    let dir = requested.parent().unwrap_or_else(|| Path::new(""));
    let stem = requested
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| DecoderError::Format(format!("Invalid file name: {:?}", requested)))?;

    let own_file = config.file_name(stem);
    if let Some(path) = locate_file(dir, &own_file, config.case_insensitive_files) {
        return Ok(path);
    }

    let target = match redirects.lookup(stem) {
        Some(Redirect::To(target)) => target,
        Some(Redirect::Empty) => return Err(DecoderError::UndefinedModule(stem.to_uppercase())),
        None => {
            let what = "no definition file and no redirect";
            return Err(not_found(dir.join(own_file), what));
        }
    };

    let target_file = Path::new(target.trim()).with_extension(config.bare_extension());
    let target_name = target_file.to_string_lossy();
    log::debug!("Redirect {} -> {}", stem, target_name);

    locate_file(dir, &target_name, config.case_insensitive_files)
        .ok_or_else(|| not_found(dir.join(target_file.as_path()), "redirect target not found"))
}

/// Collect `root` followed by every file it includes, recursively, in
/// discovery order. Each file appears once, so include cycles terminate.
pub fn collect_includes(root: &Path, config: &ReaderConfig) -> Result<Vec<PathBuf>> {
    if !root.is_file() {
        return Err(not_found(root.to_path_buf(), "definition file not found"));
    }

    let mut files = vec![root.to_path_buf()];
    let mut visited = HashSet::from([visit_key(root)]);
    collect_includes_into(root, config, &mut files, &mut visited)?;
    Ok(files)
}

fn collect_includes_into(
    file: &Path,
    config: &ReaderConfig,
    files: &mut Vec<PathBuf>,
    visited: &mut HashSet<PathBuf>,
) -> Result<()> {
    let dir = file.parent().unwrap_or_else(|| Path::new(""));

    for row in extract_segment(&[file], INCLUDE_SEGMENT)? {
        let name = field(&row, 1).trim();
        if name.is_empty() {
            continue;
        }

        let include_name = Path::new(name).with_extension(config.bare_extension());
        let Some(include) = locate_file(
            dir,
            &include_name.to_string_lossy(),
            config.case_insensitive_files,
        ) else {
            log::trace!(
                "Include {:?} of {:?} does not exist, skipped",
                include_name,
                file
            );
            continue;
        };

        if visited.insert(visit_key(&include)) {
            log::trace!("Include {:?} from {:?}", include, file);
            files.push(include.clone());
            collect_includes_into(&include, config, files, visited)?;
        }
    }

    Ok(())
}

fn visit_key(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn redirects(rows: &[[&str; 3]]) -> RedirectMap {
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|r| r.iter().map(|f| f.to_string()).collect())
            .collect();
        RedirectMap::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_wildcard_match() {
        assert!(wildcard_match("TTText*.rodtxt", "TTText_DE.rodtxt"));
        assert!(wildcard_match("TTText*.rodtxt", "tttext.RODTXT"));
        assert!(wildcard_match("Unit*.rodtxt", "Unit.rodtxt"));
        assert!(!wildcard_match("Unit*.rodtxt", "Units.txt"));
        assert!(!wildcard_match("Unit*.rodtxt", "MyUnit.rodtxt"));
        assert!(wildcard_match("R?.rodtxt", "RM.rodtxt"));
        assert!(!wildcard_match("R?.rodtxt", "RMX.rodtxt"));
        assert!(wildcard_match("*a*b", "xxaxxb"));
        assert!(!wildcard_match("*a*b", "xxaxxbc"));
    }

    #[test]
    fn test_locate_file_case_insensitive() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("EV_Foo.rodtxt"), "").unwrap();

        assert!(locate_file(dir.path(), "EV_Foo.rodtxt", false).is_some());
        assert!(locate_file(dir.path(), "ev_foo.rodtxt", false).is_none());
        assert_eq!(
            locate_file(dir.path(), "ev_foo.RODTXT", true).unwrap(),
            dir.path().join("EV_Foo.rodtxt")
        );
        assert!(locate_file(dir.path(), "other.rodtxt", true).is_none());
    }

    #[test]
    fn test_resolve_own_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("EV_A.rodtxt"), "").unwrap();
        let config = ReaderConfig::new();

        let path =
            resolve_definition_file(&dir.path().join("EV_A.prg"), &redirects(&[]), &config)
                .unwrap();
        assert_eq!(path, dir.path().join("EV_A.rodtxt"));
    }

    #[test]
    fn test_resolve_via_redirect() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("EV_B.rodtxt"), "").unwrap();
        let config = ReaderConfig::new();
        let map = redirects(&[["1", "EV_A", "EV_B"], ["2", "EV_C", "EV_MISSING"]]);

        let path = resolve_definition_file(&dir.path().join("ev_a"), &map, &config).unwrap();
        assert_eq!(path, dir.path().join("EV_B.rodtxt"));

        let err = resolve_definition_file(&dir.path().join("EV_C"), &map, &config).unwrap_err();
        assert!(matches!(err, DecoderError::Io { .. }));

        let err = resolve_definition_file(&dir.path().join("EV_D"), &map, &config).unwrap_err();
        assert!(matches!(err, DecoderError::Io { .. }));
    }

    #[test]
    fn test_resolve_empty_redirect() {
        let dir = TempDir::new().unwrap();
        let map = redirects(&[["1", "FOO", "EMPTY"]]);

        let err = resolve_definition_file(&dir.path().join("foo.ext"), &map, &ReaderConfig::new())
            .unwrap_err();
        assert!(matches!(err, DecoderError::UndefinedModule(ref m) if m == "FOO"));
    }

    #[test]
    fn test_collect_includes_with_cycle() {
        let dir = TempDir::new().unwrap();
        let d = dir.path();
        fs::write(d.join("A.rodtxt"), "[INC]\n1,B\n2,C.txt\n3,\n4,  \n5,Missing\n[/INC]\n")
            .unwrap();
        fs::write(d.join("B.rodtxt"), "[INC]\n1,D\n2,A\n[/INC]\n").unwrap();
        fs::write(d.join("C.rodtxt"), "[INC]\n1,B\n[/INC]\n").unwrap();
        fs::write(d.join("D.rodtxt"), "[MWB]\n1,x\n[/MWB]\n").unwrap();

        let files = collect_includes(&d.join("A.rodtxt"), &ReaderConfig::new()).unwrap();
        assert_eq!(
            files,
            vec![
                d.join("A.rodtxt"),
                d.join("B.rodtxt"),
                d.join("D.rodtxt"),
                d.join("C.rodtxt"),
            ]
        );
    }

    #[test]
    fn test_collect_includes_missing_root() {
        let dir = TempDir::new().unwrap();
        let result = collect_includes(&dir.path().join("none.rodtxt"), &ReaderConfig::new());
        assert!(matches!(result, Err(DecoderError::Io { .. })));
    }
}
