//! `.env` file parsing and in-place writers. Grounded on
//! `original_source/src/frago/recipes/env_loader.py`'s `load_env_file`,
//! `save_env_file`, and `update_env_file`.

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use std::sync::LazyLock;

use crate::error::EnvError;

static LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)=(.*)$").unwrap());

fn strip_quotes(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}

/// Parses a `.env` file. Missing file returns an empty map (absence is
/// normal for optional tiers). Comments (`#`) and blank lines are
/// skipped; non-matching lines are ignored.
pub fn load_env_file(path: &Path) -> Result<BTreeMap<String, String>, EnvError> {
    let mut vars = BTreeMap::new();
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vars),
        Err(e) => return Err(e.into()),
    };

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(caps) = LINE_RE.captures(trimmed) {
            let key = caps[1].to_string();
            let value = strip_quotes(caps[2].trim());
            vars.insert(key, value);
        }
    }

    Ok(vars)
}

/// Overwrites `path` entirely with `vars`, one `KEY=VALUE` per line.
pub fn save_env_file(path: &Path, vars: &BTreeMap<String, String>) -> Result<(), EnvError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut content = String::new();
    for (key, value) in vars {
        content.push_str(&format!("{key}={value}\n"));
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Applies `updates` to an existing `.env` file, preserving comments and
/// unrelated/unrecognized lines. `None` deletes the key. New keys not
/// already present are appended at the end.
pub fn update_env_file(path: &Path, updates: &BTreeMap<String, Option<String>>) -> Result<(), EnvError> {
    let existing = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };

    let mut seen = std::collections::HashSet::new();
    let mut out_lines = Vec::new();

    for line in existing.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            out_lines.push(line.to_string());
            continue;
        }
        match LINE_RE.captures(trimmed) {
            Some(caps) => {
                let key = caps[1].to_string();
                match updates.get(&key) {
                    Some(Some(new_value)) => {
                        out_lines.push(format!("{key}={new_value}"));
                        seen.insert(key);
                    }
                    Some(None) => {
                        seen.insert(key);
                    }
                    None => out_lines.push(line.to_string()),
                }
            }
            None => out_lines.push(line.to_string()),
        }
    }

    for (key, value) in updates {
        if seen.contains(key) {
            continue;
        }
        if let Some(value) = value {
            out_lines.push(format!("{key}={value}"));
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut content = out_lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parses_quoted_and_unquoted_values_skipping_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "# a comment\nTOKEN=\"abc123\"\nNAME=plain\n\nPATHLESS='single quoted'\n",
        )
        .unwrap();

        let vars = load_env_file(&path).unwrap();
        assert_eq!(vars.get("TOKEN").unwrap(), "abc123");
        assert_eq!(vars.get("NAME").unwrap(), "plain");
        assert_eq!(vars.get("PATHLESS").unwrap(), "single quoted");
    }

    #[test]
    fn missing_file_returns_empty_map() {
        let dir = tempdir().unwrap();
        let vars = load_env_file(&dir.path().join("nope.env")).unwrap();
        assert!(vars.is_empty());
    }

    #[test]
    fn update_preserves_comments_and_deletes_on_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "# keep me\nTOKEN=old\nUNRELATED=1\n").unwrap();

        let mut updates = BTreeMap::new();
        updates.insert("TOKEN".to_string(), Some("new".to_string()));
        updates.insert("UNRELATED".to_string(), None);
        updates.insert("NEWKEY".to_string(), Some("value".to_string()));
        update_env_file(&path, &updates).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("# keep me"));
        assert!(content.contains("TOKEN=new"));
        assert!(!content.contains("UNRELATED"));
        assert!(content.contains("NEWKEY=value"));
    }

    #[test]
    fn save_overwrites_entirely() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "STALE=1\n").unwrap();

        let mut vars = BTreeMap::new();
        vars.insert("FRESH".to_string(), "2".to_string());
        save_env_file(&path, &vars).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(!content.contains("STALE"));
        assert!(content.contains("FRESH=2"));
    }
}
