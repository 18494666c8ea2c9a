//! Secret and category names.
//!
//! Both end up as path components under the vault root, so they are
//! sanitized before they ever reach the filesystem: path separators,
//! characters Windows refuses in file names, and control characters are
//! dropped, and leading dots are stripped so a name can never be `..`
//! or collide with the vault's own dotfiles.

use std::fmt;

use crate::errors::{Result, ShroudError};

/// Name of the reserved bucket holding top-level secrets.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Longest accepted name, in bytes (common file name limit).
const MAX_NAME_LEN: usize = 255;

const FORBIDDEN: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// A sanitized secret name, safe to use as a file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SecretName(String);

/// A sanitized category name, safe to use as a directory name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Category(String);

impl SecretName {
    /// Sanitize a raw secret name.
    ///
    /// Absent or blank input is `MissingName`; input that sanitizes
    /// down to nothing is `InvalidName`.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        let raw = match raw.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Err(ShroudError::MissingName),
        };
        Ok(Self(sanitize(raw)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Category {
    /// Sanitize a raw category.
    ///
    /// Absent or blank input, and the reserved `uncategorized` bucket
    /// name, map to `None` (the top-level namespace).
    pub fn parse(raw: Option<&str>) -> Result<Option<Self>> {
        let raw = match raw.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Ok(None),
        };
        let clean = sanitize(raw)?;
        if clean.eq_ignore_ascii_case(UNCATEGORIZED) {
            return Ok(None);
        }
        Ok(Some(Self(clean)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a combined `category/name` string into its parts.
///
/// Only the first `/` separates; anything without one is a bare name.
/// This is a caller-side convenience: the core API always takes the
/// two parts separately.
pub fn split_qualified(qualified: &str) -> (Option<&str>, &str) {
    match qualified.split_once('/') {
        Some((category, name)) => (Some(category), name),
        None => (None, qualified),
    }
}

/// Human-readable label for log lines and error messages.
pub(crate) fn display_key(name: &SecretName, category: Option<&Category>) -> String {
    match category {
        Some(c) => format!("{c}/{name}"),
        None => name.to_string(),
    }
}

fn sanitize(raw: &str) -> Result<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !FORBIDDEN.contains(c) && !c.is_control())
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim();

    if cleaned.is_empty() || cleaned.len() > MAX_NAME_LEN {
        return Err(ShroudError::InvalidName(raw.to_string()));
    }
    Ok(cleaned.to_string())
}
