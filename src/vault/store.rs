//! On-disk storage of sealed secret records.
//!
//! Layout under the vault root:
//!
//! ```text
//! <root>/.metadata.json          master key material (see `metadata`)
//! <root>/<name>                  uncategorized secret
//! <root>/<category>/<name>       categorized secret
//! ```
//!
//! Every mutation is all-or-nothing.  Records are written to a temp
//! file first and only then moved into place; `add` uses a hard link
//! for the final step, which fails if the target already exists, so
//! the existence check and the creation are one atomic operation.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::errors::{Result, ShroudError};

use super::name::{display_key, Category, SecretName, UNCATEGORIZED};
use super::record::SecretRecord;

/// Category name -> sorted secret names.
pub type Listing = BTreeMap<String, Vec<String>>;

/// Writes a record's bytes to a temp file in a directory.
type StageFn = fn(&Path, &str, &[u8]) -> Result<PathBuf>;

/// Longest part of a secret name copied into a temp file name, so the
/// temp name stays under the file name limit.
const TEMP_STEM_LEN: usize = 64;

/// Which part of the vault `VaultStore::list` looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Every category plus the `uncategorized` bucket.
    Everything,
    /// Only the top-level secrets.
    Uncategorized,
    /// A single category; it must exist.
    Category(Category),
}

/// Handle on a vault root directory.
#[derive(Debug, Clone)]
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// Returns the vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Returns `true` if a record exists for `name` in `category`.
    pub fn contains(&self, name: &SecretName, category: Option<&Category>) -> bool {
        self.record_path(name, category).is_file()
    }

    /// Read the record for `name` in `category`.
    pub fn get(&self, name: &SecretName, category: Option<&Category>) -> Result<SecretRecord> {
        let path = self.record_path(name, category);
        if !path.is_file() {
            return Err(ShroudError::SecretNotFound(display_key(name, category)));
        }

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ShroudError::SecretNotFound(display_key(name, category)))
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes).map_err(|e| {
            debug!(secret = %display_key(name, category), error = %e, "record does not parse");
            ShroudError::CorruptRecord(display_key(name, category))
        })
    }

    /// Store a new record.  Fails with `DuplicateSecret` if one exists.
    ///
    /// The category directory is created on demand.
    pub fn add(
        &self,
        name: &SecretName,
        record: &SecretRecord,
        category: Option<&Category>,
    ) -> Result<()> {
        self.add_staged(name, record, category, write_temp)
    }

    /// `add`, with the step that stages the record in a temp file
    /// passed in.
    fn add_staged(
        &self,
        name: &SecretName,
        record: &SecretRecord,
        category: Option<&Category>,
        stage: StageFn,
    ) -> Result<()> {
        let key = display_key(name, category);
        let dir = self.category_dir(category);

        if category.is_some() && dir.exists() && !dir.is_dir() {
            // An uncategorized secret already owns this path.
            return Err(ShroudError::InvalidName(
                category.map(Category::to_string).unwrap_or_default(),
            ));
        }
        fs::create_dir_all(&dir)?;

        let path = dir.join(name.as_str());
        if path.is_dir() {
            return Err(ShroudError::InvalidName(name.to_string()));
        }
        if path.exists() {
            return Err(ShroudError::DuplicateSecret(key));
        }

        // A failed add must not leave a category it created behind.
        let tmp = match encode(record).and_then(|bytes| stage(&dir, name.as_str(), &bytes)) {
            Ok(tmp) => tmp,
            Err(e) => {
                self.prune_category(category);
                return Err(e);
            }
        };

        // The link is the real existence check: it refuses to replace
        // a file, even one created since the check above.
        let linked = fs::hard_link(&tmp, &path);
        let _ = fs::remove_file(&tmp);

        match linked {
            Ok(()) => {
                debug!(secret = %key, "record added");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(ShroudError::DuplicateSecret(key))
            }
            Err(e) => {
                self.prune_category(category);
                Err(e.into())
            }
        }
    }

    /// Replace an existing record.  Never creates one.
    pub fn update(
        &self,
        name: &SecretName,
        record: &SecretRecord,
        category: Option<&Category>,
    ) -> Result<()> {
        let path = self.record_path(name, category);
        if !path.is_file() {
            return Err(ShroudError::SecretNotFound(display_key(name, category)));
        }

        write_atomic(&path, &encode(record)?)?;
        debug!(secret = %display_key(name, category), "record updated");
        Ok(())
    }

    /// Delete a record, and its category directory if it was the last
    /// one in it.
    pub fn remove(&self, name: &SecretName, category: Option<&Category>) -> Result<()> {
        let key = display_key(name, category);
        let path = self.record_path(name, category);
        if !path.is_file() {
            return Err(ShroudError::SecretNotFound(key));
        }

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ShroudError::SecretNotFound(key))
            }
            Err(e) => return Err(e.into()),
        }
        debug!(secret = %key, "record removed");

        self.prune_category(category);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Listing
    // ------------------------------------------------------------------

    /// List secret names per category.
    ///
    /// `pattern` is a case-insensitive regex matched against names.
    /// Buckets with no names in the result are left out entirely.
    pub fn list(&self, scope: &ListScope, pattern: Option<&str>) -> Result<Listing> {
        let filter = match pattern.filter(|p| !p.is_empty()) {
            Some(p) => Some(compile_pattern(p)?),
            None => None,
        };

        let mut listing = Listing::new();
        match scope {
            ListScope::Everything => {
                for (entry_name, path) in visible_entries(&self.root)? {
                    if path.is_dir() {
                        let names = file_names(&path)?;
                        listing.entry(entry_name).or_default().extend(names);
                    } else if path.is_file() {
                        listing
                            .entry(UNCATEGORIZED.to_string())
                            .or_default()
                            .push(entry_name);
                    }
                }
            }
            ListScope::Uncategorized => {
                listing.insert(UNCATEGORIZED.to_string(), file_names(&self.root)?);
            }
            ListScope::Category(category) => {
                let dir = self.category_dir(Some(category));
                if !dir.is_dir() {
                    return Err(ShroudError::CategoryNotFound(category.to_string()));
                }
                listing.insert(category.to_string(), file_names(&dir)?);
            }
        }

        for names in listing.values_mut() {
            if let Some(re) = &filter {
                names.retain(|n| re.is_match(n));
            }
            names.sort();
        }
        listing.retain(|_, names| !names.is_empty());

        Ok(listing)
    }

    // ------------------------------------------------------------------
    // Paths
    // ------------------------------------------------------------------

    fn category_dir(&self, category: Option<&Category>) -> PathBuf {
        match category {
            Some(c) => self.root.join(c.as_str()),
            None => self.root.clone(),
        }
    }

    fn record_path(&self, name: &SecretName, category: Option<&Category>) -> PathBuf {
        self.category_dir(category).join(name.as_str())
    }

    /// Remove a category directory if it is empty; no-op otherwise.
    fn prune_category(&self, category: Option<&Category>) {
        let Some(c) = category else { return };
        // `remove_dir` refuses non-empty directories, which is exactly
        // the condition we want.
        if fs::remove_dir(self.category_dir(Some(c))).is_ok() {
            debug!(category = %c, "removed empty category");
        }
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| ShroudError::InvalidPattern(e.to_string()))
}

fn encode(record: &SecretRecord) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| ShroudError::SerializationError(format!("record: {e}")))
}

/// Directory entries whose names are valid UTF-8 and not dotfiles.
///
/// Dotfiles are the metadata store and in-flight temp files; sanitized
/// names never start with a dot.  A missing directory has no entries.
fn visible_entries(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut out = Vec::new();
    for entry in entries {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            debug!(path = %entry.path().display(), "skipping non UTF-8 entry");
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        out.push((name, entry.path()));
    }
    Ok(out)
}

/// Names of the secret files directly inside `dir`.
fn file_names(dir: &Path) -> Result<Vec<String>> {
    Ok(visible_entries(dir)?
        .into_iter()
        .filter(|(_, path)| path.is_file())
        .map(|(name, _)| name)
        .collect())
}

// ---------------------------------------------------------------------------
// Atomic file helpers (shared with the metadata store)
// ---------------------------------------------------------------------------

/// Write `bytes` to a fresh, uniquely named dotfile in `dir`.
///
/// The file is created owner-only on Unix and synced before returning.
pub(crate) fn write_temp(dir: &Path, stem: &str, bytes: &[u8]) -> Result<PathBuf> {
    let mut cut = stem.len().min(TEMP_STEM_LEN);
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    let stem = &stem[..cut];

    let tmp = dir.join(format!(
        ".{stem}.{}.{:08x}.tmp",
        std::process::id(),
        rand::random::<u32>()
    ));

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let written = options.open(&tmp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    Ok(tmp)
}

/// Replace `path` with `bytes` via temp file + rename.
///
/// The rename keeps readers from ever seeing a half-written file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or(Path::new("."));
    let stem = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let tmp = write_temp(parent, stem.trim_start_matches('.'), bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
