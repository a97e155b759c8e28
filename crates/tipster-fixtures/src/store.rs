use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

use tipster_types::models::Match;

/// The on-disk fixture document.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDocument {
    #[serde(default)]
    pub matches: Vec<Match>,
}

impl FixtureDocument {
    pub fn find(&self, id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    /// Matches ordered by kickoff, ties broken by id.
    pub fn sorted(mut self) -> Vec<Match> {
        self.matches.sort_by(|a, b| a.kickoff.cmp(&b.kickoff).then_with(|| a.id.cmp(&b.id)));
        self.matches
    }
}

/// Older files hold a bare array; they are read as-is and rewritten wrapped.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredShape {
    Wrapped(FixtureDocument),
    Flat(Vec<Match>),
}

/// File-backed store for the current period's fixtures.
///
/// Writers are serialised by an async mutex held across the whole
/// read-modify-write, and every write goes to a temp file that is renamed
/// over the document, so readers always see a complete file.
pub struct FixtureStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FixtureStore {
    pub async fn new(path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        info!("Fixture store: {}", path.display());
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Read the current document. A missing file is an empty period.
    pub async fn load(&self) -> Result<FixtureDocument> {
        read_document(&self.path).await
    }

    /// Replace the whole document.
    pub async fn replace(&self, document: &FixtureDocument) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        write_document(&self.path, document).await
    }

    /// Apply `f` to the current document and persist the result.
    ///
    /// Nothing is written when `f` fails.
    pub async fn update<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut FixtureDocument) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = read_document(&self.path).await?;
        let value = f(&mut document)?;
        write_document(&self.path, &document).await?;
        Ok(value)
    }
}

async fn read_document(path: &Path) -> Result<FixtureDocument> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Fixture file {} not found, treating as empty", path.display());
            return Ok(FixtureDocument::default());
        }
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(FixtureDocument::default());
    }

    let shape: StoredShape = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing fixture document {}", path.display()))?;
    Ok(match shape {
        StoredShape::Wrapped(document) => document,
        StoredShape::Flat(matches) => FixtureDocument { matches },
    })
}

async fn write_document(path: &Path, document: &FixtureDocument) -> Result<()> {
    let json = serde_json::to_vec_pretty(document)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut file = fs::File::create(&tmp_path)
        .await
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    file.write_all(&json).await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("replacing {}", path.display()))?;

    debug!("Wrote {} matches to {}", document.matches.len(), path.display());
    Ok(())
}
