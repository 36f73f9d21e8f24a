//! Mode transition engine.
//!
//! Moves one descriptor into a target [`SourceMode`] by rewriting its managed
//! block. A descriptor already in the target mode is left alone, so repeated
//! calls are no-ops. A descriptor without a managed block is also left alone;
//! the caller compares [`Transition::after`] with the target to spot that.

use crate::descriptor::{BlockGrammar, SourceMode, read_descriptor};
use crate::{Error, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Outcome of one transition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub path: PathBuf,
    pub before: SourceMode,
    pub after: SourceMode,
    /// Whether the descriptor was rewritten
    pub changed: bool,
    /// Number of managed blocks found
    pub blocks: usize,
}

impl Transition {
    /// True when the descriptor ended up in `target`.
    pub fn reached(&self, target: SourceMode) -> bool {
        self.after == target
    }
}

/// Move the descriptor at `path` into `target` (Local or Published).
///
/// Fails with [`Error::NotFound`] if the descriptor does not exist.
pub fn transition(path: &Path, target: SourceMode, grammar: &BlockGrammar) -> Result<Transition> {
    if target == SourceMode::Unrecognized {
        return Err(Error::Other(format!(
            "cannot transition {} to an unrecognized mode",
            path.display()
        )));
    }

    let original = read_descriptor(path)?;
    let before = grammar.detect(&original);

    if before == target {
        tracing::debug!(path = %path.display(), mode = %before, "already in target mode");
        return Ok(Transition {
            path: path.to_path_buf(),
            before,
            after: before,
            changed: false,
            blocks: grammar.find_all(&original).len(),
        });
    }

    let (updated, blocks) = grammar.rewrite(&original, target);
    let changed = updated != original;
    if changed {
        write_atomic(path, &updated)?;
        tracing::info!(path = %path.display(), from = %before, to = %target, "rewrote descriptor");
    } else {
        tracing::debug!(path = %path.display(), blocks, "no managed block to rewrite");
    }

    Ok(Transition {
        path: path.to_path_buf(),
        before,
        after: grammar.detect(&updated),
        changed,
        blocks,
    })
}

/// Replace the file at `path` with `content` via a temp file in the same directory.
///
/// Keeps the original file's permissions. A symlinked descriptor is written
/// through: the link target is replaced and the link itself stays.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let target = fs::canonicalize(path)?;
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(&target)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.as_file().set_permissions(permissions)?;
    tmp.persist(&target).map_err(|e| Error::Io(e.error))?;

    Ok(())
}
