//! `EgcPool`: append-only arena for grapheme clusters too long to inline.
//!
//! Cells hold a 4-byte reference. Clusters of up to 4 UTF-8 bytes live in
//! the cell itself; anything longer is appended here and the cell stores the
//! byte offset. Entries are never freed individually; the whole pool is
//! dropped or cleared with its owner.
//!
//! ```text
//! ┌─────────────────┬────┬──────────────────────┬────┬─────
//! │ "👨‍👩‍👧"          │ \0 │ "e\u{301}\u{302}"    │ \0 │ ...
//! └─────────────────┴────┴──────────────────────┴────┴─────
//!   ^ offset 0             ^ offset 19
//! ```

use std::collections::TryReserveError;

/// Offset-addressed byte arena of nul-terminated UTF-8 clusters.
#[derive(Clone, Default)]
pub struct EgcPool {
    bytes: String,
}

impl EgcPool {
    /// Create an empty pool.
    pub const fn new() -> Self {
        Self {
            bytes: String::new(),
        }
    }

    /// Append a cluster, returning its offset.
    pub fn stash(&mut self, egc: &str) -> Result<u32, TryReserveError> {
        self.bytes.try_reserve(egc.len() + 1)?;
        let offset = self.bytes.len() as u32;
        self.bytes.push_str(egc);
        self.bytes.push('\0');
        Ok(offset)
    }

    /// Look up the cluster stored at `offset`.
    ///
    /// Unknown offsets resolve to the empty string.
    pub fn get(&self, offset: u32) -> &str {
        let tail = self.bytes.get(offset as usize..).unwrap_or("");
        tail.split('\0').next().unwrap_or("")
    }

    /// Bytes currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been stashed.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Drop every entry. Offsets handed out earlier become invalid.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

impl std::fmt::Debug for EgcPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EgcPool")
            .field("bytes", &self.bytes.len())
            .finish()
    }
}
