use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::wire::{ReadCursor, VOFFSET_SIZE};

/// Entries of one vtable, excluding its leading byte size.
///
/// Entry 0 is the inline size of the table instance, entry `n + 1` the offset of
/// field slot `n` relative to the instance start, zero when the field is absent.
#[derive(Clone, PartialEq, Eq)]
pub struct Vtable(Arc<[u16]>);

impl Vtable {
    pub fn entries(&self) -> &[u16] {
        &self.0
    }

    pub fn object_size(&self) -> Option<u16> {
        self.0.first().copied()
    }

    /// Number of field slots the writer knew about.
    pub fn field_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Offset of field `slot`, `None` when absent or beyond the writer's schema.
    pub fn field_offset(&self, slot: usize) -> Option<u16> {
        match self.0.get(slot + 1) {
            Some(&offset) if offset != 0 => Some(offset),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (usize, Option<u16>)> + '_ {
        (0..self.field_count()).map(|slot| (slot, self.field_offset(slot)))
    }

    pub fn ptr_eq(&self, other: &Vtable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl core::fmt::Debug for Vtable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Parses the vtable at `offset`. `cursor` is read from a copy, never moved.
///
/// An odd byte size reads `(size - 2) / 2` entries and ignores the last byte.
pub fn parse_vtable(cursor: &ReadCursor<'_>, offset: usize) -> Result<Vtable> {
    let mut cursor = *cursor;
    cursor.seek(offset);
    let size = cursor.u16()?;
    if (size as usize) < VOFFSET_SIZE {
        return Err(Error::MalformedVtable { offset, size });
    }
    let count = (size as usize - VOFFSET_SIZE) / VOFFSET_SIZE;
    let entries = (0..count)
        .map(|_| cursor.u16())
        .collect::<Result<Vec<u16>>>()?;
    Ok(Vtable(entries.into()))
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Parsed vtables memoized by absolute buffer offset.
#[derive(Debug, Default)]
pub struct VtableCache {
    entries: HashMap<usize, Vtable>,
    limit: Option<usize>,
    hits: u64,
    misses: u64,
}

impl VtableCache {
    pub fn new(limit: Option<usize>) -> Self {
        VtableCache {
            limit,
            ..Default::default()
        }
    }

    pub fn resolve(&mut self, cursor: &ReadCursor<'_>, offset: usize) -> Result<Vtable> {
        if let Some(vtable) = self.entries.get(&offset) {
            self.hits += 1;
            return Ok(vtable.clone());
        }
        self.misses += 1;
        let vtable = parse_vtable(cursor, offset)?;
        log::trace!("vtable at {}: {:?}", offset, vtable);
        match self.limit {
            Some(0) => return Ok(vtable),
            Some(limit) if self.entries.len() >= limit => {
                log::debug!("vtable cache reached {} entries, flushing", limit);
                self.entries.clear();
            }
            _ => {}
        }
        self.entries.insert(offset, vtable.clone());
        Ok(vtable)
    }

    pub fn get(&self, offset: usize) -> Option<&Vtable> {
        self.entries.get(&offset)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}
