//! Mapped-file substrate: an offset-based arena over a growable byte buffer.
//!
//! The teacher has no mmap layer of its own — it leans on `bincode` to
//! serialize whole structures at once (see `lexicon::Lexicon::save_bincode`,
//! `word_bigram`, `interpolation::Lambdas`). The Prism and Table formats in
//! this crate need something closer to the spec's position-independent,
//! self-relative-offset files, so this module is new, built the way the
//! teacher builds its own file-backed types: a thin struct wrapping a
//! `Vec<u8>`/`File`, fallible `Result`-returning constructors, and explicit
//! `save`/`load` pairs rather than an OS-level `mmap` crate dependency (kept
//! dependency-light, matching the teacher's preference for `bincode` +
//! `std::fs` over exotic I/O crates).
//!
//! `Offset<T>` never stores an absolute address; `get`/`get_mut` always take
//! the owning region's base pointer, so the bytes stay position-independent
//! on disk exactly as spec.md requires.

use crate::error::{CoreError, CoreResult};
use std::fs::File;
use std::io::{Read, Write};
use std::marker::PhantomData;
use std::path::Path;

/// A signed, self-relative byte offset into a [`MappedRegion`]'s buffer.
///
/// Self-relative in spirit: it is always resolved against the *current*
/// buffer base, never cached as an absolute address, so regions remain
/// position-independent after a grow/reopen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset<T> {
    byte_offset: i64,
    _marker: PhantomData<T>,
}

impl<T> Offset<T> {
    pub const NIL: Offset<T> = Offset {
        byte_offset: -1,
        _marker: PhantomData,
    };

    pub fn is_nil(&self) -> bool {
        self.byte_offset < 0
    }

    pub fn raw(&self) -> i64 {
        self.byte_offset
    }
}

/// A growable, file-backed byte arena. Values are stored as raw bincode
/// blobs addressed by [`Offset`]; callers must not retain borrows across a
/// [`MappedRegion::grow`] call (the buffer may move).
pub struct MappedRegion {
    buf: Vec<u8>,
    capacity_hint: usize,
    read_only: bool,
}

impl MappedRegion {
    /// Create a new in-memory region with the given initial capacity.
    pub fn create(initial_capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(initial_capacity),
            capacity_hint: initial_capacity.max(64),
            read_only: false,
        }
    }

    /// Open an existing file read-write, loading its full contents.
    pub fn open_rw<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let buf = std::fs::read(path.as_ref())?;
        let capacity_hint = buf.capacity().max(64);
        Ok(Self {
            buf,
            capacity_hint,
            read_only: false,
        })
    }

    /// Open an existing file read-only.
    pub fn open_ro<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let mut region = Self::open_rw(path)?;
        region.read_only = true;
        Ok(region)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append a bincode-serialized value, doubling the backing capacity as
    /// needed (geometric growth, as spec.md's `allocate<T>` requires).
    /// Returns the offset the value was written at.
    pub fn allocate<T: serde::Serialize>(&mut self, value: &T) -> CoreResult<Offset<T>> {
        if self.read_only {
            return Err(CoreError::Capacity(
                "cannot allocate in a read-only mapped region".into(),
            ));
        }
        let encoded = bincode::serialize(value)
            .map_err(|e| CoreError::Encoding(format!("bincode encode: {e}")))?;
        let needed = self.buf.len() + 8 + encoded.len();
        if needed > self.capacity_hint {
            self.grow(needed);
        }
        let offset = self.buf.len() as i64;
        self.buf
            .extend_from_slice(&(encoded.len() as u64).to_le_bytes());
        self.buf.extend_from_slice(&encoded);
        Ok(Offset {
            byte_offset: offset,
            _marker: PhantomData,
        })
    }

    /// Resolve an offset back into a value. The grow/shrink contract means
    /// this always re-reads from the current buffer rather than caching.
    pub fn find<T: serde::de::DeserializeOwned>(&self, offset: Offset<T>) -> CoreResult<T> {
        if offset.is_nil() {
            return Err(CoreError::Input("dereferenced a nil offset".into()));
        }
        let start = offset.byte_offset as usize;
        if start + 8 > self.buf.len() {
            return Err(CoreError::Format("offset out of range".into()));
        }
        let len = u64::from_le_bytes(self.buf[start..start + 8].try_into().unwrap()) as usize;
        let data_start = start + 8;
        let data_end = data_start
            .checked_add(len)
            .ok_or_else(|| CoreError::Format("offset length overflow".into()))?;
        if data_end > self.buf.len() {
            return Err(CoreError::Format("offset length out of range".into()));
        }
        bincode::deserialize(&self.buf[data_start..data_end])
            .map_err(|e| CoreError::Format(format!("bincode decode: {e}")))
    }

    /// Copy a string into the region, returning an offset to its raw bytes.
    pub fn copy_string(&mut self, s: &str) -> CoreResult<Offset<String>> {
        self.allocate(&s.to_string())
    }

    /// Grow the backing capacity (closes and conceptually "reopens" the
    /// mapping — any raw pointers into the old buffer are invalid after
    /// this call, hence `Offset<T>` never exposes one).
    fn grow(&mut self, min_capacity: usize) {
        let mut new_cap = self.capacity_hint.max(64);
        while new_cap < min_capacity {
            new_cap *= 2;
        }
        self.buf.reserve(new_cap - self.buf.capacity().min(new_cap));
        self.capacity_hint = new_cap;
    }

    /// Shrink the backing allocation to fit exactly the bytes in use.
    pub fn shrink_to_fit(&mut self) {
        self.buf.shrink_to_fit();
        self.capacity_hint = self.buf.len().max(64);
    }

    /// Flush (no-op for the in-memory buffer; real persistence happens via
    /// [`MappedRegion::save`]). Kept as a named operation because the spec's
    /// contract calls for an explicit flush point.
    pub fn flush(&self) {}

    /// Persist the region to disk.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> CoreResult<()> {
        let mut f = File::create(path)?;
        f.write_all(&self.buf)?;
        Ok(())
    }

    /// Remove a backing file.
    pub fn remove<P: AsRef<Path>>(path: P) -> CoreResult<()> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Read an exact number of bytes from a reader into a fresh `Vec<u8>`;
/// small helper used by the mapped-file header readers in `prism`/`table`.
pub fn read_exact_vec<R: Read>(r: &mut R, len: usize) -> CoreResult<Vec<u8>> {
    let mut v = vec![0u8; len];
    r.read_exact(&mut v)?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_and_find_roundtrip() {
        let mut region = MappedRegion::create(16);
        let a = region.allocate(&42u32).unwrap();
        let b = region.allocate(&"hello".to_string()).unwrap();
        assert_eq!(region.find::<u32>(a).unwrap(), 42);
        assert_eq!(region.find::<String>(b).unwrap(), "hello");
    }

    #[test]
    fn grow_preserves_previously_written_values() {
        let mut region = MappedRegion::create(8);
        let mut offsets = Vec::new();
        for i in 0..200u32 {
            offsets.push(region.allocate(&i).unwrap());
        }
        for (i, off) in offsets.into_iter().enumerate() {
            assert_eq!(region.find::<u32>(off).unwrap(), i as u32);
        }
    }

    #[test]
    fn nil_offset_is_an_input_error() {
        let region = MappedRegion::create(8);
        let err = region.find::<u32>(Offset::<u32>::NIL).unwrap_err();
        assert!(matches!(err, CoreError::Input(_)));
    }

    #[test]
    fn save_and_open_ro_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("region.bin");
        let mut region = MappedRegion::create(8);
        let off = region.allocate(&7u32).unwrap();
        region.save(&path).unwrap();

        let mut loaded = MappedRegion::open_ro(&path).unwrap();
        assert_eq!(loaded.find::<u32>(off).unwrap(), 7);
        assert!(loaded.allocate(&1u32).is_err());
    }
}
