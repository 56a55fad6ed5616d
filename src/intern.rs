//! Host pointer-interning tables.
//!
//! A 32-bit `value_t` cannot carry a native pointer on a 64-bit development
//! host, so a fixed 1000-slot open-addressed table keyed by pointer identity
//! assigns every literal/class pointer a stable 32-bit handle instead. This
//! module covers the three kinds of host-owned references an object header
//! or body word needs to carry: class metadata, native function pointers,
//! and string-literal storage.
//!
//! Slots here hold the referenced value directly (not a reconstructed raw
//! pointer), so no `unsafe` is needed to read a handle back.

use crate::consts::{PTR_TABLE_SIZE, PTR_TABLE_STEP};

/// A fixed-capacity, open-addressed table assigning stable `u32` handles to
/// distinct keys, probing with a fixed step on collision.
pub struct Table<T> {
    slots: [Option<(usize, T)>; PTR_TABLE_SIZE],
}

impl<T: Copy> Table<T> {
    /// An empty table.
    pub const fn new() -> Self
    where
        T: Copy,
    {
        // `Option<(usize, T)>` is not `Copy`-array-initialisable via a const
        // generic default for arbitrary `T`, so build it element-by-element.
        Self {
            slots: [None; PTR_TABLE_SIZE],
        }
    }

    /// Intern `value` under `key` (typically the address of a `&'static`
    /// item, or a function pointer cast to `usize`), returning a stable
    /// handle. Interning the same key twice returns the same handle.
    pub fn intern(&mut self, key: usize, value: T) -> u32 {
        let start = key % PTR_TABLE_SIZE;
        let mut index = start;
        loop {
            match &self.slots[index] {
                None => {
                    self.slots[index] = Some((key, value));
                    return index as u32;
                }
                Some((k, _)) if *k == key => return index as u32,
                Some(_) => {
                    index = (index + PTR_TABLE_STEP) % PTR_TABLE_SIZE;
                    if index == start {
                        panic!("pointer-interning table exhausted");
                    }
                }
            }
        }
    }

    /// Recover the value behind a handle produced by [`Table::intern`].
    ///
    /// # Panics
    /// Panics if `handle` was never returned by `intern` on this table; a
    /// compiled program never fabricates handles, it only threads ones
    /// returned from a constructor, so this indicates a runtime bug.
    pub fn get(&self, handle: u32) -> T {
        self.slots[handle as usize]
            .as_ref()
            .expect("dangling interned pointer handle")
            .1
    }
}

impl<T: Copy> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_key_returns_same_handle() {
        let mut table: Table<u32> = Table::new();
        let h1 = table.intern(42, 100);
        let h2 = table.intern(42, 100);
        assert_eq!(h1, h2);
        assert_eq!(table.get(h1), 100);
    }

    #[test]
    fn distinct_keys_get_distinct_handles() {
        let mut table: Table<u32> = Table::new();
        let h1 = table.intern(1, 10);
        let h2 = table.intern(2, 20);
        assert_ne!(h1, h2);
        assert_eq!(table.get(h1), 10);
        assert_eq!(table.get(h2), 20);
    }

    #[test]
    fn collisions_probe_with_fixed_step() {
        let mut table: Table<u32> = Table::new();
        // These two keys collide modulo PTR_TABLE_SIZE.
        let a = table.intern(5, 1);
        let b = table.intern(5 + PTR_TABLE_SIZE, 2);
        assert_ne!(a, b);
        assert_eq!(table.get(a), 1);
        assert_eq!(table.get(b), 2);
    }
}
