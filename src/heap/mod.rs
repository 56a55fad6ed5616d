//! The fixed-size word heap and its free-list allocator.
//!
//! Every heap reference in this crate is a `u32` *word index* into a single
//! `Vec<u32>`, never a raw pointer — the representation §9's Design Notes
//! recommend ("Pointer graphs vs. arena+indices") and the reason
//! `unsafe_code` can be denied crate-wide.

pub mod gc;

use crate::class::NO_MANAGED_POINTERS;
use crate::consts::HEAP_SIZE;
use alloc::vec;
use alloc::vec::Vec;

bitflags::bitflags! {
    /// The two GC status bits packed into the low end of every header
    /// word, below the class handle.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct HeaderStatus: u32 {
        /// Bit 0: the mark bit (polarity flips every GC cycle).
        const MARK = 0b01;
        /// Bit 1: the gray bit (set while the object sits on a mark stack).
        const GRAY = 0b10;
    }
}

/// Mask covering both status bits, leaving the class handle.
const STATUS_MASK: u32 = 0b11;
/// Bit 0 of a header word, also `HeaderStatus::MARK`'s bit pattern.
const MARK_BIT: u32 = HeaderStatus::MARK.bits();

/// Word index of the first free block after `gc_initialize`-equivalent
/// construction; word 0 holds the free-list head, word 1 the size of the
/// reserved prefix.
const FIRST_FREE_BLOCK: u32 = 2;
/// Size, in words, of the reserved prefix (words 0 and 1).
const RESERVED_PREFIX: u32 = 2;

/// The header word of a heap object: class handle in bits 2..=31, gray bit
/// in bit 1, mark bit in bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header(pub u32);

impl Header {
    fn status(self) -> HeaderStatus {
        HeaderStatus::from_bits_truncate(self.0 & STATUS_MASK)
    }

    /// Build a fresh header for a newly allocated object: gray bit clear,
    /// mark bit set to `current_no_mark` (so the object starts out "white"
    /// under the about-to-run cycle's polarity, exactly as `gc_allocate_object`
    /// leaves it before the next GC flips `current_no_mark`).
    pub fn new(class_handle: u32, current_no_mark: u32) -> Self {
        let mark = if current_no_mark & MARK_BIT != 0 {
            HeaderStatus::MARK
        } else {
            HeaderStatus::empty()
        };
        Header((class_handle << 2) | mark.bits())
    }

    /// The embedded class handle (see `crate::intern`).
    pub fn class_handle(self) -> u32 {
        self.0 >> 2
    }

    pub fn mark_bit(self) -> u32 {
        self.status().intersection(HeaderStatus::MARK).bits()
    }

    pub fn gray_bit(self) -> bool {
        self.status().contains(HeaderStatus::GRAY)
    }

    pub fn set_mark(self, mark: u32) -> Self {
        let mut status = self.status();
        status.set(HeaderStatus::MARK, mark & MARK_BIT != 0);
        Header((self.0 & !STATUS_MASK) | status.bits())
    }

    pub fn set_gray(self, gray: bool) -> Self {
        let mut status = self.status();
        status.set(HeaderStatus::GRAY, gray);
        Header((self.0 & !STATUS_MASK) | status.bits())
    }

    pub fn is_white(self, current_mark: u32) -> bool {
        self.mark_bit() != (current_mark & MARK_BIT)
    }

    pub fn is_black(self, current_mark: u32) -> bool {
        !self.is_white(current_mark) && !self.gray_bit()
    }
}

/// Rounding rule shared by the allocator and the sweeper: always even,
/// always includes the header word.
pub const fn real_size(body_len: u32) -> u32 {
    let size = body_len + 1;
    (size + 1) & !1
}

/// The fixed word array plus free-list bookkeeping.
pub struct Heap {
    words: Vec<u32>,
}

impl Heap {
    /// A freshly initialised heap: one free block spanning the whole body,
    /// matching `gc_initialize`.
    pub fn new() -> Self {
        let mut words = vec![0u32; HEAP_SIZE as usize];
        words[0] = FIRST_FREE_BLOCK;
        words[1] = RESERVED_PREFIX;
        words[FIRST_FREE_BLOCK as usize] = HEAP_SIZE;
        words[FIRST_FREE_BLOCK as usize + 1] = HEAP_SIZE - RESERVED_PREFIX;
        Heap { words }
    }

    pub fn len(&self) -> u32 {
        self.words.len() as u32
    }

    pub fn get(&self, index: u32) -> u32 {
        self.words[index as usize]
    }

    pub fn set(&mut self, index: u32, value: u32) {
        self.words[index as usize] = value;
    }

    pub fn header(&self, index: u32) -> Header {
        Header(self.get(index))
    }

    pub fn set_header(&mut self, index: u32, header: Header) {
        self.set(index, header.0);
    }

    /// Word index of the first free block, per word 0.
    pub fn free_list_head(&self) -> u32 {
        self.get(0)
    }

    /// Whether a class (by `start_index`, the sentinel
    /// [`NO_MANAGED_POINTERS`] meaning none) has managed pointer slots.
    pub fn class_has_pointers(start_index: u32) -> bool {
        start_index != NO_MANAGED_POINTERS
    }

    /// First-fit allocation from the free-list, no GC retry. `body_len` is
    /// the number of body words the caller needs (excluding the header);
    /// the actual chunk size rounds up via [`real_size`]. Returns the
    /// header-word index of the new chunk, or `None` if no free block is
    /// large enough.
    pub fn allocate_base(&mut self, body_len: u32) -> Option<u32> {
        let word_size = real_size(body_len);
        let mut prev = 0u32;
        let mut current = self.free_list_head();
        while current < self.len() {
            let next = self.get(current);
            let size = self.get(current + 1);
            if size > word_size {
                let split = current + word_size;
                self.set(prev, split);
                self.set(split, next);
                self.set(split + 1, size - word_size);
                return Some(current);
            } else if size == word_size {
                self.set(prev, next);
                return Some(current);
            }
            prev = current;
            current = next;
        }
        None
    }

    /// Zero-fill `len` body words starting just after `header_index`.
    pub fn zero_body(&mut self, header_index: u32, len: u32) {
        for i in 0..len {
            self.set(header_index + 1 + i, 0);
        }
    }

    /// Total heap size in words (`HEAP_SIZE`).
    pub const fn capacity() -> u32 {
        HEAP_SIZE
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}
