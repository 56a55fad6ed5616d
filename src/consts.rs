//! Runtime-wide size constants.

/// Size of the word heap, in 32-bit words. Must be even; the first two words
/// are the reserved header cells described in the data model.
pub const HEAP_SIZE: u32 = 1024 * 8 + 2;

/// Length of a word, in bytes.
pub const WORD_SIZE: usize = core::mem::size_of::<u32>();

/// Capacity of the depth-first mark stack.
pub const STACK_SIZE: usize = (HEAP_SIZE / 65) as usize;

/// Capacity of the interrupt-safe mark stack fed by the write barrier.
pub const ISTACK_SIZE: usize = STACK_SIZE / 2;

/// Number of slots in each host pointer-interning table.
pub const PTR_TABLE_SIZE: usize = 1000;

/// Linear-probe step used by the pointer-interning tables. Coprime with
/// `PTR_TABLE_SIZE` so every probe sequence visits all slots.
pub const PTR_TABLE_STEP: usize = 23;

/// Capacity, in bytes, of the fixed runtime error message buffer.
pub const ERROR_MESSAGE_CAPACITY: usize = 256;

static_assertions::const_assert!(HEAP_SIZE % 2 == 0);
static_assertions::const_assert!(HEAP_SIZE > 4);
static_assertions::const_assert!(STACK_SIZE > 0);
static_assertions::const_assert!(PTR_TABLE_STEP < PTR_TABLE_SIZE);
