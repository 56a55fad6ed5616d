//! Runtime error surface: error categories, the fixed message buffer, and
//! `try_and_catch`.
//!
//! A `setjmp`/`longjmp`-style unwind has no Rust equivalent, and none is
//! needed: an ordinary `Result` propagated with `?` (the `RuntimeError`/
//! `InterpreterError` pair pattern) covers the same ground. `try_and_catch`
//! keeps the documented ABI contract (format into a fixed buffer, return `1`
//! on error and `0` on success) on top of that `Result`.

use crate::consts::ERROR_MESSAGE_CAPACITY;
use alloc::string::String;

/// Runtime error categories.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RuntimeError {
    /// A safe coercion failed, or an any-op saw a non-numeric operand.
    #[display(fmt = "** runtime type error: {site}")]
    Type {
        /// Name of the coercion or operator that failed.
        site: String,
    },
    /// An array get/set was out of bounds.
    #[display(
        fmt = "** error: array index out of range: {index} (len: {len}) in {site}"
    )]
    Index {
        /// The out-of-range index.
        index: i32,
        /// The length of the indexed object.
        len: i32,
        /// Component-named call site, e.g. `"Array.get/set"`.
        site: String,
    },
    /// The GC could not free enough memory, or allocation was attempted
    /// inside an interrupt handler.
    #[display(fmt = "** runtime memory allocation error: {reason}")]
    Allocation {
        /// Human-readable reason.
        reason: String,
    },
    /// User code raised an error explicitly via a runtime helper.
    #[display(fmt = "** runtime error: {message}")]
    Generic {
        /// The raised message.
        message: String,
    },
}

impl RuntimeError {
    /// Shorthand for a type error at `site`.
    pub fn type_error(site: impl Into<String>) -> Self {
        RuntimeError::Type { site: site.into() }
    }

    /// Shorthand for an index error.
    pub fn index_error(index: i32, len: i32, site: impl Into<String>) -> Self {
        RuntimeError::Index {
            index,
            len,
            site: site.into(),
        }
    }

    /// Shorthand for an allocation error.
    pub fn allocation_error(reason: impl Into<String>) -> Self {
        RuntimeError::Allocation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a user-raised generic error.
    pub fn generic_error(message: impl Into<String>) -> Self {
        RuntimeError::Generic {
            message: message.into(),
        }
    }
}

/// Result alias used throughout the runtime.
pub type RtResult<T> = Result<T, RuntimeError>;

/// The fixed-capacity buffer a caught error's message is rendered into.
/// Messages longer than capacity are truncated to `"??"` to guarantee the
/// buffer never overflows.
#[derive(Debug, Default, Clone)]
pub struct ErrorBuffer {
    message: String,
}

impl ErrorBuffer {
    /// An empty buffer.
    pub const fn new() -> Self {
        Self {
            message: String::new(),
        }
    }

    /// Render `err` into the buffer, truncating to `"??"` if it would not
    /// fit in [`ERROR_MESSAGE_CAPACITY`] bytes.
    pub fn set(&mut self, err: &RuntimeError) {
        let rendered = alloc::format!("{err}\n");
        self.message = if rendered.len() >= ERROR_MESSAGE_CAPACITY {
            alloc::string::ToString::to_string("??")
        } else {
            rendered
        };
    }

    /// The last message written by [`ErrorBuffer::set`], or empty if none.
    pub fn message(&self) -> &str {
        &self.message
    }

    fn clear(&mut self) {
        self.message.clear();
    }
}

/// Run `body`, catching any [`RuntimeError`] it (or anything it calls)
/// returns. On error, the message is formatted into `buffer` and printed
/// (via `tracing::error!`, the host's logger) and `1` is returned; on clean
/// completion `0` is returned, matching the documented ABI contract
/// (format into a fixed buffer, `1` on error, `0` on success) without
/// requiring `setjmp`/`longjmp`.
pub fn try_and_catch(
    buffer: &mut ErrorBuffer,
    body: impl FnOnce() -> RtResult<()>,
) -> i32 {
    buffer.clear();
    match body() {
        Ok(()) => 0,
        Err(err) => {
            buffer.set(&err);
            tracing::error!(message = buffer.message(), "runtime error");
            1
        }
    }
}
