//! BlueScript runtime: tagged values, a mark-and-sweep garbage collector,
//! and the boxed-object model that AOT-compiled BlueScript programs run
//! against.
//!
//! This crate is the runtime library linked into a compiled program, not
//! the transpiler that emits the C glue calling into it. [`Runtime`] is the
//! single value a host constructs once (`Runtime::new`, the equivalent of
//! `gc_initialize()`) and threads through every compiled function.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![deny(unused_must_use)]

#[doc(hidden)]
pub extern crate alloc;

#[cfg(feature = "std")]
extern crate libm as _; // not needed with stdlib

pub mod class;
pub mod coerce;
pub mod consts;
pub mod error;
pub mod heap;
pub mod intern;
pub mod interrupt;
pub mod objects;
pub mod ops;
pub mod roots;
pub mod runtime;
pub mod value;

pub use error::{RtResult, RuntimeError};
pub use runtime::Runtime;
pub use value::Value;
