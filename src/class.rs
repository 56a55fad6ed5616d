//! Class metadata: instance shape, inheritance, property tables and vtables.
//!
//! A [`ClassDef`] is an immutable, `&'static` record — a `const` struct
//! placed in `.rodata`. No registry owns these values; they are ordinary
//! Rust statics. What *is* dynamic is the handle an object
//! header stores in place of a class pointer, assigned by
//! [`crate::intern::Table`] the first time a given `&'static ClassDef` is
//! embedded into a header (see `runtime.rs`).

use crate::error::{RtResult, RuntimeError};
use crate::value::Value;
#[cfg(any(test, feature = "test-helpers"))]
use alloc::vec::Vec;

/// A class method, reached through the vtable. All methods share one
/// calling convention: the interpreter-side glue receives the callee and an
/// argument vector and returns a value or an error. Every vtable slot is
/// monomorphized to this one signature — the safe-Rust generalisation of
/// "an opaque native function pointer with a known arity" that avoids
/// casting an untyped function pointer at each call site.
pub type Method = fn(args: &[Value]) -> RtResult<Value>;

/// The unboxed representation of a property slot, or [`PropertyType::Any`]
/// for a managed `value_t` slot (the space letter in a property table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    /// `'i'`: a raw `i32` slot.
    Int,
    /// `'f'`: a raw `f32` slot.
    Float,
    /// `'b'`: a raw `bool` slot, stored as a single word.
    Bool,
    /// space: a managed `value_t` slot, scanned by the collector.
    Any,
}

impl PropertyType {
    const fn from_letter(letter: u8) -> Self {
        match letter {
            b'i' => PropertyType::Int,
            b'f' => PropertyType::Float,
            b'b' => PropertyType::Bool,
            _ => PropertyType::Any,
        }
    }
}

/// Per-class map from compile-time name ids to body-slot indices and types.
///
/// `names[k]` is the name id declared at the class's own `offset + k`;
/// `unboxed_types[k]` gives that slot's unboxed letter when `k < unboxed_types.len()`,
/// otherwise the slot is a managed any-typed value (the "space" letter).
#[derive(Debug)]
pub struct PropertyTable {
    /// Absolute body-slot index of this class's first declared property.
    pub offset: u16,
    /// Name ids for every property this class declares, in slot order.
    pub names: &'static [u16],
    /// Unboxed type letters (`i`/`f`/`b`) for the unboxed prefix of `names`;
    /// remaining entries in `names` are managed any-typed slots.
    pub unboxed_types: &'static [u8],
}

impl PropertyTable {
    fn type_of(&self, slot_in_class: usize) -> PropertyType {
        match self.unboxed_types.get(slot_in_class) {
            Some(&letter) => PropertyType::from_letter(letter),
            None => PropertyType::Any,
        }
    }
}

/// Sentinel for [`ClassDef::start_index`] meaning "no managed pointer slots".
pub const NO_MANAGED_POINTERS: u32 = u32::MAX;

/// Sentinel for [`ClassDef::size`] meaning "variable-length instance; its
/// element count is stored in body word 0".
pub const VARIABLE_LENGTH: i32 = -1;

/// Immutable class metadata, declared as a `&'static` item.
///
/// Equality is by identity: two distinct `static`s with the same field
/// values are still different classes.
#[derive(Debug)]
pub struct ClassDef {
    /// Instance size in words excluding the header, or [`VARIABLE_LENGTH`].
    pub size: i32,
    /// First body-word index holding a managed pointer, or
    /// [`NO_MANAGED_POINTERS`].
    pub start_index: u32,
    /// Printable class name.
    pub name: &'static str,
    /// Superclass, or `None` at the root of a hierarchy.
    pub superclass: Option<&'static ClassDef>,
    /// Name-id to slot/type map.
    pub table: PropertyTable,
    /// Method vtable, indexed positionally (compile-time, never searched).
    pub vtable: &'static [Method],
}

impl PartialEq for ClassDef {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl Eq for ClassDef {}

impl ClassDef {
    /// The `index`-th vtable entry, with no inheritance search: method
    /// dispatch at call sites is always compile-time indexed.
    pub fn method(&self, index: usize) -> Method {
        self.vtable[index]
    }

    /// Walk the inheritance chain looking for `name_id`, most-derived class
    /// first, so a subclass's own property shadows a superclass's.
    pub fn property_lookup(&self, name_id: u16) -> RtResult<(u16, PropertyType)> {
        let mut class = self;
        loop {
            if let Some(k) = class.table.names.iter().position(|&n| n == name_id) {
                let index = class.table.offset + k as u16;
                return Ok((index, class.table.type_of(k)));
            }
            match class.superclass {
                Some(parent) => class = parent,
                None => {
                    return Err(RuntimeError::type_error(alloc::format!(
                        "no such property: {name_id} on {}",
                        self.name
                    )))
                }
            }
        }
    }

    /// True iff `self` is `other` or a (possibly indirect) subclass of it.
    pub fn is_subclass(&self, other: &ClassDef) -> bool {
        let mut class = self;
        loop {
            if core::ptr::eq(class, other) {
                return true;
            }
            match class.superclass {
                Some(parent) => class = parent,
                None => return false,
            }
        }
    }

    /// The full chain from `self` up to the root, most-derived first.
    /// Exposed for diagnostics and tests, mirroring the teacher's
    /// `#[cfg(any(test, feature = "test-helpers"))]` raw-memory accessors.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn chain(&self) -> Vec<&'static ClassDef> {
        let mut out = Vec::new();
        let mut class: Option<&'static ClassDef> = Some(self);
        while let Some(c) = class {
            out.push(c);
            class = c.superclass;
        }
        out
    }
}
