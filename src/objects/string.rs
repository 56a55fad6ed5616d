//! String literals: an interned `&'static str` wrapped in a one-word heap
//! object, so a string value can still carry a class and participate in
//! `class_of`/`is_subclass` checks like any other object.
//!
//! Grounded on the `string_literal` `CLASS_OBJECT` and
//! `gc_new_string`/`gc_is_string_literal`/`gc_string_literal_cstr`. The
//! original stores a raw `const char*` in the body word; the host-pointer
//! interning table (`intern::Table`) plays that role here, so the body word
//! holds a string handle rather than a reconstructed pointer.

use super::STRING_LITERAL_CLASS;
use crate::runtime::Runtime;
use crate::value::{value_to_ptr, Value};

/// `gc_new_string`: wrap an interned static string literal in a heap object.
/// Infallible: string literal handles come from the always-available
/// interning table, not the heap allocator's retry/GC path, but the object
/// itself still needs a heap slot, so this mirrors `allocate_object`'s
/// panicking-never-happens assumption by propagating allocation failure like
/// any other constructor would via its caller's `?`.
pub fn new_string(rt: &mut Runtime, s: &'static str) -> Value {
    let handle = rt.intern_string(s);
    let index = rt
        .allocate_object(&STRING_LITERAL_CLASS)
        .expect("string literal allocation should not fail under normal heap pressure");
    rt.heap_mut().set(index + 1, handle);
    crate::value::ptr_to_value(index)
}

/// `gc_is_string_literal`.
pub fn is_string_literal(rt: &Runtime, v: Value) -> bool {
    rt.class_of(v) == Some(&STRING_LITERAL_CLASS)
}

/// `gc_string_literal_cstr`: recover the wrapped `&'static str`.
pub fn string_cstr(rt: &Runtime, v: Value) -> &'static str {
    let index = value_to_ptr(v);
    let handle = rt.heap().get(index + 1);
    rt.string_by_handle(handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_string_round_trips_and_is_recognised() {
        let mut rt = Runtime::new();
        let v = new_string(&mut rt, "test");
        assert!(is_string_literal(&rt, v));
        assert_eq!(string_cstr(&rt, v), "test");
        assert!(crate::value::is_ptr_value(v));
    }

    #[test]
    fn distinct_literals_are_not_confused() {
        let mut rt = Runtime::new();
        let a = new_string(&mut rt, "alpha");
        let b = new_string(&mut rt, "beta");
        assert_eq!(string_cstr(&rt, a), "alpha");
        assert_eq!(string_cstr(&rt, b), "beta");
    }
}
