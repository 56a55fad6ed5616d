//! Native function objects: a callable packaged with its declared
//! signature and an optional captured-value vector (closures over free
//! variables).
//!
//! Grounded on the `function_object` `CLASS_OBJECT` and
//! `gc_new_function`/`gc_is_function_object`/`gc_function_object_ptr`/
//! `gc_function_captured_value`. `body[0]` is the interned native-function
//! handle (replacing a raw `void*`), `body[1]` the interned signature
//! string, `body[2]` the captured-values vector.

use super::vector::vector_get;
use super::FUNCTION_CLASS;
use crate::class::Method;
use crate::error::RtResult;
use crate::runtime::Runtime;
use crate::value::{ptr_to_value, value_to_ptr, Value};

/// `gc_new_function`: `captured_values` may be `VALUE_UNDEF`.
pub fn new_function(
    rt: &mut Runtime,
    fptr: Method,
    signature: &'static str,
    captured_values: Value,
) -> RtResult<Value> {
    let fn_handle = rt.intern_function(fptr as usize, fptr);
    let sig_handle = rt.intern_string(signature);

    rt.push_root_values(&[captured_values]);
    let result = rt.allocate_object(&FUNCTION_CLASS);
    rt.pop_root_frame();
    let index = result?;

    rt.heap_mut().set(index + 1, fn_handle);
    rt.heap_mut().set(index + 2, sig_handle);
    let obj = ptr_to_value(index);
    rt.set_property(obj, 2, captured_values);
    Ok(obj)
}

/// `gc_is_function_object`.
pub fn is_function_object(rt: &Runtime, obj: Value, signature: &str) -> bool {
    if rt.class_of(obj) != Some(&FUNCTION_CLASS) {
        return false;
    }
    let index = value_to_ptr(obj);
    let sig_handle = rt.heap().get(index + 2);
    rt.string_by_handle(sig_handle) == signature
}

/// `gc_function_object_ptr`: only index 0 (the native function pointer) is
/// meaningful.
pub fn function_ptr(rt: &Runtime, obj: Value) -> Method {
    let index = value_to_ptr(obj);
    let handle = rt.heap().get(index + 1);
    rt.function_by_handle(handle)
}

/// `gc_function_captured_value`.
pub fn function_captured_value(rt: &Runtime, obj: Value, index: i32) -> RtResult<Value> {
    let this_index = value_to_ptr(obj);
    let captured = Value(rt.heap().get(this_index + 3));
    vector_get(rt, captured, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{int_to_value, UNDEF};

    fn dummy(_args: &[Value]) -> RtResult<Value> {
        Ok(int_to_value(0))
    }

    #[test]
    fn new_function_is_recognised_by_signature() {
        let mut rt = Runtime::new();
        let f = new_function(&mut rt, dummy, "(int)->int", UNDEF).unwrap();
        assert!(is_function_object(&rt, f, "(int)->int"));
        assert!(!is_function_object(&rt, f, "()->void"));
    }

    #[test]
    fn function_ptr_round_trips() {
        let mut rt = Runtime::new();
        let f = new_function(&mut rt, dummy, "()->int", UNDEF).unwrap();
        let ptr = function_ptr(&rt, f);
        assert_eq!(ptr(&[]).unwrap(), int_to_value(0));
    }
}
