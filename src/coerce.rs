//! Safe coercions: the `safe_value_to_*` family that validates an `any`
//! value's tag/class before handing it to native code expecting a specific
//! representation, raising a type error on mismatch instead of reinterpreting
//! bits.

use crate::class::ClassDef;
use crate::error::{RtResult, RuntimeError};
use crate::objects::function::is_function_object;
use crate::objects::{
    ANYARRAY_CLASS, ARRAY_CLASS, BYTE_ARRAY_CLASS, FLOAT_ARRAY_CLASS, INT_ARRAY_CLASS,
    STRING_LITERAL_CLASS, VECTOR_CLASS,
};
use crate::runtime::Runtime;
use crate::value::{
    is_float_value, is_int_value, is_ptr_value, value_to_float, value_to_int, Value, NULL,
};

pub fn safe_to_int(v: Value) -> RtResult<i32> {
    if is_int_value(v) {
        Ok(value_to_int(v))
    } else {
        Err(RuntimeError::type_error("value_to_int"))
    }
}

pub fn safe_to_float(v: Value) -> RtResult<f32> {
    if is_float_value(v) {
        Ok(value_to_float(v))
    } else if is_int_value(v) {
        Ok(value_to_int(v) as f32)
    } else {
        Err(RuntimeError::type_error("float"))
    }
}

pub fn safe_to_null(v: Value) -> RtResult<Value> {
    if v == NULL {
        Ok(v)
    } else {
        Err(RuntimeError::type_error("null"))
    }
}

/// `value_to_truefalse`: the same bit test as `value_to_bool`, exposed
/// under its own name since every `any` value is a valid boolean and this
/// conversion never raises.
pub fn value_to_truefalse(v: Value) -> bool {
    crate::value::value_to_bool(v)
}

/// Any value can be a boolean value: a non-raising wrapper kept distinct
/// from [`value_to_truefalse`] since callers reach for this name at a
/// coercion call site and the other at a raw conditional test.
pub fn safe_to_bool(v: Value) -> bool {
    value_to_truefalse(v)
}

/// Generic `safe_value_to_value`: `v` must be a pointer whose class is, or
/// inherits from, `class`; on failure the error names `class`, matching the
/// original's `type_error(clazz->name)`.
pub fn safe_to_value(rt: &Runtime, class: &'static ClassDef, v: Value) -> RtResult<Value> {
    match rt.class_of(v) {
        Some(actual) if actual.is_subclass(class) => Ok(v),
        _ => Err(RuntimeError::type_error(class.name)),
    }
}

pub fn safe_to_string(rt: &Runtime, v: Value) -> RtResult<Value> {
    if rt.class_of(v) == Some(&STRING_LITERAL_CLASS) {
        Ok(v)
    } else {
        Err(RuntimeError::type_error("string"))
    }
}

/// Any heap object other than a string literal is a valid `Object`; `NULL`
/// is valid too.
pub fn safe_to_object(rt: &Runtime, v: Value) -> RtResult<Value> {
    if !is_ptr_value(v) {
        return Err(RuntimeError::type_error("Object"));
    }
    if rt.class_of(v) == Some(&STRING_LITERAL_CLASS) {
        return Err(RuntimeError::type_error("Object"));
    }
    Ok(v)
}

pub fn safe_to_function(rt: &Runtime, signature: &str, v: Value) -> RtResult<Value> {
    if is_function_object(rt, v, signature) {
        Ok(v)
    } else {
        Err(RuntimeError::type_error("function"))
    }
}

pub fn safe_to_intarray(rt: &Runtime, v: Value) -> RtResult<Value> {
    safe_to_value(rt, &INT_ARRAY_CLASS, v)
}

pub fn safe_to_floatarray(rt: &Runtime, v: Value) -> RtResult<Value> {
    safe_to_value(rt, &FLOAT_ARRAY_CLASS, v)
}

pub fn safe_to_bytearray(rt: &Runtime, v: Value) -> RtResult<Value> {
    safe_to_value(rt, &BYTE_ARRAY_CLASS, v)
}

pub fn safe_to_vector(rt: &Runtime, v: Value) -> RtResult<Value> {
    safe_to_value(rt, &VECTOR_CLASS, v)
}

pub fn safe_to_array(rt: &Runtime, v: Value) -> RtResult<Value> {
    safe_to_value(rt, &ARRAY_CLASS, v)
}

pub fn safe_to_anyarray(rt: &Runtime, v: Value) -> RtResult<Value> {
    safe_to_value(rt, &ANYARRAY_CLASS, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{float_to_value, int_to_value};

    #[test]
    fn int_coercion_rejects_float_per_spec_scenario_7() {
        assert!(safe_to_int(float_to_value(3.0)).is_err());
        assert_eq!(safe_to_int(int_to_value(4)).unwrap(), 4);
    }

    #[test]
    fn float_coercion_accepts_int_by_promotion() {
        assert_eq!(safe_to_float(int_to_value(2)).unwrap(), 2.0);
    }

    #[test]
    fn null_coercion_rejects_non_null_pointers() {
        assert!(safe_to_null(NULL).is_ok());
        assert!(safe_to_null(int_to_value(0)).is_err());
    }

    #[test]
    fn boolean_coercion_never_fails() {
        assert!(!safe_to_bool(NULL));
        assert!(safe_to_bool(int_to_value(1)));
    }

    #[test]
    fn object_coercion_rejects_string_literals_and_primitives() {
        let mut rt = Runtime::new();
        let s = crate::objects::string::new_string(&mut rt, "hi");
        assert!(safe_to_object(&rt, s).is_err());
        assert!(safe_to_object(&rt, int_to_value(1)).is_err());
    }
}
