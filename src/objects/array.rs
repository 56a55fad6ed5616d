//! `Array` and `Array<any>`: a 2-word body of `[logical length, backing
//! vector]`. The logical length may be less than the vector's own length —
//! "logical slicing" — so every accessor indexes through the stored vector
//! rather than owning elements directly.
//!
//! Grounded on `gc_new_array`/`gc_array_length`/`gc_array_get`/
//! `gc_array_set`, and the cross-kind dispatchers `gc_safe_array_get`/
//! `gc_safe_array_set`/`gc_safe_array_acc`/`get_anyobj_length_property`,
//! which this module folds into one `array_length`/`array_get`/
//! `array_set`/`array_acc` that work uniformly over every array-like class
//! (int/float/byte array, vector, array, any-array) by dispatching on
//! `class_of`.

use super::generic::AccOp;
use super::vector::{
    fast_vector_get, fast_vector_set, new_vector, vector_get, vector_length, vector_set,
};
use super::{
    ANYARRAY_CLASS, ARRAY_CLASS, BYTE_ARRAY_CLASS, FLOAT_ARRAY_CLASS, INT_ARRAY_CLASS,
    VECTOR_CLASS,
};
use crate::error::{RtResult, RuntimeError};
use crate::objects::bytearray::{bytearray_get, bytearray_length, bytearray_set};
use crate::objects::numeric_array::{
    floatarray_get, floatarray_length, floatarray_set, intarray_get, intarray_length,
    intarray_set,
};
use crate::ops;
use crate::runtime::Runtime;
use crate::value::{float_to_value, int_to_value, ptr_to_value, Value};

fn class_for(is_any: bool) -> &'static crate::class::ClassDef {
    if is_any {
        &ANYARRAY_CLASS
    } else {
        &ARRAY_CLASS
    }
}

/// `gc_new_array`: a fresh backing vector of `n` elements, sliced to its
/// own full length.
pub fn new_array(rt: &mut Runtime, is_any: bool, n: i32, init_value: Value) -> RtResult<Value> {
    rt.push_root_values(&[init_value]);
    let result = rt.allocate_object(class_for(is_any));
    rt.pop_root_frame();
    let index = result?;
    let obj = ptr_to_value(index);

    rt.push_root_values(&[obj]);
    let vec = new_vector(rt, n, init_value);
    rt.pop_root_frame();
    let vec = vec?;

    rt.set_property(obj, 1, vec);
    rt.set_int_property(obj, 0, n.max(0));
    Ok(obj)
}

/// `gc_make_array`, generalised to a slice: elements are written through
/// `fast_vector_set`, so the caller must keep `elements` reachable from a
/// root itself until this constructor returns.
pub fn with_array_elements(rt: &mut Runtime, is_any: bool, elements: &[Value]) -> RtResult<Value> {
    let array = new_array(rt, is_any, elements.len() as i32, crate::value::UNDEF)?;
    let vec = rt.get_property(array, 1);
    for (i, &v) in elements.iter().enumerate() {
        fast_vector_set(rt, vec, i as u32, v);
    }
    Ok(array)
}

/// `gc_array_length`: the logical length, body word 0 (not necessarily the
/// backing vector's length).
fn array_kind_length(rt: &Runtime, obj: Value) -> i32 {
    rt.get_int_property(obj, 0)
}

/// `gc_array_get`.
fn array_kind_get(rt: &Runtime, obj: Value, idx: i32) -> RtResult<Value> {
    let len = array_kind_length(rt, obj);
    if 0 <= idx && idx < len {
        let vec = rt.get_property(obj, 1);
        Ok(fast_vector_get(rt, vec, idx))
    } else {
        Err(RuntimeError::index_error(idx, len, "Array.get"))
    }
}

/// `gc_array_set`: barriered through the backing vector's slot, not the
/// array object's own header (the array object holds no pointer besides
/// the vector reference itself, already set at construction).
fn array_kind_set(rt: &mut Runtime, obj: Value, idx: i32, new_value: Value) -> RtResult<Value> {
    let len = array_kind_length(rt, obj);
    if 0 <= idx && idx < len {
        let vec = rt.get_property(obj, 1);
        fast_vector_set(rt, vec, idx as u32, new_value);
        Ok(new_value)
    } else {
        Err(RuntimeError::index_error(idx, len, "Array.set"))
    }
}

/// `gc_array_length` exposed directly for callers that already know they
/// hold an `Array`/`Array<any>` (as opposed to the uniform [`array_length`]
/// dispatcher below, which works across every array-like kind).
pub fn fixed_array_length(rt: &Runtime, obj: Value) -> i32 {
    array_kind_length(rt, obj)
}

pub fn array_get(rt: &Runtime, obj: Value, idx: i32) -> RtResult<Value> {
    array_kind_get(rt, obj, idx)
}

pub fn array_set(rt: &mut Runtime, obj: Value, idx: i32, new_value: Value) -> RtResult<Value> {
    array_kind_set(rt, obj, idx, new_value)
}

/// `array_length` (spec §4.O): works uniformly over every array-like
/// class by reading the length word at a kind-dependent offset, matching
/// `get_anyobj_length_property`'s class-identity dispatch.
pub fn array_length(rt: &Runtime, obj: Value) -> RtResult<i32> {
    let class = rt
        .class_of(obj)
        .ok_or_else(|| RuntimeError::type_error("reading the length of a non array"))?;
    if class == &INT_ARRAY_CLASS {
        Ok(intarray_length(rt, obj))
    } else if class == &FLOAT_ARRAY_CLASS {
        Ok(floatarray_length(rt, obj))
    } else if class == &BYTE_ARRAY_CLASS {
        Ok(bytearray_length(rt, obj))
    } else if class == &VECTOR_CLASS {
        Ok(vector_length(rt, obj))
    } else if class == &ARRAY_CLASS || class == &ANYARRAY_CLASS {
        Ok(array_kind_length(rt, obj))
    } else {
        Err(RuntimeError::type_error("reading the length of a non array"))
    }
}

/// `gc_safe_array_get`: read element `idx` of `obj`, whatever array-like
/// kind it is, boxing raw int/float/byte elements back into a `value_t`.
pub fn safe_array_get(rt: &Runtime, obj: Value, idx: i32) -> RtResult<Value> {
    let class = rt
        .class_of(obj)
        .ok_or_else(|| RuntimeError::type_error("reading a non array"))?;
    if class == &INT_ARRAY_CLASS {
        intarray_get(rt, obj, idx).map(int_to_value)
    } else if class == &FLOAT_ARRAY_CLASS {
        floatarray_get(rt, obj, idx).map(float_to_value)
    } else if class == &BYTE_ARRAY_CLASS {
        bytearray_get(rt, obj, idx).map(|b| int_to_value(b as i32))
    } else if class == &VECTOR_CLASS {
        vector_get(rt, obj, idx)
    } else if class == &ARRAY_CLASS || class == &ANYARRAY_CLASS {
        array_kind_get(rt, obj, idx)
    } else {
        Err(RuntimeError::type_error("reading a non array"))
    }
}

/// `gc_safe_array_set`: write element `idx` of `obj`, coercing `new_value`
/// down to the kind's raw representation when it isn't any-typed.
pub fn safe_array_set(rt: &mut Runtime, obj: Value, idx: i32, new_value: Value) -> RtResult<Value> {
    let class = rt
        .class_of(obj)
        .ok_or_else(|| RuntimeError::type_error("assignment to a non array"))?;
    if class == &INT_ARRAY_CLASS {
        let v = crate::coerce::safe_to_int(new_value)?;
        intarray_set(rt, obj, idx, v).map(int_to_value)
    } else if class == &FLOAT_ARRAY_CLASS {
        let v = crate::coerce::safe_to_float(new_value)?;
        floatarray_set(rt, obj, idx, v).map(float_to_value)
    } else if class == &BYTE_ARRAY_CLASS {
        let v = crate::coerce::safe_to_int(new_value)?;
        bytearray_set(rt, obj, idx, v).map(|b| int_to_value(b as i32))
    } else if class == &VECTOR_CLASS {
        vector_set(rt, obj, idx, new_value)
    } else if class == &ARRAY_CLASS || class == &ANYARRAY_CLASS {
        array_kind_set(rt, obj, idx, new_value)
    } else {
        Err(RuntimeError::type_error("assignment to a non array"))
    }
}

/// `gc_safe_array_acc`: read-modify-write element `idx` with a compound
/// assignment or increment/decrement operator, returning the new value
/// (or, for the post-increment/decrement variants, the value before the
/// update). Works uniformly across every array-like kind via
/// [`safe_array_get`]/[`safe_array_set`].
pub fn safe_array_acc(
    rt: &mut Runtime,
    obj: Value,
    op: AccOp,
    idx: i32,
    value: Value,
) -> RtResult<Value> {
    let left = safe_array_get(rt, obj, idx)?;
    let (new_value, result) = match op {
        AccOp::Add => {
            let n = ops::any_add(left, value)?;
            (n, n)
        }
        AccOp::Subtract => {
            let n = ops::any_subtract(left, value)?;
            (n, n)
        }
        AccOp::Multiply => {
            let n = ops::any_multiply(left, value)?;
            (n, n)
        }
        AccOp::Divide => {
            let n = ops::any_divide(left, value)?;
            (n, n)
        }
        AccOp::Increment => {
            let n = ops::any_add(left, int_to_value(1))?;
            (n, n)
        }
        AccOp::Decrement => {
            let n = ops::any_subtract(left, int_to_value(1))?;
            (n, n)
        }
        AccOp::PostIncrement => {
            let n = ops::any_add(left, int_to_value(1))?;
            (n, left)
        }
        AccOp::PostDecrement => {
            let n = ops::any_subtract(left, int_to_value(1))?;
            (n, left)
        }
    };
    safe_array_set(rt, obj, idx, new_value)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{int_to_value, UNDEF};

    #[test]
    fn array_round_trips_and_reports_length() {
        let mut rt = Runtime::new();
        let a = new_array(&mut rt, false, 3, int_to_value(0)).unwrap();
        assert_eq!(fixed_array_length(&rt, a), 3);
        array_set(&mut rt, a, 1, int_to_value(7)).unwrap();
        assert_eq!(array_get(&rt, a, 1).unwrap(), int_to_value(7));
    }

    #[test]
    fn array_out_of_range_is_an_index_error() {
        let mut rt = Runtime::new();
        let a = new_array(&mut rt, false, 1, UNDEF).unwrap();
        assert!(array_get(&rt, a, 1).is_err());
    }

    #[test]
    fn uniform_array_length_spans_every_kind() {
        let mut rt = Runtime::new();
        let intarr = crate::objects::numeric_array::new_intarray(&mut rt, 4, 0).unwrap();
        let bytearr = crate::objects::bytearray::new_bytearray(&mut rt, 7, 0).unwrap();
        let vec = crate::objects::vector::new_vector(&mut rt, 2, UNDEF).unwrap();
        let arr = new_array(&mut rt, true, 5, UNDEF).unwrap();

        assert_eq!(array_length(&rt, intarr).unwrap(), 4);
        assert_eq!(array_length(&rt, bytearr).unwrap(), 7);
        assert_eq!(array_length(&rt, vec).unwrap(), 2);
        assert_eq!(array_length(&rt, arr).unwrap(), 5);
    }

    #[test]
    fn safe_array_get_set_box_and_coerce_raw_elements() {
        let mut rt = Runtime::new();
        let intarr = crate::objects::numeric_array::new_intarray(&mut rt, 2, 0).unwrap();
        safe_array_set(&mut rt, intarr, 0, int_to_value(9)).unwrap();
        assert_eq!(safe_array_get(&rt, intarr, 0).unwrap(), int_to_value(9));
    }

    #[test]
    fn safe_array_acc_post_increment_returns_old_value() {
        let mut rt = Runtime::new();
        let arr = new_array(&mut rt, true, 1, int_to_value(4)).unwrap();
        let old = safe_array_acc(&mut rt, arr, AccOp::PostIncrement, 0, UNDEF).unwrap();
        assert_eq!(old, int_to_value(4));
        assert_eq!(array_get(&rt, arr, 0).unwrap(), int_to_value(5));
    }

    #[test]
    fn with_array_elements_matches_given_slice() {
        let mut rt = Runtime::new();
        let arr = with_array_elements(&mut rt, true, &[int_to_value(1), int_to_value(2)]).unwrap();
        assert_eq!(fixed_array_length(&rt, arr), 2);
        assert_eq!(array_get(&rt, arr, 1).unwrap(), int_to_value(2));
    }
}
