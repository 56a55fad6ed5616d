//! Vectors: fixed-length, any-typed element arrays. `Array` and
//! `Array<any>` are both built on top of one of these plus a logical
//! length (see `array.rs`).
//!
//! Grounded on `gc_new_vector`/`gc_vector_length`/`gc_vector_get`/
//! `gc_vector_set`/`fast_vector_get`/`fast_vector_set`/`gc_make_vector`.

use super::VECTOR_CLASS;
use crate::error::RtResult;
use crate::runtime::Runtime;
use crate::value::{ptr_to_value, Value, UNDEF};

/// `gc_new_vector`.
pub fn new_vector(rt: &mut Runtime, n: i32, init_value: Value) -> RtResult<Value> {
    let n = n.max(0) as u32;
    rt.push_root_values(&[init_value]);
    let result = rt.allocate_variable(&VECTOR_CLASS, n + 1);
    rt.pop_root_frame();
    let index = result?;

    rt.heap_mut().set(index + 1, n);
    let obj = ptr_to_value(index);
    for i in 0..n {
        rt.set_property(obj, 1 + i, init_value);
    }
    Ok(obj)
}

/// `gc_make_vector`, generalised to a slice: elements are written through
/// `fast_vector_set`, so callers must keep `elements` reachable from a root
/// themselves (a fresh array is not yet reachable from anywhere until its
/// constructor returns it).
pub fn with_vector_elements(rt: &mut Runtime, elements: &[Value]) -> RtResult<Value> {
    let array = new_vector(rt, elements.len() as i32, UNDEF)?;
    for (i, &v) in elements.iter().enumerate() {
        fast_vector_set(rt, array, i as u32, v);
    }
    Ok(array)
}

pub fn vector_length(rt: &Runtime, obj: Value) -> i32 {
    rt.get_int_property(obj, 0)
}

/// `gc_vector_get`.
pub fn vector_get(rt: &Runtime, obj: Value, idx: i32) -> RtResult<Value> {
    let len = vector_length(rt, obj);
    if 0 <= idx && idx < len {
        Ok(rt.get_property(obj, 1 + idx as u32))
    } else {
        Err(crate::error::RuntimeError::index_error(idx, len, "Vector.get"))
    }
}

/// `gc_vector_set`.
pub fn vector_set(rt: &mut Runtime, obj: Value, idx: i32, new_value: Value) -> RtResult<Value> {
    let len = vector_length(rt, obj);
    if 0 <= idx && idx < len {
        rt.set_property(obj, 1 + idx as u32, new_value);
        Ok(new_value)
    } else {
        Err(crate::error::RuntimeError::index_error(idx, len, "Vector.set"))
    }
}

/// `fast_vector_get`: no bounds check, used where the caller (e.g.
/// `array.rs`) already validated the logical length.
pub(crate) fn fast_vector_get(rt: &Runtime, obj: Value, index: i32) -> Value {
    rt.get_property(obj, 1 + index as u32)
}

/// `fast_vector_set`: no bounds check, barriered.
pub(crate) fn fast_vector_set(rt: &mut Runtime, obj: Value, index: u32, new_value: Value) {
    rt.set_property(obj, 1 + index, new_value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::int_to_value;

    #[test]
    fn vector_round_trips_and_reports_length() {
        let mut rt = Runtime::new();
        let v = new_vector(&mut rt, 3, int_to_value(0)).unwrap();
        assert_eq!(vector_length(&rt, v), 3);
        vector_set(&mut rt, v, 1, int_to_value(9)).unwrap();
        assert_eq!(vector_get(&rt, v, 1).unwrap(), int_to_value(9));
    }

    #[test]
    fn vector_out_of_range_is_an_index_error() {
        let mut rt = Runtime::new();
        let v = new_vector(&mut rt, 1, int_to_value(0)).unwrap();
        assert!(vector_get(&rt, v, 1).is_err());
        assert!(vector_set(&mut rt, v, -1, int_to_value(0)).is_err());
    }

    #[test]
    fn with_vector_elements_matches_given_slice() {
        let mut rt = Runtime::new();
        let v = with_vector_elements(&mut rt, &[int_to_value(1), int_to_value(2)]).unwrap();
        assert_eq!(vector_length(&rt, v), 2);
        assert_eq!(vector_get(&rt, v, 0).unwrap(), int_to_value(1));
        assert_eq!(vector_get(&rt, v, 1).unwrap(), int_to_value(2));
    }
}
