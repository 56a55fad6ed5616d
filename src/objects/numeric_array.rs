//! Fixed-length arrays of unboxed numbers: `Array<integer>` and
//! `Array<float>`. Neither can hold a pointer, so the collector never
//! scans their bodies (`start_index = NO_MANAGED_POINTERS`).
//!
//! Grounded on `gc_new_intarray(_base)`/`gc_intarray_length`/
//! `gc_intarray_get` and the analogous `gc_new_floatarray*` family, which
//! reuses the int-array layout and only swaps the header's class.

use super::{FLOAT_ARRAY_CLASS, INT_ARRAY_CLASS};
use crate::class::ClassDef;
use crate::error::RtResult;
use crate::runtime::Runtime;
use crate::value::ptr_to_value;
use crate::value::Value;

fn new_base(rt: &mut Runtime, class: &'static ClassDef, n: i32) -> RtResult<(u32, u32)> {
    let n = n.max(0) as u32;
    let index = rt.allocate_variable(class, n + 1)?;
    rt.heap_mut().set(index + 1, n);
    Ok((index, n))
}

/// `gc_new_intarray`.
pub fn new_intarray(rt: &mut Runtime, n: i32, init_value: i32) -> RtResult<Value> {
    let (index, n) = new_base(rt, &INT_ARRAY_CLASS, n)?;
    for i in 0..n {
        rt.heap_mut().set(index + 2 + i, init_value as u32);
    }
    Ok(ptr_to_value(index))
}

/// `gc_make_intarray`, generalised to a slice instead of a variadic arg list.
pub fn with_intarray_elements(rt: &mut Runtime, elements: &[i32]) -> RtResult<Value> {
    let (index, _) = new_base(rt, &INT_ARRAY_CLASS, elements.len() as i32)?;
    for (i, &v) in elements.iter().enumerate() {
        rt.heap_mut().set(index + 2 + i as u32, v as u32);
    }
    Ok(ptr_to_value(index))
}

pub fn intarray_length(rt: &Runtime, obj: Value) -> i32 {
    rt.get_int_property(obj, 0)
}

pub fn intarray_get(rt: &Runtime, obj: Value, index: i32) -> RtResult<i32> {
    let len = intarray_length(rt, obj);
    bounds_check(index, len, "Array<integer>.get/set")?;
    Ok(rt.get_int_property(obj, 1 + index as u32))
}

pub fn intarray_set(rt: &mut Runtime, obj: Value, index: i32, value: i32) -> RtResult<i32> {
    let len = intarray_length(rt, obj);
    bounds_check(index, len, "Array<integer>.get/set")?;
    rt.set_int_property(obj, 1 + index as u32, value);
    Ok(value)
}

/// `gc_new_floatarray`: shares the int-array layout, only the header class
/// differs.
pub fn new_floatarray(rt: &mut Runtime, n: i32, init_value: f32) -> RtResult<Value> {
    let (index, n) = new_base(rt, &FLOAT_ARRAY_CLASS, n)?;
    for i in 0..n {
        rt.heap_mut().set(index + 2 + i, init_value.to_bits());
    }
    Ok(ptr_to_value(index))
}

pub fn with_floatarray_elements(rt: &mut Runtime, elements: &[f32]) -> RtResult<Value> {
    let (index, _) = new_base(rt, &FLOAT_ARRAY_CLASS, elements.len() as i32)?;
    for (i, &v) in elements.iter().enumerate() {
        rt.heap_mut().set(index + 2 + i as u32, v.to_bits());
    }
    Ok(ptr_to_value(index))
}

pub fn floatarray_length(rt: &Runtime, obj: Value) -> i32 {
    rt.get_int_property(obj, 0)
}

pub fn floatarray_get(rt: &Runtime, obj: Value, index: i32) -> RtResult<f32> {
    let len = floatarray_length(rt, obj);
    bounds_check(index, len, "Array<float>.get/set")?;
    Ok(rt.get_float_property(obj, 1 + index as u32))
}

pub fn floatarray_set(rt: &mut Runtime, obj: Value, index: i32, value: f32) -> RtResult<f32> {
    let len = floatarray_length(rt, obj);
    bounds_check(index, len, "Array<float>.get/set")?;
    rt.set_float_property(obj, 1 + index as u32, value);
    Ok(value)
}

fn bounds_check(index: i32, len: i32, site: &'static str) -> RtResult<()> {
    if 0 <= index && index < len {
        Ok(())
    } else {
        Err(crate::error::RuntimeError::index_error(index, len, site))
    }
}
