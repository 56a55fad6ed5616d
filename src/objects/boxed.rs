//! Boxes: one-slot objects used to implement captured free variables.
//! `boxed_value` holds a managed `value_t`; `boxed_raw_value` holds one
//! unboxed word, reinterpreted as `i32` or `f32` by the caller via
//! [`Runtime::get_int_property`]/[`Runtime::get_float_property`].
//!
//! Grounded on `gc_new_box`/`gc_new_int_box`/`gc_new_float_box`.

use super::{BOXED_RAW_VALUE_CLASS, BOXED_VALUE_CLASS};
use crate::error::RtResult;
use crate::runtime::Runtime;
use crate::value::{ptr_to_value, Value};

/// `gc_new_box`.
pub fn new_box(rt: &mut Runtime, value: Value) -> RtResult<Value> {
    rt.push_root_values(&[value]);
    let result = rt.allocate_object(&BOXED_VALUE_CLASS);
    rt.pop_root_frame();
    let index = result?;
    let obj = ptr_to_value(index);
    rt.set_property(obj, 0, value);
    Ok(obj)
}

/// `gc_new_int_box`.
pub fn new_int_box(rt: &mut Runtime, value: i32) -> RtResult<Value> {
    let index = rt.allocate_object(&BOXED_RAW_VALUE_CLASS)?;
    let obj = ptr_to_value(index);
    rt.set_int_property(obj, 0, value);
    Ok(obj)
}

/// `gc_new_float_box`.
pub fn new_float_box(rt: &mut Runtime, value: f32) -> RtResult<Value> {
    let index = rt.allocate_object(&BOXED_RAW_VALUE_CLASS)?;
    let obj = ptr_to_value(index);
    rt.set_float_property(obj, 0, value);
    Ok(obj)
}
