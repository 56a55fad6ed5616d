//! The generic, name-indexed property accessors every field read/write and
//! compound-assign compiles down to when the target's class isn't known
//! until runtime (an `any`-typed object reference).
//!
//! Grounded on `get_anyobj_property2`/`get_anyobj_property`/
//! `set_anyobj_property`/`acc_anyobj_property`: the first walks the
//! inheritance chain by name id (already the job of
//! [`crate::class::ClassDef::property_lookup`]); the other three dispatch on
//! the resolved slot's unboxed type.

use crate::class::{ClassDef, PropertyType};
use crate::coerce::{safe_to_float, safe_to_int};
use crate::error::{RtResult, RuntimeError};
use crate::ops;
use crate::runtime::Runtime;
use crate::value::{float_to_value, int_to_value, Value};

/// The compound-assignment operators `acc_anyobj_property` supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Increment,
    Decrement,
    PostIncrement,
    PostDecrement,
}

/// `gc_allocate_object` wrapper returning a tagged pointer `Value` instead
/// of a raw body index.
pub fn new_object(rt: &mut Runtime, class: &'static ClassDef) -> RtResult<Value> {
    let index = rt.allocate_object(class)?;
    Ok(crate::value::ptr_to_value(index))
}

fn resolve(rt: &Runtime, obj: Value, property: u16) -> RtResult<(u16, PropertyType)> {
    let class = rt
        .class_of(obj)
        .ok_or_else(|| RuntimeError::type_error("no such property is found"))?;
    class.property_lookup(property)
}

/// `get_anyobj_property`: read the named property off `obj`, unboxing a
/// raw `i`/`f`/`b` slot back into a `value_t`.
pub fn get_anyobj_property(rt: &Runtime, obj: Value, property: u16) -> RtResult<Value> {
    let (index, ty) = resolve(rt, obj, property)?;
    match ty {
        PropertyType::Any => Ok(rt.get_property(obj, index as u32)),
        PropertyType::Int | PropertyType::Bool => {
            Ok(int_to_value(rt.get_int_property(obj, index as u32)))
        }
        PropertyType::Float => Ok(float_to_value(rt.get_float_property(obj, index as u32))),
    }
}

/// `set_anyobj_property`: write the named property, coercing `new_value`
/// down to the slot's unboxed representation when it isn't `any`-typed.
pub fn set_anyobj_property(
    rt: &mut Runtime,
    obj: Value,
    property: u16,
    new_value: Value,
) -> RtResult<Value> {
    let (index, ty) = resolve(rt, obj, property)?;
    match ty {
        PropertyType::Any => {
            rt.set_property(obj, index as u32, new_value);
        }
        PropertyType::Int | PropertyType::Bool => {
            rt.set_int_property(obj, index as u32, safe_to_int(new_value)?);
        }
        PropertyType::Float => {
            rt.set_float_property(obj, index as u32, safe_to_float(new_value)?);
        }
    }
    Ok(new_value)
}

/// `acc_anyobj_property`: read-modify-write the named property with a
/// compound-assignment or increment/decrement operator, returning the new
/// value (or, for the post-increment/decrement variants, the value before
/// the update).
pub fn acc_anyobj_property(
    rt: &mut Runtime,
    obj: Value,
    op: AccOp,
    property: u16,
    value: Value,
) -> RtResult<Value> {
    let (index, ty) = resolve(rt, obj, property)?;
    match ty {
        PropertyType::Any => {
            let left = rt.get_property(obj, index as u32);
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
            rt.set_property(obj, index as u32, new_value);
            Ok(result)
        }
        PropertyType::Int => {
            let left = rt.get_int_property(obj, index as u32);
            let right = safe_to_int(value)?;
            let (new_value, result) = match op {
                AccOp::Add => (left.wrapping_add(right), None),
                AccOp::Subtract => (left.wrapping_sub(right), None),
                AccOp::Multiply => (left.wrapping_mul(right), None),
                AccOp::Divide => (left / right, None),
                AccOp::Increment => (left.wrapping_add(1), None),
                AccOp::Decrement => (left.wrapping_sub(1), None),
                AccOp::PostIncrement => (left.wrapping_add(1), Some(left)),
                AccOp::PostDecrement => (left.wrapping_sub(1), Some(left)),
            };
            rt.set_int_property(obj, index as u32, new_value);
            Ok(int_to_value(result.unwrap_or(new_value)))
        }
        PropertyType::Float => {
            let left = rt.get_float_property(obj, index as u32);
            let right = safe_to_float(value)?;
            let (new_value, result) = match op {
                AccOp::Add => (left + right, None),
                AccOp::Subtract => (left - right, None),
                AccOp::Multiply => (left * right, None),
                AccOp::Divide => (left / right, None),
                AccOp::Increment => (left + 1.0, None),
                AccOp::Decrement => (left - 1.0, None),
                AccOp::PostIncrement => (left + 1.0, Some(left)),
                AccOp::PostDecrement => (left - 1.0, Some(left)),
            };
            rt.set_float_property(obj, index as u32, new_value);
            Ok(result.map(int_to_value).unwrap_or_else(|| float_to_value(new_value)))
        }
        PropertyType::Bool => Err(RuntimeError::type_error("acc_anyobj_property:bool")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{ClassDef, PropertyTable, NO_MANAGED_POINTERS};
    use crate::runtime::Runtime;

    static TABLE: PropertyTable = PropertyTable {
        offset: 0,
        names: &[10, 11],
        unboxed_types: &[b'i'],
    };

    static WITH_PROPS: ClassDef = ClassDef {
        size: 2,
        start_index: 1,
        name: "WithProps",
        superclass: None,
        table: TABLE,
        vtable: &[],
    };

    #[test]
    fn int_property_round_trips_through_set_and_get() {
        let mut rt = Runtime::new();
        let obj = new_object(&mut rt, &WITH_PROPS).unwrap();
        set_anyobj_property(&mut rt, obj, 10, int_to_value(5)).unwrap();
        assert_eq!(get_anyobj_property(&rt, obj, 10).unwrap(), int_to_value(5));
    }

    #[test]
    fn any_property_round_trips_through_set_and_get() {
        let mut rt = Runtime::new();
        let obj = new_object(&mut rt, &WITH_PROPS).unwrap();
        set_anyobj_property(&mut rt, obj, 11, int_to_value(42)).unwrap();
        assert_eq!(
            get_anyobj_property(&rt, obj, 11).unwrap(),
            int_to_value(42)
        );
    }

    #[test]
    fn post_increment_returns_old_value() {
        let mut rt = Runtime::new();
        let obj = new_object(&mut rt, &WITH_PROPS).unwrap();
        set_anyobj_property(&mut rt, obj, 10, int_to_value(9)).unwrap();
        let old = acc_anyobj_property(&mut rt, obj, AccOp::PostIncrement, 10, int_to_value(0))
            .unwrap();
        assert_eq!(old, int_to_value(9));
        assert_eq!(get_anyobj_property(&rt, obj, 10).unwrap(), int_to_value(10));
    }

    #[test]
    fn unknown_property_is_a_type_error() {
        let mut rt = Runtime::new();
        let obj = new_object(&mut rt, &WITH_PROPS).unwrap();
        assert!(get_anyobj_property(&rt, obj, 999).is_err());
    }
}
