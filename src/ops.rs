//! Any-type arithmetic, comparison, compound-assign, increment/decrement
//! and unary minus: the tag-dispatched operator library every binary/unary
//! expression over an `any`-typed slot compiles down to.
//!
//! Each operator gets one small function sharing a `classify` helper,
//! rather than being instantiated from a C preprocessor macro family.

use crate::error::{RtResult, RuntimeError};
use crate::value::{
    float_to_value, int_to_value, is_float_value, is_int_value, value_to_float, value_to_int,
    Value,
};

/// The two operand categories the any-op library distinguishes once tags
/// are known to be numeric.
enum Numeric {
    Int(i32),
    Float(f32),
}

fn classify(v: Value) -> Option<Numeric> {
    if is_int_value(v) {
        Some(Numeric::Int(value_to_int(v)))
    } else if is_float_value(v) {
        Some(Numeric::Float(value_to_float(v)))
    } else {
        None
    }
}

fn numeric_op(
    op_name: &'static str,
    a: Value,
    b: Value,
    int_op: impl FnOnce(i32, i32) -> i32,
    float_op: impl FnOnce(f32, f32) -> f32,
) -> RtResult<Value> {
    match (classify(a), classify(b)) {
        (Some(Numeric::Int(x)), Some(Numeric::Int(y))) => Ok(int_to_value(int_op(x, y))),
        (Some(Numeric::Int(x)), Some(Numeric::Float(y))) => {
            Ok(float_to_value(float_op(x as f32, y)))
        }
        (Some(Numeric::Float(x)), Some(Numeric::Int(y))) => {
            Ok(float_to_value(float_op(x, y as f32)))
        }
        (Some(Numeric::Float(x)), Some(Numeric::Float(y))) => Ok(float_to_value(float_op(x, y))),
        _ => Err(RuntimeError::type_error(alloc::format!(
            "bad operand for {op_name}"
        ))),
    }
}

fn numeric_cmp(
    op_name: &'static str,
    a: Value,
    b: Value,
    int_op: impl FnOnce(i32, i32) -> bool,
    float_op: impl FnOnce(f32, f32) -> bool,
) -> RtResult<bool> {
    match (classify(a), classify(b)) {
        (Some(Numeric::Int(x)), Some(Numeric::Int(y))) => Ok(int_op(x, y)),
        (Some(Numeric::Int(x)), Some(Numeric::Float(y))) => Ok(float_op(x as f32, y)),
        (Some(Numeric::Float(x)), Some(Numeric::Int(y))) => Ok(float_op(x, y as f32)),
        (Some(Numeric::Float(x)), Some(Numeric::Float(y))) => Ok(float_op(x, y)),
        _ => Err(RuntimeError::type_error(alloc::format!(
            "bad operand for {op_name}"
        ))),
    }
}

pub fn any_add(a: Value, b: Value) -> RtResult<Value> {
    numeric_op("+", a, b, i32::wrapping_add, |x, y| x + y)
}

pub fn any_subtract(a: Value, b: Value) -> RtResult<Value> {
    numeric_op("-", a, b, i32::wrapping_sub, |x, y| x - y)
}

pub fn any_multiply(a: Value, b: Value) -> RtResult<Value> {
    numeric_op("*", a, b, i32::wrapping_mul, |x, y| x * y)
}

pub fn any_divide(a: Value, b: Value) -> RtResult<Value> {
    numeric_op("/", a, b, |x, y| x / y, |x, y| x / y)
}

pub fn any_less(a: Value, b: Value) -> RtResult<bool> {
    numeric_cmp("<", a, b, |x, y| x < y, |x, y| x < y)
}

pub fn any_less_eq(a: Value, b: Value) -> RtResult<bool> {
    numeric_cmp("<=", a, b, |x, y| x <= y, |x, y| x <= y)
}

pub fn any_greater(a: Value, b: Value) -> RtResult<bool> {
    numeric_cmp(">", a, b, |x, y| x > y, |x, y| x > y)
}

pub fn any_greater_eq(a: Value, b: Value) -> RtResult<bool> {
    numeric_cmp(">=", a, b, |x, y| x >= y, |x, y| x >= y)
}

/// Compound-assign variants mutate through `slot` directly; they never
/// invoke the write barrier because a compound-assign target is always a
/// local or a primitive field, never a managed reference.
pub fn any_add_assign(slot: &mut Value, b: Value) -> RtResult<Value> {
    *slot = any_add(*slot, b)?;
    Ok(*slot)
}

pub fn any_subtract_assign(slot: &mut Value, b: Value) -> RtResult<Value> {
    *slot = any_subtract(*slot, b)?;
    Ok(*slot)
}

pub fn any_multiply_assign(slot: &mut Value, b: Value) -> RtResult<Value> {
    *slot = any_multiply(*slot, b)?;
    Ok(*slot)
}

pub fn any_divide_assign(slot: &mut Value, b: Value) -> RtResult<Value> {
    *slot = any_divide(*slot, b)?;
    Ok(*slot)
}

fn stepped(expr: Value, delta: i32) -> RtResult<Value> {
    if is_int_value(expr) {
        Ok(int_to_value(value_to_int(expr).wrapping_add(delta)))
    } else if is_float_value(expr) {
        Ok(float_to_value(value_to_float(expr) + delta as f32))
    } else {
        Err(RuntimeError::type_error("bad operand for increment/decrement"))
    }
}

/// Pre-increment: store and return the new value.
pub fn any_increment(expr: &mut Value) -> RtResult<Value> {
    *expr = stepped(*expr, 1)?;
    Ok(*expr)
}

/// Pre-decrement: store and return the new value.
pub fn any_decrement(expr: &mut Value) -> RtResult<Value> {
    *expr = stepped(*expr, -1)?;
    Ok(*expr)
}

/// Post-increment: store the new value, return the old one.
pub fn any_post_increment(expr: &mut Value) -> RtResult<Value> {
    let old = *expr;
    *expr = stepped(old, 1)?;
    Ok(old)
}

/// Post-decrement: store the new value, return the old one.
pub fn any_post_decrement(expr: &mut Value) -> RtResult<Value> {
    let old = *expr;
    *expr = stepped(old, -1)?;
    Ok(old)
}

pub fn minus_any_value(v: Value) -> RtResult<Value> {
    if is_int_value(v) {
        Ok(int_to_value(value_to_int(v).wrapping_neg()))
    } else if is_float_value(v) {
        Ok(float_to_value(-value_to_float(v)))
    } else {
        Err(RuntimeError::type_error("bad operand for unary minus"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_plus_int_stays_int() {
        let r = any_add(int_to_value(2), int_to_value(3)).unwrap();
        assert!(is_int_value(r));
        assert_eq!(value_to_int(r), 5);
    }

    #[test]
    fn int_plus_float_promotes_to_float() {
        let r = any_add(int_to_value(2), float_to_value(0.5)).unwrap();
        assert!(is_float_value(r));
        assert!((value_to_float(r) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn non_numeric_operand_is_a_type_error() {
        assert!(any_add(Value(0b011), int_to_value(1)).is_err());
    }

    #[test]
    fn comparisons_cross_numeric_kinds() {
        assert!(any_less(int_to_value(1), float_to_value(1.5)).unwrap());
        assert!(!any_greater_eq(int_to_value(1), float_to_value(1.5)).unwrap());
    }

    #[test]
    fn compound_assign_mutates_the_slot_and_returns_new_value() {
        let mut slot = int_to_value(10);
        let r = any_add_assign(&mut slot, int_to_value(5)).unwrap();
        assert_eq!(r, slot);
        assert_eq!(value_to_int(slot), 15);
    }

    #[test]
    fn pre_and_post_increment_differ_in_return_value() {
        let mut slot = int_to_value(1);
        let post = any_post_increment(&mut slot).unwrap();
        assert_eq!(value_to_int(post), 1);
        assert_eq!(value_to_int(slot), 2);

        let pre = any_increment(&mut slot).unwrap();
        assert_eq!(value_to_int(pre), 3);
        assert_eq!(value_to_int(slot), 3);
    }

    #[test]
    fn unary_minus_negates_both_kinds() {
        assert_eq!(value_to_int(minus_any_value(int_to_value(4)).unwrap()), -4);
        assert!(
            (value_to_float(minus_any_value(float_to_value(1.5)).unwrap()) + 1.5).abs() < 1e-6
        );
    }

    #[rstest::rstest]
    #[case::add(any_add as fn(Value, Value) -> RtResult<Value>, 2, 3, 5)]
    #[case::subtract(any_subtract as fn(Value, Value) -> RtResult<Value>, 5, 3, 2)]
    #[case::multiply(any_multiply as fn(Value, Value) -> RtResult<Value>, 4, 3, 12)]
    fn int_int_arithmetic_never_promotes_to_float(
        #[case] op: fn(Value, Value) -> RtResult<Value>,
        #[case] a: i32,
        #[case] b: i32,
        #[case] expected: i32,
    ) {
        let r = op(int_to_value(a), int_to_value(b)).unwrap();
        assert!(is_int_value(r));
        assert_eq!(value_to_int(r), expected);
    }

    #[rstest::rstest]
    #[case::add(any_add as fn(Value, Value) -> RtResult<Value>, 2.0, 3, 5.0)]
    #[case::subtract(any_subtract as fn(Value, Value) -> RtResult<Value>, 5.0, 3, 2.0)]
    #[case::multiply(any_multiply as fn(Value, Value) -> RtResult<Value>, 4.0, 3, 12.0)]
    #[case::divide(any_divide as fn(Value, Value) -> RtResult<Value>, 9.0, 3, 3.0)]
    fn mixed_float_int_arithmetic_always_promotes_to_float(
        #[case] op: fn(Value, Value) -> RtResult<Value>,
        #[case] a: f32,
        #[case] b: i32,
        #[case] expected: f32,
    ) {
        let r = op(float_to_value(a), int_to_value(b)).unwrap();
        assert!(is_float_value(r));
        assert!((value_to_float(r) - expected).abs() < 1e-6);
    }
}
