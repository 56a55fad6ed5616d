//! End-to-end tests exercised entirely through the public API a compiled
//! program would use: value conversion, every object kind's constructors,
//! a heap filled to capacity and then reclaimed, a reference chain longer
//! than the mark stack, a write barrier firing under a simulated interrupt,
//! and the caught-error path.

use bluescript_rt::class::{ClassDef, VARIABLE_LENGTH};
use bluescript_rt::coerce::safe_to_int;
use bluescript_rt::consts::{HEAP_SIZE, STACK_SIZE};
use bluescript_rt::error::RuntimeError;
use bluescript_rt::objects::bytearray::{bytearray_get, bytearray_length, bytearray_set, new_bytearray};
use bluescript_rt::objects::generic::new_object;
use bluescript_rt::objects::string::{is_string_literal, new_string, string_cstr};
use bluescript_rt::objects::vector::new_vector;
use bluescript_rt::value::{
    bool_to_value, float_to_value, int_to_value, is_ptr_value, ptr_to_value, value_to_bool,
    value_to_int, value_to_ptr, Value, UNDEF,
};
use bluescript_rt::Runtime;

/// Scenario 1: converter round trips.
#[test]
fn scenario_1_converter_round_trips() {
    assert_eq!(int_to_value(8).bits(), 32);
    assert_eq!(value_to_int(Value(32)), 8);

    let f = float_to_value(0.1);
    assert_eq!(f.bits() & 0b11, 0b01);
    assert!((bluescript_rt::value::value_to_float(f) - 0.1).abs() < 1e-6);

    assert_eq!(bool_to_value(true).bits(), 4);
    assert!(value_to_bool(Value(4)));
}

/// Scenario 2: string literal.
#[test]
fn scenario_2_string_literal() {
    let mut rt = Runtime::new();
    let s = new_string(&mut rt, "test");
    assert!(is_string_literal(&rt, s));
    assert_eq!(string_cstr(&rt, s), "test");
    assert!(is_ptr_value(s));
}

/// Scenario 3: byte-array indexing with wraparound.
#[test]
fn scenario_3_bytearray_indexing() {
    let mut rt = Runtime::new();
    let a = new_bytearray(&mut rt, 7, 0).unwrap();
    for i in 0..7i32 {
        bytearray_set(&mut rt, a, i, 257 - i).unwrap();
    }
    for i in 0..7i32 {
        let expected = ((257 - i) & 0xff) as u8;
        assert_eq!(bytearray_get(&rt, a, i).unwrap(), expected);
    }
    assert_eq!(bytearray_length(&rt, a), 7);
}

/// Scenario 4: fill the heap exactly, then collect.
///
/// `HEAP_SIZE - 2` usable words divided into 1024 equal vectors means each
/// vector's allocated chunk (header + body) is 8 words; a body of 6 words
/// (`[length, 5 elements]`) rounds up to exactly that via `real_size`. None
/// of the 1024 vectors is rooted, so a `gc_run()` afterwards must reclaim
/// everything and restore the heap to its initial one-free-block shape. The
/// free-list terminator is `HEAP_SIZE` itself, which is what the allocator's
/// exact-match splice produces once the last vector lands.
#[test]
fn scenario_4_full_heap_then_collect() {
    let mut rt = Runtime::new();
    for _ in 0..1024 {
        new_vector(&mut rt, 5, UNDEF).unwrap();
    }

    assert_eq!(rt.heap().free_list_head(), HEAP_SIZE);

    rt.gc_run();

    assert_eq!(rt.heap().free_list_head(), 2);
    assert_eq!(rt.heap().get(3), HEAP_SIZE - 2);
}

/// Scenario 5: a chain much longer than the mark stack survives via the
/// stack-overflow fallback scan.
#[test]
fn scenario_5_chain_longer_than_mark_stack_survives() {
    static EMPTY_TABLE: bluescript_rt::class::PropertyTable = bluescript_rt::class::PropertyTable {
        offset: 0,
        names: &[],
        unboxed_types: &[],
    };
    static CHAIN_CLASS: ClassDef = ClassDef {
        size: VARIABLE_LENGTH,
        start_index: 1,
        name: "Chain",
        superclass: None,
        table: EMPTY_TABLE,
        vtable: &[],
    };

    let mut rt = Runtime::new();
    let chain_len = STACK_SIZE * 3 + 1;

    let mut head = bluescript_rt::value::NULL;
    for _ in 0..chain_len {
        rt.push_root_values(&[head]);
        let index = rt.allocate_variable(&CHAIN_CLASS, 2);
        rt.pop_root_frame();
        let index = index.unwrap();
        rt.heap_mut().set(index + 1, 1);
        rt.heap_mut().set(index + 2, head.bits());
        head = ptr_to_value(index);
    }

    rt.push_root_values(&[head]);
    rt.gc_run();
    rt.pop_root_frame();

    let mut count = 0;
    let mut cursor = head;
    while cursor != bluescript_rt::value::NULL {
        assert_eq!(rt.class_of(cursor), Some(&CHAIN_CLASS));
        count += 1;
        let idx = value_to_ptr(cursor);
        cursor = Value(rt.heap().get(idx + 2));
    }
    assert_eq!(count, chain_len);
}

/// Scenario 6: a write barrier under a simulated interrupt keeps a
/// newly-referenced white object alive across the collection it occurs
/// during, and the object is reclaimed by a later collection once
/// unreferenced.
#[test]
fn scenario_6_write_barrier_under_interrupt() {
    static EMPTY_TABLE: bluescript_rt::class::PropertyTable = bluescript_rt::class::PropertyTable {
        offset: 0,
        names: &[],
        unboxed_types: &[],
    };
    static BOX_CLASS: ClassDef = ClassDef {
        size: 1,
        start_index: 0,
        name: "Box",
        superclass: None,
        table: EMPTY_TABLE,
        vtable: &[],
    };

    let mut rt = Runtime::new();

    // A rooted container and a white object it does not yet reference.
    let container = rt.allocate_object(&BOX_CLASS).unwrap();
    let container_v = ptr_to_value(container);
    rt.push_root_values(&[container_v]);

    let white = rt.allocate_object(&BOX_CLASS).unwrap();
    let white_v = ptr_to_value(white);
    let white_index = white;

    // Simulate an interrupt handler mutating the rooted container to point
    // at the white object while a collection is conceptually in flight.
    rt.interrupt_handler_start();
    rt.set_property(container_v, 0, white_v);
    rt.interrupt_handler_end();

    rt.gc_run();
    assert_eq!(rt.class_of(white_v), Some(&BOX_CLASS));
    assert_eq!(rt.get_property(container_v, 0), white_v);

    // Drop the reference and collect again: the freed block is indexed by
    // address order, so the next same-size allocation reuses exactly the
    // white object's old slot — the cheapest externally observable proof
    // that it was actually swept rather than merely left alone.
    rt.set_property(container_v, 0, UNDEF);
    rt.gc_run();
    let reused = rt.allocate_object(&BOX_CLASS).unwrap();
    assert_eq!(reused, white_index);

    rt.pop_root_frame();
}

/// Scenario 7: a type-error path is caught by `try_and_catch` and leaves
/// the runtime usable afterwards.
#[test]
fn scenario_7_type_error_path() {
    let mut rt = Runtime::new();
    let result = rt.try_and_catch(|_rt| {
        safe_to_int(float_to_value(3.0))?;
        Ok(())
    });
    assert_eq!(result, 1);
    assert!(rt.last_error_message().contains("runtime type error"));

    // Subsequent allocations and GC still work.
    let ok = rt.try_and_catch(|rt| {
        new_object(rt, &bluescript_rt::objects::OBJECT_CLASS)?;
        Ok(())
    });
    assert_eq!(ok, 0);
    rt.gc_run();
}

#[test]
fn unknown_property_raises_a_runtime_error_not_a_panic() {
    let mut rt = Runtime::new();
    let obj = new_object(&mut rt, &bluescript_rt::objects::OBJECT_CLASS).unwrap();
    let err = bluescript_rt::objects::generic::get_anyobj_property(&rt, obj, 999);
    assert!(matches!(err, Err(RuntimeError::Type { .. })));
}
