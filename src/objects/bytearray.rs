//! Byte arrays: unsigned 8-bit elements packed four to a heap word.
//!
//! A C-style cast of `&body[2]` to `uint8_t*` would need `unsafe` in Rust;
//! this module gets the same packed layout (`body[0]` = word count,
//! `body[1]` = element count, `body[2..]` = four bytes per word,
//! little-endian within the word) through shifting instead. Grounded on
//! `gc_new_bytearray_base`/`gc_new_bytearray`/`gc_bytearray_length`/
//! `gc_bytearray_get`.

use super::BYTE_ARRAY_CLASS;
use crate::error::RtResult;
use crate::runtime::Runtime;
use crate::value::{ptr_to_value, Value};

fn word_count(n: u32) -> u32 {
    (n + 3) / 4
}

fn new_base(rt: &mut Runtime, n: i32) -> RtResult<(u32, u32)> {
    let n = n.max(0) as u32;
    let m = word_count(n);
    let index = rt.allocate_variable(&BYTE_ARRAY_CLASS, m + 1)?;
    rt.heap_mut().set(index + 1, m);
    rt.heap_mut().set(index + 2, n);
    for w in 0..m {
        rt.heap_mut().set(index + 3 + w, 0);
    }
    Ok((index, n))
}

fn byte_slot(index: u32, idx: u32) -> (u32, u32) {
    (index + 3 + idx / 4, (idx % 4) * 8)
}

fn read_byte(rt: &Runtime, index: u32, idx: u32) -> u8 {
    let (word, shift) = byte_slot(index, idx);
    ((rt.heap().get(word) >> shift) & 0xff) as u8
}

fn write_byte(rt: &mut Runtime, index: u32, idx: u32, value: u8) {
    let (word, shift) = byte_slot(index, idx);
    let mask = !(0xffu32 << shift);
    let current = rt.heap().get(word);
    rt.heap_mut()
        .set(word, (current & mask) | ((value as u32) << shift));
}

/// `gc_new_bytearray`.
pub fn new_bytearray(rt: &mut Runtime, n: i32, init_value: i32) -> RtResult<Value> {
    let (index, n) = new_base(rt, n)?;
    let v = (init_value & 0xff) as u8;
    for i in 0..n {
        write_byte(rt, index, i, v);
    }
    Ok(ptr_to_value(index))
}

/// `gc_make_bytearray`, generalised to a slice.
pub fn with_bytearray_elements(rt: &mut Runtime, elements: &[u8]) -> RtResult<Value> {
    let (index, _) = new_base(rt, elements.len() as i32)?;
    for (i, &b) in elements.iter().enumerate() {
        write_byte(rt, index, i as u32, b);
    }
    Ok(ptr_to_value(index))
}

/// `gc_bytearray_length`: the size in bytes, body word 1.
pub fn bytearray_length(rt: &Runtime, obj: Value) -> i32 {
    rt.get_int_property(obj, 1)
}

pub fn bytearray_get(rt: &Runtime, obj: Value, idx: i32) -> RtResult<u8> {
    let len = bytearray_length(rt, obj);
    if !(0 <= idx && idx < len) {
        return Err(crate::error::RuntimeError::index_error(
            idx,
            len,
            "ByteArray.get/set",
        ));
    }
    let index = crate::value::value_to_ptr(obj);
    Ok(read_byte(rt, index, idx as u32))
}

pub fn bytearray_set(rt: &mut Runtime, obj: Value, idx: i32, value: i32) -> RtResult<u8> {
    let len = bytearray_length(rt, obj);
    if !(0 <= idx && idx < len) {
        return Err(crate::error::RuntimeError::index_error(
            idx,
            len,
            "ByteArray.get/set",
        ));
    }
    let index = crate::value::value_to_ptr(obj);
    let v = (value & 0xff) as u8;
    write_byte(rt, index, idx as u32, v);
    Ok(v)
}
