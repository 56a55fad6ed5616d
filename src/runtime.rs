//! The `Runtime`: the heap, the collector, the root-frame stack, the
//! interrupt nesting counter, the error buffer, and the host-pointer
//! interning tables, bundled into one value constructed once per program via
//! [`Runtime::new`]. Keeping these as separate mutable statics would make
//! touching any of them `unsafe`; bundling them into one struct threaded
//! through `&mut Runtime` keeps the whole crate in safe Rust.

use crate::class::{ClassDef, Method};
use crate::error::{try_and_catch as catch_body, ErrorBuffer, RtResult, RuntimeError};
use crate::heap::gc::Collector;
use crate::heap::{Header, Heap};
use crate::intern::Table;
use crate::roots::{RootFrame, RootStack};
use crate::interrupt::InterruptNesting;
use crate::value::{is_ptr_value, value_to_ptr, Value, NULL};

/// Bundles the heap, the collector, the root-frame stack, the interrupt
/// nesting counter, and the three host-pointer interning tables. A host's
/// `main`/event-loop constructs exactly one of these; the design assumes a
/// single mutator thread and forbids running more than one concurrently.
pub struct Runtime {
    heap: Heap,
    gc: Collector,
    roots: RootStack,
    interrupt: InterruptNesting,
    errors: ErrorBuffer,
    classes: Table<&'static ClassDef>,
    strings: Table<&'static str>,
    functions: Table<Method>,
}

impl Runtime {
    /// Equivalent of `gc_initialize()`: a fresh heap, root stack, and
    /// interning tables, with no interrupt handler active.
    pub fn new() -> Self {
        Runtime {
            heap: Heap::new(),
            gc: Collector::new(),
            roots: RootStack::new(),
            interrupt: InterruptNesting::new(),
            errors: ErrorBuffer::new(),
            classes: Table::new(),
            strings: Table::new(),
            functions: Table::new(),
        }
    }

    // -- root frames ---------------------------------------------------

    /// Open a root frame of `length` slots. Returns a handle carrying only
    /// its index in the stack, not a borrow of `self`, so it can be held
    /// across further `&mut self` calls — including allocations that may
    /// trigger a collection, and further nested `push_frame` calls — until
    /// it is closed with [`Runtime::pop_frame`].
    pub fn push_frame(&mut self, length: usize) -> RootFrame {
        self.roots.push_frame(length)
    }

    /// Write root slot `index` of `frame`.
    pub fn set_root(&mut self, frame: RootFrame, index: usize, value: Value) {
        self.roots.set(frame, index, value);
    }

    /// Read root slot `index` of `frame`.
    pub fn get_root(&self, frame: RootFrame, index: usize) -> Value {
        self.roots.get(frame, index)
    }

    /// Close `frame`. Frames must be popped LIFO, innermost first.
    pub fn pop_frame(&mut self, frame: RootFrame) {
        self.roots.pop_frame(frame);
    }

    /// Push a frame pre-filled with `values`, the constructor-internal
    /// shorthand for "root these values, make one allocating call, unroot
    /// them" where the frame's contents are known upfront. Paired with
    /// [`Runtime::pop_root_frame`].
    pub fn push_root_values(&mut self, values: &[Value]) {
        self.roots.push_values(values);
    }

    /// Pop the most recently pushed frame. Must be paired 1:1 with
    /// [`Runtime::push_root_values`], innermost first.
    pub fn pop_root_frame(&mut self) {
        self.roots.pop();
    }

    // -- interrupt contract ----------------------------------------------

    pub fn interrupt_handler_start(&self) {
        self.interrupt.enter();
    }

    pub fn interrupt_handler_end(&self) {
        self.interrupt.exit();
    }

    // -- class metadata ---------------------------------------------------

    /// Intern `class` (idempotent: the same `&'static ClassDef` always gets
    /// the same handle) and return the handle an object header stores.
    pub fn class_handle(&mut self, class: &'static ClassDef) -> u32 {
        self.classes.intern(class as *const ClassDef as usize, class)
    }

    /// The class metadata of `value`, or `None` if it is a primitive or
    /// `NULL`.
    pub fn class_of(&self, value: Value) -> Option<&'static ClassDef> {
        if is_ptr_value(value) && value != NULL {
            let index = value_to_ptr(value);
            let handle = self.heap.header(index).class_handle();
            Some(self.classes.get(handle))
        } else {
            None
        }
    }

    /// `method_lookup`: the `index`-th vtable entry of `obj`'s class.
    pub fn method(&self, obj: Value, index: usize) -> RtResult<Method> {
        self.class_of(obj)
            .map(|class| class.method(index))
            .ok_or_else(|| RuntimeError::type_error("method_lookup on a non-object value"))
    }

    /// `is_subclass`: whether `obj`'s class is `class` or inherits from it.
    pub fn is_subclass(&self, obj: Value, class: &ClassDef) -> bool {
        self.class_of(obj).is_some_and(|c| c.is_subclass(class))
    }

    // -- native function / string interning --------------------------------

    pub fn intern_function(&mut self, key: usize, f: Method) -> u32 {
        self.functions.intern(key, f)
    }

    pub fn function_by_handle(&self, handle: u32) -> Method {
        self.functions.get(handle)
    }

    pub fn intern_string(&mut self, s: &'static str) -> u32 {
        self.strings.intern(s.as_ptr() as usize, s)
    }

    pub fn string_by_handle(&self, handle: u32) -> &'static str {
        self.strings.get(handle)
    }

    // -- allocation ---------------------------------------------------------

    /// Allocate a chunk of `body_len` body words, running the collector
    /// once and retrying on exhaustion, exactly as `allocate_heap` does.
    /// Refuses while an interrupt handler is active.
    pub fn allocate_raw(&mut self, body_len: u32) -> RtResult<u32> {
        if self.interrupt.is_active() {
            return Err(RuntimeError::allocation_error(
                "you cannot create objects in an interrupt handler.",
            ));
        }
        if let Some(index) = self.heap.allocate_base(body_len) {
            return Ok(index);
        }
        self.gc.run(&mut self.heap, &self.classes, &self.roots);
        self.heap
            .allocate_base(body_len)
            .ok_or_else(|| RuntimeError::allocation_error("memory exhausted"))
    }

    /// `gc_allocate_object`: a zero-initialised, fixed-size instance of
    /// `class`. Variable-length classes (`size < 0`) get zero body words
    /// here; the specific constructor fills in the length/element words.
    pub fn allocate_object(&mut self, class: &'static ClassDef) -> RtResult<u32> {
        let size = if class.size >= 0 { class.size as u32 } else { 0 };
        let handle = self.class_handle(class);
        let index = self.allocate_raw(size)?;
        let header = Header::new(handle, self.gc.current_no_mark);
        self.heap.set_header(index, header);
        self.heap.zero_body(index, size);
        Ok(index)
    }

    /// Allocate a variable-length instance of `class` with exactly
    /// `body_len` body words and set its header, without zero-filling the
    /// body: used by the array/vector/bytearray constructors, which always
    /// overwrite every body word themselves right after. Grounded on the
    /// shared shape of `gc_new_intarray_base`/`gc_new_bytearray_base`/
    /// `gc_new_vector`, which each call `allocate_heap` + `set_object_header`
    /// directly instead of going through `gc_allocate_object`.
    pub fn allocate_variable(&mut self, class: &'static ClassDef, body_len: u32) -> RtResult<u32> {
        let handle = self.class_handle(class);
        let index = self.allocate_raw(body_len)?;
        self.heap.set_header(index, Header::new(handle, self.gc.current_no_mark));
        Ok(index)
    }

    /// Run a full collection now (the public, on-demand equivalent of the
    /// retry path inside `allocate_raw`).
    pub fn gc_run(&mut self) {
        self.gc.run(&mut self.heap, &self.classes, &self.roots);
    }

    // -- heap word access (shared by the `objects` submodules) -------------

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// `gc_write_barrier`: call before overwriting a managed slot.
    /// `container` is the header index of the object being mutated, or
    /// `None` for a root-set slot.
    pub fn write_barrier(&mut self, container: Option<u32>, value: Value) {
        self.gc
            .write_barrier(&mut self.heap, container, value, self.interrupt.is_active());
    }

    /// `get_obj_property`: read body slot `index` of `obj`.
    pub fn get_property(&self, obj: Value, index: u32) -> Value {
        Value(self.heap.get(value_to_ptr(obj) + 1 + index))
    }

    /// `set_obj_property`: write body slot `index` of `obj`, invoking the
    /// write barrier first.
    pub fn set_property(&mut self, obj: Value, index: u32, new_value: Value) -> Value {
        let container = value_to_ptr(obj);
        self.write_barrier(Some(container), new_value);
        self.heap.set(container + 1 + index, new_value.0);
        new_value
    }

    /// `get_obj_int_property`: read body slot `index` as a raw `i32`.
    pub fn get_int_property(&self, obj: Value, index: u32) -> i32 {
        self.heap.get(value_to_ptr(obj) + 1 + index) as i32
    }

    pub fn set_int_property(&mut self, obj: Value, index: u32, value: i32) {
        let container = value_to_ptr(obj);
        self.heap.set(container + 1 + index, value as u32);
    }

    /// `get_obj_float_property`: read body slot `index` as a raw `f32`.
    pub fn get_float_property(&self, obj: Value, index: u32) -> f32 {
        f32::from_bits(self.heap.get(value_to_ptr(obj) + 1 + index))
    }

    pub fn set_float_property(&mut self, obj: Value, index: u32, value: f32) {
        let container = value_to_ptr(obj);
        self.heap.set(container + 1 + index, value.to_bits());
    }

    // -- error surface ------------------------------------------------------

    /// `try_and_catch`: run `body`, catching any [`RuntimeError`] it (or
    /// anything it calls) returns. Returns `1` on error, `0` on clean
    /// completion.
    pub fn try_and_catch(&mut self, body: impl FnOnce(&mut Runtime) -> RtResult<()>) -> i32 {
        catch_body(&mut self.errors, || body(self))
    }

    /// The message last written by [`Runtime::try_and_catch`], if any.
    pub fn last_error_message(&self) -> &str {
        self.errors.message()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
