//! Root-set discipline: a LIFO stack of per-frame root arrays.
//!
//! Every call that roots a value does so on entry and unroots it on exit, a
//! well-nested push/pop contract, and per §4.R "nested frames chain freely".
//! [`RootFrame`] is therefore a plain handle carrying only the frame's index
//! in the stack, not a borrow of [`RootStack`] itself: holding one never
//! prevents pushing another, or making any other call on the stack (or the
//! owning `Runtime`) while it is live. There is no `Drop` impl; a frame is
//! unrooted by passing its handle back to [`RootStack::pop_frame`], mirroring
//! the explicit `ROOT_SET`/`DELETE_ROOT_SET` pairing instead of trying to
//! recreate it through RAII. No self-referential pointers, no `unsafe`.

use crate::value::{Value, UNDEF};
use alloc::vec::Vec;

/// A handle to a pushed root frame: its index in the stack at push time.
/// Carries no borrow of the [`RootStack`], so it can be held across further
/// pushes, other frames' lifetimes, or any allocating/collecting call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootFrame(usize);

/// The LIFO stack of root frames a [`crate::runtime::Runtime`] owns.
#[derive(Default)]
pub struct RootStack {
    frames: Vec<Vec<Value>>,
}

impl RootStack {
    pub fn new() -> Self {
        RootStack { frames: Vec::new() }
    }

    /// Open a new frame of `length` slots, all initialised to [`UNDEF`], and
    /// push it. Returns a handle to address this frame's slots and to later
    /// pop it; frames may be pushed arbitrarily deep before being popped,
    /// provided pops happen LIFO (see [`RootStack::pop_frame`]).
    pub fn push_frame(&mut self, length: usize) -> RootFrame {
        self.frames.push(vec_of_undef(length));
        RootFrame(self.frames.len() - 1)
    }

    /// Write root slot `index` of `frame`.
    pub fn set(&mut self, frame: RootFrame, index: usize, value: Value) {
        self.frames[frame.0][index] = value;
    }

    /// Read root slot `index` of `frame`.
    pub fn get(&self, frame: RootFrame, index: usize) -> Value {
        self.frames[frame.0][index]
    }

    /// Number of slots in `frame`.
    pub fn frame_len(&self, frame: RootFrame) -> usize {
        self.frames[frame.0].len()
    }

    /// Pop `frame`. Frames must be popped LIFO, well-nested, exactly as
    /// `DELETE_ROOT_SET` unlinks its frame from the head of the list; popping
    /// anything but the current top is a usage bug, not a recoverable error.
    pub fn pop_frame(&mut self, frame: RootFrame) {
        assert_eq!(
            frame.0,
            self.frames.len() - 1,
            "root frames must be popped LIFO"
        );
        self.frames.pop();
    }

    /// Iterate every root slot across every live frame, in no particular
    /// order — the collector only needs the set of values, not the frame
    /// structure.
    pub fn iter_values(&self) -> impl Iterator<Item = Value> + '_ {
        self.frames.iter().flat_map(|frame| frame.iter().copied())
    }

    /// Push a frame whose slots are pre-filled with `values`. Paired with
    /// [`RootStack::pop`] by the caller — the constructor-internal shorthand
    /// for "root these values, make one allocating call, unroot them" where
    /// the frame's contents are known upfront and a handle isn't needed.
    pub(crate) fn push_values(&mut self, values: &[Value]) {
        self.frames.push(values.to_vec());
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }
}

fn vec_of_undef(length: usize) -> Vec<Value> {
    let mut v = Vec::with_capacity(length);
    v.resize(length, UNDEF);
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::int_to_value;

    #[test]
    fn frame_slots_start_undef_and_are_well_nested() {
        let mut roots = RootStack::new();
        let outer = roots.push_frame(2);
        assert_eq!(roots.get(outer, 0), UNDEF);
        roots.set(outer, 0, int_to_value(1));

        let inner = roots.push_frame(1);
        roots.set(inner, 0, int_to_value(2));
        assert_eq!(roots.iter_values().count(), 3);

        roots.pop_frame(inner);
        assert_eq!(roots.iter_values().count(), 2);

        roots.pop_frame(outer);
        assert_eq!(roots.iter_values().count(), 0);
    }

    #[test]
    fn frames_can_nest_while_the_outer_handle_stays_live() {
        let mut roots = RootStack::new();
        let outer = roots.push_frame(1);
        roots.set(outer, 0, int_to_value(10));

        // Pushing and popping further frames, and reading `outer`'s slot,
        // must all be possible while `outer` is still unpopped — the defect
        // the borrow-holding `Drop` guard made impossible.
        for i in 0..5 {
            let inner = roots.push_frame(1);
            roots.set(inner, 0, int_to_value(i));
            assert_eq!(roots.get(outer, 0), int_to_value(10));
            roots.pop_frame(inner);
        }

        assert_eq!(roots.frame_len(outer), 1);
        roots.pop_frame(outer);
        assert_eq!(roots.iter_values().count(), 0);
    }

    #[test]
    #[should_panic(expected = "LIFO")]
    fn popping_out_of_order_panics() {
        let mut roots = RootStack::new();
        let outer = roots.push_frame(1);
        let _inner = roots.push_frame(1);
        roots.pop_frame(outer);
    }
}
