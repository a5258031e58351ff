#![cfg(not(feature = "loom"))]

//! Property tests for the ring buffer invariants.

use bytering::RingBuffer;
use proptest::prelude::*;
use std::collections::VecDeque;

/// One step of an interleaved producer/consumer schedule.
#[derive(Debug, Clone)]
enum Op {
    Write(Vec<u8>),
    Read(usize),
    Peek(usize),
    Skip(usize),
    Drain,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => proptest::collection::vec(any::<u8>(), 0..48).prop_map(Op::Write),
        4 => (0usize..48).prop_map(Op::Read),
        1 => (1usize..16).prop_map(Op::Peek),
        1 => (0usize..16).prop_map(Op::Skip),
        1 => Just(Op::Drain),
    ]
}

proptest! {
    /// The byte sequence read equals the byte sequence written, in order,
    /// for any single-threaded interleaving of operations.
    #[test]
    fn fifo_byte_order(ops in proptest::collection::vec(op_strategy(), 1..64)) {
        let mut rb = RingBuffer::with_capacity(32).unwrap();
        let mut model: VecDeque<u8> = VecDeque::new();

        for op in ops {
            match op {
                Op::Write(data) => {
                    let free_before = rb.free_space();
                    let written = rb.write(&data[..], true);
                    prop_assert_eq!(written, data.len().min(free_before));
                    model.extend(&data[..written]);
                }
                Op::Read(count) => {
                    let mut out = vec![0u8; count];
                    let read = rb.read(&mut out[..], true);
                    prop_assert_eq!(read, count.min(model.len()));
                    for byte in &out[..read] {
                        prop_assert_eq!(*byte, model.pop_front().unwrap());
                    }
                }
                Op::Peek(count) => {
                    let mut out = vec![0u8; count];
                    let available = rb.available_bytes();
                    let peeked = rb.peek(&mut out[..]);
                    prop_assert_eq!(peeked, count <= model.len());
                    // Peeking never advances
                    prop_assert_eq!(rb.available_bytes(), available);
                    if peeked {
                        for (i, byte) in out.iter().enumerate() {
                            prop_assert_eq!(*byte, model[i]);
                        }
                    }
                }
                Op::Skip(count) => {
                    let skipped = rb.skip(1, count, true);
                    prop_assert_eq!(skipped, count.min(model.len()).min(rb.capacity()));
                    for _ in 0..skipped {
                        model.pop_front();
                    }
                }
                Op::Drain => {
                    let drained = rb.drain();
                    prop_assert_eq!(drained, model.len());
                    model.clear();
                }
            }

            // Used plus free always covers the whole allocation
            prop_assert_eq!(rb.available_bytes() + rb.free_space(), rb.capacity());
            prop_assert_eq!(rb.available_bytes(), model.len());
        }
    }

    /// Allocation rounds up to a power of two at least as large as the
    /// request and produces an empty buffer.
    #[test]
    fn allocate_postconditions(min_capacity in 2usize..(1 << 20)) {
        let mut rb = RingBuffer::new();
        prop_assert!(rb.allocate(min_capacity));
        let capacity = rb.capacity();
        prop_assert!(capacity.is_power_of_two());
        prop_assert!(capacity >= min_capacity);
        prop_assert!(capacity < 2 * min_capacity);
        prop_assert!(rb.is_empty());
        prop_assert_eq!(rb.free_space(), capacity);
    }

    /// With partials disallowed, a write transfers everything or nothing.
    #[test]
    fn write_is_all_or_nothing(
        prefill in 0usize..64,
        data in proptest::collection::vec(any::<u8>(), 1..64),
    ) {
        let mut rb = RingBuffer::with_capacity(64).unwrap();
        let junk = vec![0xEEu8; prefill];
        rb.write(&junk[..], true);

        let free = rb.free_space();
        let written = rb.write(&data[..], false);
        if data.len() <= free {
            prop_assert_eq!(written, data.len());
        } else {
            prop_assert_eq!(written, 0);
            prop_assert_eq!(rb.available_bytes(), prefill.min(64));
        }
    }

    /// Typed round trip through the bundle layer.
    #[test]
    fn value_bundle_roundtrip(a in any::<u8>(), b in any::<u16>(), c in any::<u32>(), d in any::<u64>(), e in any::<i32>()) {
        let mut rb = RingBuffer::with_capacity(64).unwrap();
        prop_assert!(rb.write_values((a, b, c, d, e)));
        let out = rb.read_values::<(u8, u16, u32, u64, i32)>().unwrap();
        prop_assert_eq!(out, (a, b, c, d, e));
        prop_assert!(rb.is_empty());
    }

    /// Staging through the write vector and committing makes exactly the
    /// committed bytes readable, wherever the wrap boundary sits.
    #[test]
    fn vector_commit_roundtrip(park in 0usize..32, data in proptest::collection::vec(any::<u8>(), 0..32)) {
        let mut rb = RingBuffer::with_capacity(32).unwrap();
        // Park the cursors at an arbitrary physical offset
        let junk = vec![0u8; park];
        rb.write(&junk[..], true);
        rb.skip(1, park, true);

        {
            let vector = rb.write_vector();
            let front_take = data.len().min(vector.front.len());
            vector.front[..front_take].copy_from_slice(&data[..front_take]);
            vector.back[..data.len() - front_take].copy_from_slice(&data[front_take..]);
        }
        rb.commit_write(data.len());
        prop_assert_eq!(rb.available_bytes(), data.len());

        let mut out = vec![0u8; data.len()];
        prop_assert_eq!(rb.read(&mut out[..], false), data.len());
        prop_assert_eq!(out, data);
    }
}
