//! # bytering - Lock-Free SPSC Byte Ring Buffer
//!
//! bytering - 无锁 SPSC 字节环形缓冲区
//!
//! `bytering` streams raw bytes between exactly one producer and one consumer
//! without locks or allocation on the hot path. It is built for realtime audio
//! I/O, low-latency interthread byte pipes, and decoupling a latency-sensitive
//! producer from a batch-oriented consumer.
//!
//! `bytering` 在恰好一个生产者和一个消费者之间流式传输原始字节，热路径上
//! 无锁且无内存分配。它为实时音频 I/O、低延迟的线程间字节管道，以及将延迟
//! 敏感的生产者与面向批处理的消费者解耦而构建。
//!
//! ## Modules
//!
//! 模块
//!
//! - **[`ring`]** - The owned [`RingBuffer`]: storage lifecycle, bulk copy, zero-copy
//!   vectors, discard operations and the typed convenience layer on `&mut self`
//! - **[`spsc`]** - Split [`Producer`]/[`Consumer`] handles for cross-thread use
//! - **[`values`]** - The [`ValueBundle`] tuple transport used by the `*_values` operations
//!
//! - **[`ring`]** - 自有的 [`RingBuffer`]：存储生命周期、批量拷贝、零拷贝向量、
//!   丢弃操作和基于 `&mut self` 的类型便利层
//! - **[`spsc`]** - 用于跨线程场景的分离式 [`Producer`]/[`Consumer`] 句柄
//! - **[`values`]** - `*_values` 操作使用的 [`ValueBundle`] 元组传输
//!
//! ## Features
//!
//! 特性
//!
//! - **Lock-Free & Wait-Free** - Both sides complete every operation in bounded work
//! - **Free-Running Indices** - Full power-of-two capacity usable; no wasted slot
//! - **Zero Copy** - The vector interface exposes the ring's two contiguous segments directly
//! - **Whole-Item Semantics** - Bulk operations transfer an integral number of items or none
//! - **Cache-Line Padded Cursors** - The two atomic cursors never share a cache line
//!
//! - **无锁且无等待** - 两端的每个操作都在有界工作量内完成
//! - **自由递增索引** - 2 的幂次容量可全部使用；不浪费槽位
//! - **零拷贝** - 向量接口直接暴露环的两个连续段
//! - **整条目语义** - 批量操作要么传输整数个条目，要么不传输
//! - **缓存行填充的游标** - 两个原子游标永不共享缓存行
//!
//! ## Quick Start
//!
//! 快速开始
//!
//! ### Owned buffer - single thread
//!
//! 自有缓冲区 - 单线程
//!
//! ```rust
//! use bytering::RingBuffer;
//!
//! let mut rb = RingBuffer::with_capacity(100).unwrap();
//! // Capacity is rounded up to a power of two
//! // 容量向上取整到 2 的幂次
//! assert_eq!(rb.capacity(), 128);
//!
//! assert_eq!(rb.write(&[1u8, 2, 3, 4], true), 4);
//!
//! let mut out = [0u8; 4];
//! assert_eq!(rb.read(&mut out, true), 4);
//! assert_eq!(out, [1, 2, 3, 4]);
//! ```
//!
//! ### Split handles - two threads
//!
//! 分离句柄 - 两个线程
//!
//! ```rust
//! use bytering::RingBuffer;
//! use std::thread;
//!
//! let (mut producer, mut consumer) = RingBuffer::with_capacity(4096).unwrap().split();
//!
//! let writer = thread::spawn(move || {
//!     for value in 0u64..1_000 {
//!         while !producer.write_value(value) {
//!             thread::yield_now();
//!         }
//!     }
//! });
//!
//! let reader = thread::spawn(move || {
//!     for expected in 0u64..1_000 {
//!         loop {
//!             if let Some(value) = consumer.read_value::<u64>() {
//!                 assert_eq!(value, expected);
//!                 break;
//!             }
//!             thread::yield_now();
//!         }
//!     }
//! });
//!
//! writer.join().unwrap();
//! reader.join().unwrap();
//! ```
//!
//! ### Zero-copy writes
//!
//! 零拷贝写入
//!
//! The vector interface hands out the free region as two contiguous slices in
//! physical order, so a caller can fill the ring directly (say, from a socket)
//! and publish with a single commit - even across the wrap boundary, with no
//! intermediate copy.
//!
//! 向量接口按物理顺序将空闲区域作为两个连续切片交出，调用者可以直接填充环
//! （例如从套接字读取）并用一次提交发布——即使跨越环绕边界也无需中间拷贝。
//!
//! ```rust
//! use bytering::RingBuffer;
//!
//! let mut rb = RingBuffer::with_capacity(64).unwrap();
//!
//! let staged = {
//!     let vector = rb.write_vector();
//!     vector.front[..8].copy_from_slice(b"zerocopy");
//!     8
//! };
//! rb.commit_write(staged);
//!
//! let mut out = [0u8; 8];
//! assert_eq!(rb.read(&mut out, false), 8);
//! assert_eq!(&out, b"zerocopy");
//! ```
//!
//! ## Choosing Between the Owned Buffer and Split Handles
//!
//! 在自有缓冲区和分离句柄之间选择
//!
//! | Feature | `RingBuffer` | `Producer` / `Consumer` |
//! |---------|--------------|-------------------------|
//! | Use case | Single-thread staging, tests | Cross-thread SPSC pipe |
//! | Access | `&mut self`, whole surface | One side's operations per handle |
//! | Lifecycle | `allocate` / `deallocate` / `reset` | Fixed after `split` |
//! | Cursor caching | None needed | Cached opposite cursor, refresh on demand |
//!
//! | 特性 | `RingBuffer` | `Producer` / `Consumer` |
//! |------|--------------|-------------------------|
//! | 使用场景 | 单线程暂存、测试 | 跨线程 SPSC 管道 |
//! | 访问方式 | `&mut self`，完整操作面 | 每个句柄承载一侧的操作 |
//! | 生命周期 | `allocate` / `deallocate` / `reset` | `split` 之后固定 |
//! | 游标缓存 | 无需 | 缓存对侧游标，按需刷新 |
//!
//! ## Important Notes
//!
//! 重要注意事项
//!
//! - **Capacity rounding** - Capacities are rounded up to the next power of two;
//!   the whole power of two is usable, and `capacity()` reports it.
//! - **Byte transport contract** - The typed layer moves raw object bytes of
//!   [`Copy`] types. A value must be read back with the same type it was written
//!   as; the buffer never invokes constructors, destructors or assignment.
//! - **Accuracy sides** - `free_space`/`is_full` are accurate on the producer
//!   side, `available_bytes`/`is_empty` on the consumer side. Observations from
//!   the opposite side are safe but may lag (never overestimate).
//! - **No blocking** - A full buffer makes writes return a short count, an empty
//!   buffer does the same for reads. Backpressure is the caller's business; the
//!   canonical idiom is a busy poll with [`std::thread::yield_now`].
//!
//! - **容量取整** - 容量向上取整到下一个 2 的幂次；整个 2 的幂次都可使用，
//!   `capacity()` 报告该值。
//! - **字节传输契约** - 类型层移动 [`Copy`] 类型的原始对象字节。值必须以写入
//!   时的类型读回；缓冲区从不调用构造、析构或赋值。
//! - **准确性所在端** - `free_space`/`is_full` 在生产者端准确，
//!   `available_bytes`/`is_empty` 在消费者端准确。来自对侧的观察是安全的，
//!   但可能滞后（绝不会高估）。
//! - **不阻塞** - 缓冲区满时写入返回短计数，空时读取同样如此。背压由调用者
//!   负责；惯用做法是配合 [`std::thread::yield_now`] 的忙轮询。
//!
//! ## Safety Guarantees
//!
//! 安全保证
//!
//! - **FIFO bytewise order** - Bytes are readable only in the order they were written.
//! - **Happens-before** - Release/Acquire on the cursors orders the producer's
//!   byte stores before the consumer's loads of the same bytes.
//! - **Role discipline by ownership** - After `split`, the type system makes a
//!   second producer or consumer unrepresentable.
//!
//! - **按字节的 FIFO 顺序** - 字节只能按写入顺序读出。
//! - **先行发生关系** - 游标上的 Release/Acquire 使生产者的字节存储先于消费者
//!   对相同字节的加载。
//! - **所有权实现的角色纪律** - `split` 之后，类型系统使第二个生产者或消费者
//!   无法表示。

// Public modules
// 公开模块
pub mod ring;
pub mod spsc;
pub mod values;

// Internal modules
// 内部模块
mod core;
mod shim;
mod storage;

// Re-exports for convenience
// 便捷的重新导出
pub use crate::core::{MAX_CAPACITY, MIN_CAPACITY};
pub use ring::{NewError, ReadVector, RingBuffer, WriteVector};
pub use spsc::{Consumer, Producer};
pub use values::ValueBundle;

/// Prelude module with commonly used types
///
/// 包含常用类型的 prelude 模块
///
/// ```rust
/// use bytering::prelude::*;
///
/// let (mut producer, mut consumer) = RingBuffer::with_capacity(64).unwrap().split();
/// producer.write_value(1u8);
/// assert_eq!(consumer.read_value::<u8>(), Some(1));
/// ```
pub mod prelude {
    pub use crate::ring::{NewError, ReadVector, RingBuffer, WriteVector};
    pub use crate::spsc::{Consumer, Producer};
    pub use crate::values::ValueBundle;
    pub use crate::{MAX_CAPACITY, MIN_CAPACITY};
}
