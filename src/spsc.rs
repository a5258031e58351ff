//! Split producer/consumer handles for cross-thread SPSC use
//!
//! 用于跨线程 SPSC 场景的分离式生产者/消费者句柄
//!
//! [`RingBuffer::split`] divides the buffer into a [`Producer`] carrying
//! the write-family operations and a [`Consumer`] carrying the
//! read-family operations. Each handle can move to its own thread; the
//! single-producer single-consumer discipline is then enforced by
//! ownership instead of documentation.
//!
//! [`RingBuffer::split`] 将缓冲区拆分为承载写操作族的 [`Producer`] 和
//! 承载读操作族的 [`Consumer`]。每个句柄可以移动到自己的线程；单生产者
//! 单消费者的纪律由所有权而非文档来强制执行。
//!
//! Both handles cache the opposite side's cursor and only refresh it with
//! an Acquire load when the cached view cannot satisfy the current
//! request, keeping cross-core traffic off the hot path.
//!
//! 两个句柄都会缓存对侧的游标，仅当缓存视图无法满足当前请求时才用 Acquire
//! 加载刷新，从而将跨核通信排除在热路径之外。
//!
//! No operation waits or parks. The canonical idiom on zero progress is a
//! busy poll with a yield:
//!
//! 任何操作都不会等待或挂起。零进展时的惯用做法是带让出的忙轮询：
//!
//! ```
//! use bytering::RingBuffer;
//! use std::thread;
//!
//! let (mut producer, mut consumer) = RingBuffer::with_capacity(1024).unwrap().split();
//!
//! let writer = thread::spawn(move || {
//!     for value in 0u32..10_000 {
//!         while !producer.write_value(value) {
//!             thread::yield_now();
//!         }
//!     }
//! });
//!
//! let reader = thread::spawn(move || {
//!     for expected in 0u32..10_000 {
//!         loop {
//!             if let Some(value) = consumer.read_value::<u32>() {
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

use crate::core::RingCore;
use crate::ring::{raw_mut_slice, raw_slice, NewError, ReadVector, RingBuffer, WriteVector};
use crate::shim::atomic::Ordering;
use crate::shim::sync::Arc;
use crate::values::{BundleReader, BundleWriter, ValueBundle};
use std::fmt;
use std::mem::{size_of, MaybeUninit};

impl RingBuffer {
    /// Split the buffer into its producer and consumer halves
    ///
    /// 将缓冲区拆分为生产者和消费者两半
    ///
    /// The storage is released when both halves have been dropped.
    ///
    /// 当两半都被丢弃后，存储才会被释放。
    pub fn split(self) -> (Producer, Consumer) {
        let shared = Arc::new(self.core);
        let cached_read = shared.read_pos().load(Ordering::Relaxed);
        let cached_write = shared.write_pos().load(Ordering::Relaxed);

        let producer = Producer {
            shared: shared.clone(),
            cached_read,
        };
        let consumer = Consumer {
            shared,
            cached_write,
        };

        (producer, consumer)
    }
}

/// Create an allocated ring buffer and split it in one step
///
/// 一步创建已分配的环形缓冲区并拆分
///
/// # Errors
/// Propagates [`RingBuffer::with_capacity`] errors.
///
/// # 错误
/// 透传 [`RingBuffer::with_capacity`] 的错误。
pub fn with_capacity(min_capacity: usize) -> Result<(Producer, Consumer), NewError> {
    Ok(RingBuffer::with_capacity(min_capacity)?.split())
}

/// Producer half of the ring buffer
///
/// 环形缓冲区的生产者端
///
/// Carries every write-family operation. `Send` but deliberately not
/// `Clone`: at most one producer exists per buffer.
///
/// 承载所有写操作族。实现 `Send` 但刻意不实现 `Clone`：
/// 每个缓冲区最多存在一个生产者。
pub struct Producer {
    /// Shared core
    ///
    /// 共享核心
    shared: Arc<RingCore>,

    /// Cached read cursor, refreshed on demand
    ///
    /// 缓存的读游标，按需刷新
    cached_read: usize,
}

/// Consumer half of the ring buffer
///
/// 环形缓冲区的消费者端
pub struct Consumer {
    /// Shared core
    ///
    /// 共享核心
    shared: Arc<RingCore>,

    /// Cached write cursor, refreshed on demand
    ///
    /// 缓存的写游标，按需刷新
    cached_write: usize,
}

impl Producer {
    /// The buffer capacity in bytes
    ///
    /// 缓冲区容量（字节）
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Whether the buffer has allocated storage
    ///
    /// 缓冲区是否已分配存储
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.shared.is_allocated()
    }

    /// Free space available for writing, in bytes. Accurate on this side.
    ///
    /// 可用于写入的空闲空间（字节）。在本端准确。
    #[inline]
    pub fn free_space(&self) -> usize {
        self.shared.free_space()
    }

    /// Whether the buffer is full. Accurate on this side.
    ///
    /// 缓冲区是否已满。在本端准确。
    #[inline]
    pub fn is_full(&self) -> bool {
        self.shared.is_full()
    }

    /// Write items and advance the write position
    ///
    /// 写入条目并推进写位置
    ///
    /// Semantics match [`RingBuffer::write`]: whole items only, and with
    /// `allow_partial` false the request is all-or-nothing.
    ///
    /// 语义与 [`RingBuffer::write`] 一致：只写整数个条目，且当
    /// `allow_partial` 为 false 时请求是全有或全无的。
    pub fn write<T: Copy>(&mut self, items: &[T], allow_partial: bool) -> usize {
        let item_size = size_of::<T>();
        let capacity = self.shared.capacity();
        if items.is_empty() || item_size == 0 || capacity == 0 {
            return 0;
        }

        let write_pos = self.shared.write_pos().load(Ordering::Relaxed);
        let mut bytes_used = write_pos.wrapping_sub(self.cached_read);

        // Refresh the cached read cursor when the cached view cannot
        // satisfy the full request. A cache that lags behind commits made
        // through the vector interface shows an impossible usage above
        // capacity; that also forces a refresh.
        // 当缓存视图无法满足完整请求时刷新缓存的读游标。若缓存落后于通过
        // 向量接口完成的提交，会表现为超出容量的不可能用量，同样强制刷新。
        if bytes_used > capacity || (capacity - bytes_used) / item_size < items.len() {
            self.cached_read = self.shared.read_pos().load(Ordering::Acquire);
            bytes_used = write_pos.wrapping_sub(self.cached_read);
        }

        let items_free = (capacity - bytes_used) / item_size;
        if items_free == 0 || (items_free < items.len() && !allow_partial) {
            return 0;
        }

        let items_to_write = items_free.min(items.len());
        let bytes_to_write = items_to_write * item_size;

        // SAFETY: bytes_to_write <= bytes_free; this is the only producer
        unsafe {
            self.shared
                .copy_in(write_pos, items.as_ptr() as *const u8, bytes_to_write);
        }

        self.shared
            .write_pos()
            .store(write_pos.wrapping_add(bytes_to_write), Ordering::Release);

        items_to_write
    }

    /// Write one value; false if insufficient space
    ///
    /// 写入一个值；空间不足时返回 false
    pub fn write_value<T: Copy>(&mut self, value: T) -> bool {
        let item_size = size_of::<T>();
        let capacity = self.shared.capacity();
        if item_size == 0 || capacity == 0 {
            return false;
        }

        let write_pos = self.shared.write_pos().load(Ordering::Relaxed);
        let mut bytes_used = write_pos.wrapping_sub(self.cached_read);

        if bytes_used > capacity || capacity - bytes_used < item_size {
            self.cached_read = self.shared.read_pos().load(Ordering::Acquire);
            bytes_used = write_pos.wrapping_sub(self.cached_read);
            if capacity - bytes_used < item_size {
                return false;
            }
        }

        // SAFETY: item_size <= bytes_free; this is the only producer
        unsafe {
            self.shared
                .copy_in(write_pos, &value as *const T as *const u8, item_size);
        }

        self.shared
            .write_pos()
            .store(write_pos.wrapping_add(item_size), Ordering::Release);

        true
    }

    /// Write a tuple of values as one unit; all-or-nothing
    ///
    /// 将一个值元组作为整体写入；全有或全无
    pub fn write_values<V: ValueBundle>(&mut self, values: V) -> bool {
        let ((front_ptr, front_len), (back_ptr, back_len)) = self.shared.write_segments();
        if front_len + back_len < V::TOTAL_SIZE {
            return false;
        }

        // SAFETY: the free segments are written by this producer only
        let (front, back) =
            unsafe { (raw_mut_slice(front_ptr, front_len), raw_mut_slice(back_ptr, back_len)) };
        let mut writer = BundleWriter::new(front, back);
        values.write_to(&mut writer);

        self.shared.commit_write(V::TOTAL_SIZE);
        true
    }

    /// The current writable space as two contiguous segments
    ///
    /// 以两个连续段表示的当前可写空间
    pub fn write_vector(&mut self) -> WriteVector<'_> {
        let ((front_ptr, front_len), (back_ptr, back_len)) = self.shared.write_segments();
        // SAFETY: the free segments are written by this producer only
        unsafe {
            WriteVector {
                front: raw_mut_slice(front_ptr, front_len),
                back: raw_mut_slice(back_ptr, back_len),
            }
        }
    }

    /// Publish `count` bytes staged through [`write_vector`](Self::write_vector)
    ///
    /// 发布通过 [`write_vector`](Self::write_vector) 暂存的 `count` 字节
    pub fn commit_write(&mut self, count: usize) {
        self.shared.commit_write(count)
    }
}

impl Consumer {
    /// The buffer capacity in bytes
    ///
    /// 缓冲区容量（字节）
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Whether the buffer has allocated storage
    ///
    /// 缓冲区是否已分配存储
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.shared.is_allocated()
    }

    /// Bytes available for reading. Accurate on this side.
    ///
    /// 可读取的字节数。在本端准确。
    #[inline]
    pub fn available_bytes(&self) -> usize {
        self.shared.available_bytes()
    }

    /// Whether the buffer is empty. Accurate on this side.
    ///
    /// 缓冲区是否为空。在本端准确。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shared.is_empty()
    }

    /// Read items and advance the read position
    ///
    /// 读取条目并推进读位置
    pub fn read<T: Copy>(&mut self, items: &mut [T], allow_partial: bool) -> usize {
        let item_size = size_of::<T>();
        let capacity = self.shared.capacity();
        if items.is_empty() || item_size == 0 || capacity == 0 {
            return 0;
        }

        let read_pos = self.shared.read_pos().load(Ordering::Relaxed);
        let mut bytes_used = self.cached_write.wrapping_sub(read_pos);

        // Skip, drain and commit_read can move the read cursor past the
        // cached write cursor; the impossible usage above capacity marks
        // the cache stale, exactly as on the producer side.
        // skip、drain 和 commit_read 可能使读游标越过缓存的写游标；
        // 超出容量的不可能用量标记缓存已过期，与生产者端完全一致。
        if bytes_used > capacity || bytes_used / item_size < items.len() {
            self.cached_write = self.shared.write_pos().load(Ordering::Acquire);
            bytes_used = self.cached_write.wrapping_sub(read_pos);
        }

        let items_available = bytes_used / item_size;
        if items_available == 0 || (items_available < items.len() && !allow_partial) {
            return 0;
        }

        let items_to_read = items_available.min(items.len());
        let bytes_to_read = items_to_read * item_size;

        // SAFETY: bytes_to_read <= bytes_used; this is the only consumer
        unsafe {
            self.shared
                .copy_out(read_pos, items.as_mut_ptr() as *mut u8, bytes_to_read);
        }

        self.shared
            .read_pos()
            .store(read_pos.wrapping_add(bytes_to_read), Ordering::Release);

        items_to_read
    }

    /// Read items without advancing the read position; all-or-nothing
    ///
    /// 读取条目但不推进读位置；全有或全无
    pub fn peek<T: Copy>(&mut self, items: &mut [T]) -> bool {
        let item_size = size_of::<T>();
        let capacity = self.shared.capacity();
        if items.is_empty() || item_size == 0 || capacity == 0 {
            return false;
        }

        let read_pos = self.shared.read_pos().load(Ordering::Relaxed);
        let mut bytes_used = self.cached_write.wrapping_sub(read_pos);

        if bytes_used > capacity || bytes_used / item_size < items.len() {
            self.cached_write = self.shared.write_pos().load(Ordering::Acquire);
            bytes_used = self.cached_write.wrapping_sub(read_pos);
            if bytes_used / item_size < items.len() {
                return false;
            }
        }

        let bytes_to_peek = items.len() * item_size;

        // SAFETY: bytes_to_peek <= bytes_used; this is the only consumer
        unsafe {
            self.shared
                .copy_out(read_pos, items.as_mut_ptr() as *mut u8, bytes_to_peek);
        }

        true
    }

    /// Read one value; `None` leaves the read position untouched
    ///
    /// 读取一个值；返回 `None` 时读位置保持不变
    pub fn read_value<T: Copy>(&mut self) -> Option<T> {
        let item_size = size_of::<T>();
        let capacity = self.shared.capacity();
        if item_size == 0 || capacity == 0 {
            return None;
        }

        let read_pos = self.shared.read_pos().load(Ordering::Relaxed);
        let mut bytes_used = self.cached_write.wrapping_sub(read_pos);

        if bytes_used > capacity || bytes_used < item_size {
            self.cached_write = self.shared.write_pos().load(Ordering::Acquire);
            bytes_used = self.cached_write.wrapping_sub(read_pos);
            if bytes_used < item_size {
                return None;
            }
        }

        let mut value = MaybeUninit::<T>::uninit();
        // SAFETY: item_size <= bytes_used; this is the only consumer
        unsafe {
            self.shared
                .copy_out(read_pos, value.as_mut_ptr() as *mut u8, item_size);
        }

        self.shared
            .read_pos()
            .store(read_pos.wrapping_add(item_size), Ordering::Release);

        // SAFETY: copy_out filled all size_of::<T>() bytes
        Some(unsafe { value.assume_init() })
    }

    /// Read one value without advancing the read position
    ///
    /// 读取一个值但不推进读位置
    pub fn peek_value<T: Copy>(&mut self) -> Option<T> {
        let item_size = size_of::<T>();
        let capacity = self.shared.capacity();
        if item_size == 0 || capacity == 0 {
            return None;
        }

        let read_pos = self.shared.read_pos().load(Ordering::Relaxed);
        let mut bytes_used = self.cached_write.wrapping_sub(read_pos);

        if bytes_used > capacity || bytes_used < item_size {
            self.cached_write = self.shared.write_pos().load(Ordering::Acquire);
            bytes_used = self.cached_write.wrapping_sub(read_pos);
            if bytes_used < item_size {
                return None;
            }
        }

        let mut value = MaybeUninit::<T>::uninit();
        // SAFETY: item_size <= bytes_used; this is the only consumer
        unsafe {
            self.shared
                .copy_out(read_pos, value.as_mut_ptr() as *mut u8, item_size);
        }

        // SAFETY: copy_out filled all size_of::<T>() bytes
        Some(unsafe { value.assume_init() })
    }

    /// Read a tuple of values as one unit; `None` leaves the read position untouched
    ///
    /// 将一个值元组作为整体读取；返回 `None` 时读位置保持不变
    pub fn read_values<V: ValueBundle>(&mut self) -> Option<V> {
        let values = self.peek_values::<V>()?;
        self.shared.commit_read(V::TOTAL_SIZE);
        Some(values)
    }

    /// Read a tuple of values without advancing the read position
    ///
    /// 读取一个值元组但不推进读位置
    pub fn peek_values<V: ValueBundle>(&mut self) -> Option<V> {
        let ((front_ptr, front_len), (back_ptr, back_len)) = self.shared.read_segments();
        if front_len + back_len < V::TOTAL_SIZE {
            return None;
        }

        // SAFETY: the used segments are read by this consumer only
        let (front, back) = unsafe { (raw_slice(front_ptr, front_len), raw_slice(back_ptr, back_len)) };
        let mut reader = BundleReader::new(front, back);
        Some(V::read_from(&mut reader))
    }

    /// Skip items, advancing the read position without copying
    ///
    /// 跳过条目，推进读位置但不进行拷贝
    pub fn skip(&mut self, item_size: usize, item_count: usize, allow_partial: bool) -> usize {
        self.shared.skip_items(item_size, item_count, allow_partial)
    }

    /// Skip `count` items of type `T`; all-or-nothing
    ///
    /// 跳过 `count` 个类型为 `T` 的条目；全有或全无
    pub fn skip_values<T: Copy>(&mut self, count: usize) -> usize {
        self.shared.skip_items(size_of::<T>(), count, false)
    }

    /// Advance the read position to the write position, emptying the buffer
    ///
    /// 将读位置推进到写位置，清空缓冲区
    pub fn drain(&mut self) -> usize {
        self.shared.drain()
    }

    /// The current readable data as two contiguous segments
    ///
    /// 以两个连续段表示的当前可读数据
    pub fn read_vector(&self) -> ReadVector<'_> {
        let ((front_ptr, front_len), (back_ptr, back_len)) = self.shared.read_segments();
        // SAFETY: the used segments are stable until this consumer commits
        unsafe {
            ReadVector {
                front: raw_slice(front_ptr, front_len),
                back: raw_slice(back_ptr, back_len),
            }
        }
    }

    /// Release `count` bytes consumed through [`read_vector`](Self::read_vector)
    ///
    /// 释放通过 [`read_vector`](Self::read_vector) 消费的 `count` 字节
    pub fn commit_read(&mut self, count: usize) {
        self.shared.commit_read(count)
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Producer { .. }")
    }
}

impl fmt::Debug for Consumer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Consumer { .. }")
    }
}
