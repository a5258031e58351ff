//! The owned byte ring buffer
//!
//! 自有的字节环形缓冲区
//!
//! [`RingBuffer`] is the single owning object: it carries the storage
//! lifecycle (allocate / deallocate / reset), the bulk copy engine, the
//! zero-copy vector interface, the discard operations and the typed
//! convenience layer, all on `&mut self`. For cross-thread use, split it
//! into a [`Producer`](crate::spsc::Producer) / [`Consumer`](crate::spsc::Consumer)
//! pair with [`RingBuffer::split`].
//!
//! [`RingBuffer`] 是单一的所有者对象：它承载存储生命周期（分配 / 释放 /
//! 重置）、批量拷贝引擎、零拷贝向量接口、丢弃操作和类型便利层，全部通过
//! `&mut self` 访问。跨线程使用时，通过 [`RingBuffer::split`] 将其拆分为
//! [`Producer`](crate::spsc::Producer) / [`Consumer`](crate::spsc::Consumer) 一对句柄。

use crate::core::{RingCore, MAX_CAPACITY, MIN_CAPACITY};
use crate::values::{BundleReader, BundleWriter, ValueBundle};
use std::fmt;
use std::mem::{size_of, MaybeUninit};
use std::slice;

/// Error returned by [`RingBuffer::with_capacity`]
///
/// [`RingBuffer::with_capacity`] 返回的错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewError {
    /// The requested capacity is outside `[MIN_CAPACITY, MAX_CAPACITY]`
    ///
    /// 请求的容量超出 `[MIN_CAPACITY, MAX_CAPACITY]`
    CapacityOutOfRange,
    /// The process allocator refused the request
    ///
    /// 进程分配器拒绝了请求
    AllocationFailed,
}

impl fmt::Display for NewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NewError::CapacityOutOfRange => write!(
                f,
                "capacity outside the supported range [{}, {}]",
                MIN_CAPACITY, MAX_CAPACITY
            ),
            NewError::AllocationFailed => write!(f, "memory allocation failed"),
        }
    }
}

impl std::error::Error for NewError {}

/// The current writable region, as up to two contiguous byte slices
///
/// 当前可写区域，由最多两个连续的字节切片表示
///
/// When the free region is contiguous, `back` is empty. When it wraps,
/// `front` ends at the end of the backing storage and `back` starts at
/// physical offset zero. Together they cover exactly the free space.
/// Fill some prefix of the region, then publish it with
/// [`RingBuffer::commit_write`].
///
/// 当空闲区域连续时，`back` 为空。当区域环绕时，`front` 止于底层存储的
/// 末尾，`back` 从物理偏移零开始。两者恰好覆盖全部空闲空间。先填充区域的
/// 某个前缀，然后用 [`RingBuffer::commit_write`] 发布。
pub struct WriteVector<'a> {
    /// First contiguous segment of free space
    ///
    /// 空闲空间的第一个连续段
    pub front: &'a mut [u8],
    /// Second contiguous segment, nonempty only when the region wraps
    ///
    /// 第二个连续段，仅在区域环绕时非空
    pub back: &'a mut [u8],
}

impl WriteVector<'_> {
    /// Total writable bytes across both segments
    ///
    /// 两段合计的可写字节数
    #[inline]
    pub fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }

    /// Whether no space is writable
    ///
    /// 是否没有可写空间
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty()
    }
}

/// The current readable region, as up to two contiguous byte slices
///
/// 当前可读区域，由最多两个连续的字节切片表示
pub struct ReadVector<'a> {
    /// First contiguous segment of readable data
    ///
    /// 可读数据的第一个连续段
    pub front: &'a [u8],
    /// Second contiguous segment, nonempty only when the region wraps
    ///
    /// 第二个连续段，仅在区域环绕时非空
    pub back: &'a [u8],
}

impl ReadVector<'_> {
    /// Total readable bytes across both segments
    ///
    /// 两段合计的可读字节数
    #[inline]
    pub fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }

    /// Whether no data is readable
    ///
    /// 是否没有可读数据
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty()
    }
}

/// A lock-free SPSC byte ring buffer
///
/// 无锁 SPSC 字节环形缓冲区
///
/// The buffer transports opaque bytes in FIFO order between one producer
/// and one consumer without locks or allocation on the hot path. Capacity
/// is always a power of two and the buffer can be filled to exactly
/// `capacity` bytes.
///
/// 缓冲区在一个生产者和一个消费者之间以 FIFO 顺序传输不透明字节，热路径上
/// 无锁且无分配。容量始终是 2 的幂次，缓冲区可以被填充到恰好 `capacity` 字节。
///
/// The type is movable but not copyable: duplicating the region would
/// silently desynchronize two consumers.
///
/// 此类型可移动但不可拷贝：复制区域会悄悄使两个消费者失去同步。
///
/// # Examples
///
/// ```
/// use bytering::RingBuffer;
///
/// let mut rb = RingBuffer::with_capacity(64).unwrap();
///
/// assert_eq!(rb.write(&[1u8, 2, 3, 4], true), 4);
/// assert_eq!(rb.available_bytes(), 4);
///
/// let mut out = [0u8; 4];
/// assert_eq!(rb.read(&mut out, true), 4);
/// assert_eq!(out, [1, 2, 3, 4]);
/// assert!(rb.is_empty());
/// ```
pub struct RingBuffer {
    pub(crate) core: RingCore,
}

impl RingBuffer {
    /// Create an empty, unallocated ring buffer
    ///
    /// 创建空的、未分配的环形缓冲区
    ///
    /// [`allocate`](Self::allocate) must succeed before the buffer can
    /// transport data; until then every operation is a no-op.
    ///
    /// 在 [`allocate`](Self::allocate) 成功之前，缓冲区无法传输数据；
    /// 在此之前每个操作都是空操作。
    pub fn new() -> Self {
        Self {
            core: RingCore::unallocated(),
        }
    }

    /// Create a ring buffer with the specified minimum capacity
    ///
    /// 创建具有指定最小容量的环形缓冲区
    ///
    /// The actual capacity is the smallest power of two not less than
    /// `min_capacity`.
    ///
    /// 实际容量是不小于 `min_capacity` 的最小 2 的幂次。
    ///
    /// # Errors
    /// [`NewError::CapacityOutOfRange`] if `min_capacity` is outside
    /// `[MIN_CAPACITY, MAX_CAPACITY]`, [`NewError::AllocationFailed`] if
    /// memory could not be obtained.
    ///
    /// # 错误
    /// 若 `min_capacity` 超出 `[MIN_CAPACITY, MAX_CAPACITY]` 则返回
    /// [`NewError::CapacityOutOfRange`]；若无法获得内存则返回
    /// [`NewError::AllocationFailed`]。
    ///
    /// # Examples
    ///
    /// ```
    /// use bytering::{NewError, RingBuffer};
    ///
    /// let rb = RingBuffer::with_capacity(100).unwrap();
    /// assert_eq!(rb.capacity(), 128);
    ///
    /// assert_eq!(RingBuffer::with_capacity(1).unwrap_err(), NewError::CapacityOutOfRange);
    /// ```
    pub fn with_capacity(min_capacity: usize) -> Result<Self, NewError> {
        if min_capacity < MIN_CAPACITY || min_capacity > MAX_CAPACITY {
            return Err(NewError::CapacityOutOfRange);
        }
        let mut buffer = Self::new();
        if !buffer.core.allocate(min_capacity) {
            return Err(NewError::AllocationFailed);
        }
        Ok(buffer)
    }

    // MARK: Buffer management
    // MARK: 缓冲区管理

    /// Allocate space for data, rounding up to a power of two
    ///
    /// 为数据分配空间，向上取整到 2 的幂次
    ///
    /// Releases any existing allocation first and zeroes both cursors.
    /// An out-of-range request returns false and leaves any existing
    /// allocation untouched; an allocator failure returns false and
    /// leaves the buffer unallocated.
    ///
    /// 先释放任何现有分配并将两个游标归零。超出范围的请求返回 false 且不
    /// 影响现有分配；分配器失败返回 false 并使缓冲区处于未分配状态。
    pub fn allocate(&mut self, min_capacity: usize) -> bool {
        self.core.allocate(min_capacity)
    }

    /// Free any space allocated for data. Idempotent.
    ///
    /// 释放为数据分配的任何空间。幂等。
    pub fn deallocate(&mut self) {
        self.core.deallocate()
    }

    /// Discard all data and zero both cursors, keeping the allocation
    ///
    /// 丢弃所有数据并将两个游标归零，保留分配
    pub fn reset(&mut self) {
        self.core.reset()
    }

    /// Whether the ring buffer has allocated space for data
    ///
    /// 环形缓冲区是否已为数据分配空间
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.core.is_allocated()
    }

    // MARK: Buffer information
    // MARK: 缓冲区信息

    /// The capacity in bytes (zero when unallocated)
    ///
    /// 容量（字节，未分配时为零）
    ///
    /// Safe and accurate from both producer and consumer.
    ///
    /// 从生产者和消费者两侧调用都安全且准确。
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// Free space available for writing, in bytes
    ///
    /// 可用于写入的空闲空间（字节）
    ///
    /// Only accurate on the producer side; elsewhere the result is a safe
    /// underestimate.
    ///
    /// 仅在生产者端准确；其他位置的结果是安全的低估值。
    #[inline]
    pub fn free_space(&self) -> usize {
        self.core.free_space()
    }

    /// Whether the buffer is full. Producer-side accurate.
    ///
    /// 缓冲区是否已满。生产者端准确。
    #[inline]
    pub fn is_full(&self) -> bool {
        self.core.is_full()
    }

    /// Bytes available for reading
    ///
    /// 可读取的字节数
    ///
    /// Only accurate on the consumer side; elsewhere the result is a safe
    /// underestimate.
    ///
    /// 仅在消费者端准确；其他位置的结果是安全的低估值。
    #[inline]
    pub fn available_bytes(&self) -> usize {
        self.core.available_bytes()
    }

    /// Whether the buffer is empty. Consumer-side accurate.
    ///
    /// 缓冲区是否为空。消费者端准确。
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    // MARK: Writing and reading data
    // MARK: 写入和读取数据

    /// Write items and advance the write position
    ///
    /// 写入条目并推进写位置
    ///
    /// Either an integral number of items is written or zero; with
    /// `allow_partial` false, fewer free slots than `items.len()` means
    /// nothing is written. Returns the number of items written. Writing
    /// zero-sized items or into an unallocated buffer is a no-op.
    ///
    /// 要么写入整数个条目，要么写入零个；当 `allow_partial` 为 false 时，
    /// 空闲槽位少于 `items.len()` 则什么也不写。返回写入的条目数。
    /// 写入零大小条目或写入未分配的缓冲区是空操作。
    pub fn write<T: Copy>(&mut self, items: &[T], allow_partial: bool) -> usize {
        self.core.write_items(
            items.as_ptr() as *const u8,
            size_of::<T>(),
            items.len(),
            allow_partial,
        )
    }

    /// Read items and advance the read position
    ///
    /// 读取条目并推进读位置
    ///
    /// Returns the number of items read into the front of `items`.
    ///
    /// 返回读入 `items` 前部的条目数。
    pub fn read<T: Copy>(&mut self, items: &mut [T], allow_partial: bool) -> usize {
        self.core.read_items(
            items.as_mut_ptr() as *mut u8,
            size_of::<T>(),
            items.len(),
            allow_partial,
        )
    }

    /// Read items without advancing the read position
    ///
    /// 读取条目但不推进读位置
    ///
    /// All-or-nothing: true only if `items` was filled completely.
    ///
    /// 全有或全无：仅当 `items` 被完全填充时返回 true。
    pub fn peek<T: Copy>(&self, items: &mut [T]) -> bool {
        self.core
            .peek_items(items.as_mut_ptr() as *mut u8, size_of::<T>(), items.len())
    }

    // MARK: Discarding data
    // MARK: 丢弃数据

    /// Skip items, advancing the read position without copying
    ///
    /// 跳过条目，推进读位置但不进行拷贝
    pub fn skip(&mut self, item_size: usize, item_count: usize, allow_partial: bool) -> usize {
        self.core.skip_items(item_size, item_count, allow_partial)
    }

    /// Skip `count` items of type `T`; all-or-nothing
    ///
    /// 跳过 `count` 个类型为 `T` 的条目；全有或全无
    pub fn skip_values<T: Copy>(&mut self, count: usize) -> usize {
        self.core.skip_items(size_of::<T>(), count, false)
    }

    /// Advance the read position to the write position, emptying the buffer
    ///
    /// 将读位置推进到写位置，清空缓冲区
    ///
    /// Returns the number of bytes discarded.
    ///
    /// 返回丢弃的字节数。
    pub fn drain(&mut self) -> usize {
        self.core.drain()
    }

    // MARK: Advanced writing and reading
    // MARK: 高级写入和读取

    /// The current writable space as two contiguous segments
    ///
    /// 以两个连续段表示的当前可写空间
    ///
    /// ```
    /// use bytering::RingBuffer;
    ///
    /// let mut rb = RingBuffer::with_capacity(16).unwrap();
    ///
    /// let vector = rb.write_vector();
    /// vector.front[..4].copy_from_slice(&[9, 9, 9, 9]);
    /// rb.commit_write(4);
    ///
    /// assert_eq!(rb.available_bytes(), 4);
    /// ```
    pub fn write_vector(&mut self) -> WriteVector<'_> {
        let ((front_ptr, front_len), (back_ptr, back_len)) = self.core.write_segments();
        // SAFETY: the segments are disjoint live regions of the backing
        // storage and &mut self excludes every other access
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
    ///
    /// `count` must not exceed the free space at the time of the call;
    /// debug builds assert, release builds desynchronize the stream.
    ///
    /// `count` 不得超过调用时的空闲空间；调试构建会断言，发布构建会使
    /// 数据流失去同步。
    pub fn commit_write(&mut self, count: usize) {
        self.core.commit_write(count)
    }

    /// The current readable data as two contiguous segments
    ///
    /// 以两个连续段表示的当前可读数据
    pub fn read_vector(&self) -> ReadVector<'_> {
        let ((front_ptr, front_len), (back_ptr, back_len)) = self.core.read_segments();
        // SAFETY: the segments are live initialized regions of the backing
        // storage; shared access is fine for reads
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
        self.core.commit_read(count)
    }

    // MARK: Writing and reading single values
    // MARK: 写入和读取单个值

    /// Write one value; false if insufficient space
    ///
    /// 写入一个值；空间不足时返回 false
    ///
    /// The value travels as raw object bytes and must be read back with
    /// the same type.
    ///
    /// 值以原始对象字节传输，必须以相同类型读回。
    ///
    /// ```
    /// use bytering::RingBuffer;
    ///
    /// let mut rb = RingBuffer::with_capacity(64).unwrap();
    /// assert!(rb.write_value(7u32));
    /// assert_eq!(rb.read_value::<u32>(), Some(7));
    /// ```
    pub fn write_value<T: Copy>(&mut self, value: T) -> bool {
        self.core
            .write_items(&value as *const T as *const u8, size_of::<T>(), 1, false)
            == 1
    }

    /// Read one value; `None` leaves the read position untouched
    ///
    /// 读取一个值；返回 `None` 时读位置保持不变
    pub fn read_value<T: Copy>(&mut self) -> Option<T> {
        let mut value = MaybeUninit::<T>::uninit();
        let read = self
            .core
            .read_items(value.as_mut_ptr() as *mut u8, size_of::<T>(), 1, false);
        if read == 1 {
            // SAFETY: read_items filled all size_of::<T>() bytes
            Some(unsafe { value.assume_init() })
        } else {
            None
        }
    }

    /// Read one value without advancing the read position
    ///
    /// 读取一个值但不推进读位置
    pub fn peek_value<T: Copy>(&self) -> Option<T> {
        let mut value = MaybeUninit::<T>::uninit();
        if self
            .core
            .peek_items(value.as_mut_ptr() as *mut u8, size_of::<T>(), 1)
        {
            // SAFETY: peek_items filled all size_of::<T>() bytes
            Some(unsafe { value.assume_init() })
        } else {
            None
        }
    }

    // MARK: Writing and reading multiple values
    // MARK: 写入和读取多个值

    /// Write a tuple of values as one unit; all-or-nothing
    ///
    /// 将一个值元组作为整体写入；全有或全无
    ///
    /// Each value is placed in declaration order through the write
    /// vector, splitting at the wrap boundary where necessary, and the
    /// whole group is published with a single commit.
    ///
    /// 每个值按声明顺序通过写入向量放置，必要时在环绕边界处拆分，
    /// 整组以单次提交发布。
    ///
    /// ```
    /// use bytering::RingBuffer;
    ///
    /// let mut rb = RingBuffer::with_capacity(64).unwrap();
    /// assert!(rb.write_values((10i32, 20.5f32)));
    ///
    /// let (a, b) = rb.read_values::<(i32, f32)>().unwrap();
    /// assert_eq!(a, 10);
    /// assert_eq!(b, 20.5);
    /// ```
    pub fn write_values<V: ValueBundle>(&mut self, values: V) -> bool {
        let ((front_ptr, front_len), (back_ptr, back_len)) = self.core.write_segments();
        if front_len + back_len < V::TOTAL_SIZE {
            return false;
        }

        // SAFETY: as in write_vector
        let (front, back) = unsafe { (raw_mut_slice(front_ptr, front_len), raw_mut_slice(back_ptr, back_len)) };
        let mut writer = BundleWriter::new(front, back);
        values.write_to(&mut writer);

        self.core.commit_write(V::TOTAL_SIZE);
        true
    }

    /// Read a tuple of values as one unit; `None` leaves the read position untouched
    ///
    /// 将一个值元组作为整体读取；返回 `None` 时读位置保持不变
    pub fn read_values<V: ValueBundle>(&mut self) -> Option<V> {
        let values = self.peek_values::<V>()?;
        self.core.commit_read(V::TOTAL_SIZE);
        Some(values)
    }

    /// Read a tuple of values without advancing the read position
    ///
    /// 读取一个值元组但不推进读位置
    pub fn peek_values<V: ValueBundle>(&self) -> Option<V> {
        let ((front_ptr, front_len), (back_ptr, back_len)) = self.core.read_segments();
        if front_len + back_len < V::TOTAL_SIZE {
            return None;
        }

        // SAFETY: as in read_vector
        let (front, back) = unsafe { (raw_slice(front_ptr, front_len), raw_slice(back_ptr, back_len)) };
        let mut reader = BundleReader::new(front, back);
        Some(V::read_from(&mut reader))
    }
}

impl Default for RingBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity())
            .field("allocated", &self.is_allocated())
            .finish_non_exhaustive()
    }
}

/// Build a byte slice from a raw segment, tolerating the empty/null case
///
/// 从原始段构建字节切片，容忍空/空指针情形
#[inline]
pub(crate) unsafe fn raw_slice<'a>(ptr: *const u8, len: usize) -> &'a [u8] {
    if len == 0 {
        &[]
    } else {
        unsafe { slice::from_raw_parts(ptr, len) }
    }
}

#[inline]
pub(crate) unsafe fn raw_mut_slice<'a>(ptr: *mut u8, len: usize) -> &'a mut [u8] {
    if len == 0 {
        &mut []
    } else {
        unsafe { slice::from_raw_parts_mut(ptr, len) }
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    #[test]
    fn test_unallocated_buffer_is_inert() {
        let mut rb = RingBuffer::new();
        assert!(!rb.is_allocated());
        assert_eq!(rb.capacity(), 0);
        assert_eq!(rb.available_bytes(), 0);
        assert_eq!(rb.free_space(), 0);

        let mut buf = [0u8; 1024];
        assert_eq!(rb.read(&mut buf, true), 0);
        assert_eq!(rb.write(&buf, true), 0);
        assert_eq!(rb.drain(), 0);
        assert_eq!(rb.skip(1, 10, true), 0);
        assert!(!rb.peek(&mut buf[..1]));
        assert!(rb.read_value::<u8>().is_none());
        assert!(rb.write_vector().is_empty());
        assert!(rb.read_vector().is_empty());
    }

    #[test]
    fn test_capacity_rounding() {
        let mut rb = RingBuffer::new();
        assert!(!rb.allocate(1));
        assert!(rb.allocate(2));
        assert_eq!(rb.capacity(), 2);
        assert!(rb.allocate(100));
        assert_eq!(rb.capacity(), 128);
        assert!(!rb.allocate(MAX_CAPACITY + 1));
        // A rejected request does not disturb the existing allocation
        assert_eq!(rb.capacity(), 128);
        assert!(rb.is_allocated());
    }

    #[test]
    fn test_with_capacity_errors() {
        assert_eq!(
            RingBuffer::with_capacity(0).unwrap_err(),
            NewError::CapacityOutOfRange
        );
        assert_eq!(
            RingBuffer::with_capacity(1).unwrap_err(),
            NewError::CapacityOutOfRange
        );
        assert_eq!(
            RingBuffer::with_capacity(MAX_CAPACITY + 1).unwrap_err(),
            NewError::CapacityOutOfRange
        );

        let rb = RingBuffer::with_capacity(2).unwrap();
        assert_eq!(rb.capacity(), 2);
        assert!(rb.is_allocated());
        assert!(rb.is_empty());
    }

    #[test]
    fn test_basic_write_read() {
        let mut rb = RingBuffer::with_capacity(128).unwrap();

        let data: Vec<u8> = (0..16).collect();
        assert_eq!(rb.write(&data, true), 16);
        assert_eq!(rb.available_bytes(), 16);
        assert_eq!(rb.free_space(), 112);

        let mut out = [0u8; 16];
        assert_eq!(rb.read(&mut out, true), 16);
        assert_eq!(&out[..], &data[..]);
        assert_eq!(rb.available_bytes(), 0);
    }

    #[test]
    fn test_wrap_around() {
        let mut rb = RingBuffer::with_capacity(16).unwrap();

        assert_eq!(rb.write(&[0xAu8; 10], true), 10);
        let mut out = [0u8; 5];
        assert_eq!(rb.read(&mut out, true), 5);
        assert_eq!(out, [0xA; 5]);

        assert_eq!(rb.write(&[0xAu8; 10], true), 10);
        assert_eq!(rb.available_bytes(), 15);
        assert_eq!(rb.drain(), 15);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_fills_to_exact_capacity() {
        let mut rb = RingBuffer::with_capacity(8).unwrap();
        assert_eq!(rb.write(&[1u8; 8], true), 8);
        assert!(rb.is_full());
        assert_eq!(rb.free_space(), 0);
        assert_eq!(rb.write(&[2u8; 1], true), 0);

        let mut out = [0u8; 8];
        assert_eq!(rb.read(&mut out, true), 8);
        assert_eq!(out, [1; 8]);
    }

    #[test]
    fn test_all_or_nothing_write() {
        let mut rb = RingBuffer::with_capacity(16).unwrap();
        // 16 bytes fits four u32s
        assert_eq!(rb.write(&[0u32; 5], false), 0);
        assert!(rb.is_empty());
        assert_eq!(rb.write(&[0u32; 4], false), 4);
        assert!(rb.is_full());
    }

    #[test]
    fn test_all_or_nothing_read() {
        let mut rb = RingBuffer::with_capacity(16).unwrap();
        assert_eq!(rb.write(&[1u32, 2], true), 2);

        let mut out = [0u32; 3];
        assert_eq!(rb.read(&mut out, false), 0);
        assert_eq!(rb.available_bytes(), 8);
        assert_eq!(rb.read(&mut out[..2], false), 2);
        assert_eq!(&out[..2], &[1, 2]);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut rb = RingBuffer::with_capacity(64).unwrap();
        assert!(rb.write_value(7i32));

        assert_eq!(rb.peek_value::<i32>(), Some(7));
        assert_eq!(rb.available_bytes(), size_of::<i32>());
        assert_eq!(rb.peek_value::<i32>(), Some(7));
        assert_eq!(rb.read_value::<i32>(), Some(7));
        assert!(rb.is_empty());
    }

    #[test]
    fn test_peek_then_read_identical() {
        let mut rb = RingBuffer::with_capacity(32).unwrap();
        let data = [3u8, 1, 4, 1, 5, 9, 2, 6];
        assert_eq!(rb.write(&data, true), 8);

        let mut peeked = [0u8; 8];
        assert!(rb.peek(&mut peeked));

        let mut read = [0u8; 8];
        assert_eq!(rb.read(&mut read, false), 8);
        assert_eq!(peeked, read);
    }

    #[test]
    fn test_skip() {
        let mut rb = RingBuffer::with_capacity(32).unwrap();
        let data: Vec<u8> = (0..10).collect();
        assert_eq!(rb.write(&data, true), 10);

        assert_eq!(rb.skip(1, 4, true), 4);
        assert_eq!(rb.read_value::<u8>(), Some(4));

        // More items than available, no partials
        assert_eq!(rb.skip(1, 100, false), 0);
        assert_eq!(rb.available_bytes(), 5);
        // Same request, partials allowed
        assert_eq!(rb.skip(1, 100, true), 5);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_skip_values_whole_items() {
        let mut rb = RingBuffer::with_capacity(32).unwrap();
        assert!(rb.write_value(1u64));
        assert!(rb.write_value(2u64));

        assert_eq!(rb.skip_values::<u64>(1), 1);
        assert_eq!(rb.read_value::<u64>(), Some(2));
        assert_eq!(rb.skip_values::<u64>(1), 0);
    }

    #[test]
    fn test_write_vector_commit() {
        let mut rb = RingBuffer::with_capacity(16).unwrap();

        {
            let vector = rb.write_vector();
            assert_eq!(vector.len(), 16);
            assert!(vector.back.is_empty());
            vector.front[..3].copy_from_slice(&[7, 8, 9]);
        }
        rb.commit_write(3);

        assert_eq!(rb.available_bytes(), 3);
        let mut out = [0u8; 3];
        assert_eq!(rb.read(&mut out, false), 3);
        assert_eq!(out, [7, 8, 9]);
    }

    #[test]
    fn test_vectors_wrap_in_physical_order() {
        let mut rb = RingBuffer::with_capacity(8).unwrap();
        assert_eq!(rb.write(&[1u8; 6], true), 6);
        assert_eq!(rb.skip(1, 6, true), 6);

        // Free region wraps: 2 bytes to the end, 6 from offset zero
        {
            let vector = rb.write_vector();
            assert_eq!(vector.front.len(), 2);
            assert_eq!(vector.back.len(), 6);
            vector.front.copy_from_slice(&[1, 2]);
            vector.back[..2].copy_from_slice(&[3, 4]);
        }
        rb.commit_write(4);

        let vector = rb.read_vector();
        assert_eq!(vector.front.len(), 2);
        assert_eq!(vector.back.len(), 2);
        assert_eq!(vector.front, &[1, 2]);
        assert_eq!(vector.back, &[3, 4]);
        drop(vector);
        rb.commit_read(4);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_values_roundtrip() {
        #[derive(Debug, Clone, Copy, PartialEq)]
        struct Sample {
            a: i32,
            b: f32,
        }

        let mut rb = RingBuffer::with_capacity(64).unwrap();
        assert!(rb.write_values((10i32, 20.5f32, Sample { a: 1, b: 2.0 })));

        let (x, y, z) = rb.read_values::<(i32, f32, Sample)>().unwrap();
        assert_eq!(x, 10);
        assert_eq!(y, 20.5);
        assert_eq!(z, Sample { a: 1, b: 2.0 });
        assert!(rb.is_empty());
    }

    #[test]
    fn test_values_straddle_wrap_boundary() {
        let mut rb = RingBuffer::with_capacity(16).unwrap();
        // Park the cursors so the next bundle wraps mid-value
        assert_eq!(rb.write(&[0u8; 13], true), 13);
        assert_eq!(rb.skip(1, 13, true), 13);

        assert!(rb.write_values((0x11223344u32, 0x5566778899AABBCCu64)));
        let (a, b) = rb.read_values::<(u32, u64)>().unwrap();
        assert_eq!(a, 0x11223344);
        assert_eq!(b, 0x5566778899AABBCC);
    }

    #[test]
    fn test_values_all_or_nothing() {
        let mut rb = RingBuffer::with_capacity(8).unwrap();
        assert!(!rb.write_values((1u64, 2u64)));
        assert!(rb.is_empty());
        assert!(rb.write_values((3u64,)));
        assert_eq!(rb.available_bytes(), 8);
    }

    #[test]
    fn test_failed_read_leaves_state_unchanged() {
        let mut rb = RingBuffer::with_capacity(64).unwrap();
        assert!(rb.write_value(0xABu8));

        // Not enough data for a u32: nothing must move
        assert_eq!(rb.read_value::<u32>(), None);
        assert_eq!(rb.available_bytes(), 1);
        assert_eq!(rb.read_values::<(u8, u32)>(), None);
        assert_eq!(rb.available_bytes(), 1);

        // Once the data arrives the same read succeeds
        assert!(rb.write_value(0xDEADBEEFu32));
        let (a, b) = rb.read_values::<(u8, u32)>().unwrap();
        assert_eq!(a, 0xAB);
        assert_eq!(b, 0xDEADBEEF);
    }

    #[test]
    fn test_deallocate_idempotent() {
        let mut rb = RingBuffer::with_capacity(64).unwrap();
        assert_eq!(rb.write(&[1u8; 10], true), 10);

        rb.deallocate();
        assert!(!rb.is_allocated());
        assert_eq!(rb.capacity(), 0);
        rb.deallocate();
        assert!(!rb.is_allocated());
    }

    #[test]
    fn test_reset_keeps_allocation() {
        let mut rb = RingBuffer::with_capacity(64).unwrap();
        assert_eq!(rb.write(&[1u8; 10], true), 10);

        rb.reset();
        assert!(rb.is_allocated());
        assert_eq!(rb.capacity(), 64);
        assert!(rb.is_empty());
        assert_eq!(rb.free_space(), 64);
    }

    #[test]
    fn test_reallocate_discards_contents() {
        let mut rb = RingBuffer::with_capacity(64).unwrap();
        assert_eq!(rb.write(&[1u8; 10], true), 10);

        assert!(rb.allocate(256));
        assert_eq!(rb.capacity(), 256);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_used_plus_free_is_capacity() {
        let mut rb = RingBuffer::with_capacity(32).unwrap();
        for step in 0..40 {
            let n = rb.write(&[step as u8; 7], true);
            assert_eq!(rb.available_bytes() + rb.free_space(), rb.capacity());
            let mut out = [0u8; 5];
            rb.read(&mut out, true);
            assert_eq!(rb.available_bytes() + rb.free_space(), rb.capacity());
            let _ = n;
        }
    }

    #[test]
    fn test_move_transfers_state() {
        let mut rb = RingBuffer::with_capacity(32).unwrap();
        assert_eq!(rb.write(&[5u8; 4], true), 4);

        let mut moved = rb;
        assert_eq!(moved.capacity(), 32);
        assert_eq!(moved.available_bytes(), 4);
        let mut out = [0u8; 4];
        assert_eq!(moved.read(&mut out, false), 4);
        assert_eq!(out, [5; 4]);
    }

    #[test]
    fn test_zero_sized_items_are_noops() {
        let mut rb = RingBuffer::with_capacity(16).unwrap();
        assert_eq!(rb.write(&[(), (), ()], true), 0);
        let mut out = [(); 3];
        assert_eq!(rb.read(&mut out, true), 0);
        assert!(!rb.peek(&mut out));
        assert_eq!(rb.skip(0, 3, true), 0);
        assert!(rb.is_empty());
    }

    #[test]
    fn test_debug_format() {
        let rb = RingBuffer::with_capacity(16).unwrap();
        let repr = format!("{:?}", rb);
        assert!(repr.contains("RingBuffer"));
        assert!(repr.contains("16"));
    }
}
