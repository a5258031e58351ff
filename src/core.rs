//! Core ring buffer implementation - Shared engine for the owned buffer and the SPSC handles
//!
//! 核心环形缓冲区实现 - 自有缓冲区与 SPSC 句柄的共享引擎
//!
//! This module concentrates everything both public surfaces delegate to:
//! - Byte storage lifecycle (allocate / deallocate / reset)
//! - The two free-running atomic cursors and their Acquire/Release protocol
//! - The wrap-around bulk copy engine (two-segment memcpy)
//! - Vector acquisition, commit, skip and drain primitives
//!
//! 此模块集中了两个公开层共同委托的内容：
//! - 字节存储生命周期（分配 / 释放 / 重置）
//! - 两个自由递增的原子游标及其 Acquire/Release 协议
//! - 环绕批量拷贝引擎（两段 memcpy）
//! - 向量获取、提交、跳过和排空原语

use crate::shim::atomic::{AtomicUsize, Ordering};
use crate::storage::ByteStorage;
use crossbeam_utils::CachePadded;
use std::ptr;

/// The minimum supported ring buffer capacity in bytes
///
/// 环形缓冲区支持的最小容量（字节）
pub const MIN_CAPACITY: usize = 2;

/// The maximum supported ring buffer capacity in bytes
///
/// 环形缓冲区支持的最大容量（字节）
pub const MAX_CAPACITY: usize = 1 << (usize::BITS - 1);

/// Core ring buffer state
///
/// 核心环形缓冲区状态
///
/// The cursors are free-running: they increase monotonically and are only
/// reduced to physical offsets by masking with `capacity - 1`. Because the
/// capacity is a power of two strictly below the index modulus, unsigned
/// wrapping subtraction always yields the correct number of used bytes,
/// and a full buffer (`used == capacity`) is distinguishable from an empty
/// one (`used == 0`) without wasting a slot.
///
/// 游标是自由递增的：它们单调增加，仅在与 `capacity - 1` 做掩码运算时
/// 才转化为物理偏移。由于容量是严格小于索引模数的 2 的幂次，无符号环绕
/// 减法始终给出正确的已用字节数，满缓冲区（`used == capacity`）与空缓冲区
/// （`used == 0`）可以无歧义地区分，不需要浪费一个槽位。
pub(crate) struct RingCore {
    /// Backing byte region
    ///
    /// 底层字节区域
    storage: ByteStorage,

    /// Allocated capacity in bytes (power of two, zero when unallocated)
    ///
    /// 已分配容量（字节，2 的幂次，未分配时为零）
    capacity: usize,

    /// Mask for physical offsets (capacity - 1)
    ///
    /// 物理偏移掩码（capacity - 1）
    mask: usize,

    /// Free-running write cursor, owned by the producer side
    ///
    /// 自由递增的写游标，由生产者端拥有
    write_pos: CachePadded<AtomicUsize>,

    /// Free-running read cursor, owned by the consumer side
    ///
    /// 自由递增的读游标，由消费者端拥有
    read_pos: CachePadded<AtomicUsize>,
}

impl RingCore {
    /// Create a core in the unallocated state
    ///
    /// 创建处于未分配状态的核心
    pub fn unallocated() -> Self {
        Self {
            storage: ByteStorage::unallocated(),
            capacity: 0,
            mask: 0,
            write_pos: CachePadded::new(AtomicUsize::new(0)),
            read_pos: CachePadded::new(AtomicUsize::new(0)),
        }
    }

    /// Allocate space for data
    ///
    /// 为数据分配空间
    ///
    /// The actual capacity is the smallest power of two not less than
    /// `min_capacity`. Any existing allocation is released first and both
    /// cursors are zeroed. Returns false if `min_capacity` is outside
    /// `[MIN_CAPACITY, MAX_CAPACITY]` or the allocator refuses.
    ///
    /// 实际容量是不小于 `min_capacity` 的最小 2 的幂次。任何现有分配会先被
    /// 释放，两个游标归零。若 `min_capacity` 超出 `[MIN_CAPACITY, MAX_CAPACITY]`
    /// 或分配器拒绝，则返回 false。
    pub fn allocate(&mut self, min_capacity: usize) -> bool {
        if min_capacity < MIN_CAPACITY || min_capacity > MAX_CAPACITY {
            return false;
        }

        self.deallocate();

        let capacity = min_capacity.next_power_of_two();
        let storage = match ByteStorage::allocate(capacity) {
            Some(storage) => storage,
            None => return false,
        };

        self.storage = storage;
        self.capacity = capacity;
        self.mask = capacity - 1;

        self.write_pos.store(0, Ordering::Relaxed);
        self.read_pos.store(0, Ordering::Relaxed);

        true
    }

    /// Free any allocated space and reset all state. Idempotent.
    ///
    /// 释放任何已分配的空间并重置所有状态。幂等。
    pub fn deallocate(&mut self) {
        self.storage.release();
        self.capacity = 0;
        self.mask = 0;
        self.write_pos.store(0, Ordering::Relaxed);
        self.read_pos.store(0, Ordering::Relaxed);
    }

    /// Zero both cursors, keeping the allocation
    ///
    /// 将两个游标归零，保留分配
    pub fn reset(&mut self) {
        self.write_pos.store(0, Ordering::Relaxed);
        self.read_pos.store(0, Ordering::Relaxed);
    }

    /// Whether backing storage is allocated
    ///
    /// 是否已分配底层存储
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.storage.is_allocated()
    }

    /// Allocated capacity in bytes
    ///
    /// 已分配容量（字节）
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get a reference to the write cursor
    ///
    /// 获取写游标的引用
    #[inline]
    pub fn write_pos(&self) -> &AtomicUsize {
        &self.write_pos
    }

    /// Get a reference to the read cursor
    ///
    /// 获取读游标的引用
    #[inline]
    pub fn read_pos(&self) -> &AtomicUsize {
        &self.read_pos
    }

    /// Free space in bytes. Accurate on the producer side only.
    ///
    /// 空闲空间（字节）。仅在生产者端准确。
    #[inline]
    pub fn free_space(&self) -> usize {
        let write_pos = self.write_pos.load(Ordering::Relaxed);
        let read_pos = self.read_pos.load(Ordering::Acquire);
        self.capacity - write_pos.wrapping_sub(read_pos)
    }

    /// Whether the buffer is full. Accurate on the producer side only.
    ///
    /// 缓冲区是否已满。仅在生产者端准确。
    #[inline]
    pub fn is_full(&self) -> bool {
        let write_pos = self.write_pos.load(Ordering::Relaxed);
        let read_pos = self.read_pos.load(Ordering::Acquire);
        write_pos.wrapping_sub(read_pos) == self.capacity
    }

    /// Bytes available for reading. Accurate on the consumer side only.
    ///
    /// 可读取的字节数。仅在消费者端准确。
    #[inline]
    pub fn available_bytes(&self) -> usize {
        let write_pos = self.write_pos.load(Ordering::Acquire);
        let read_pos = self.read_pos.load(Ordering::Relaxed);
        write_pos.wrapping_sub(read_pos)
    }

    /// Whether the buffer is empty. Accurate on the consumer side only.
    ///
    /// 缓冲区是否为空。仅在消费者端准确。
    #[inline]
    pub fn is_empty(&self) -> bool {
        let write_pos = self.write_pos.load(Ordering::Acquire);
        let read_pos = self.read_pos.load(Ordering::Relaxed);
        write_pos == read_pos
    }

    /// Copy `len` bytes into the ring at free-running position `pos`,
    /// splitting into two copies at the wrap boundary if necessary
    ///
    /// 在自由递增位置 `pos` 处向环内拷贝 `len` 字节，
    /// 必要时在环绕边界处分成两次拷贝
    ///
    /// # Safety
    /// Caller must ensure:
    /// - The buffer is allocated and `len <= capacity`
    /// - `src` is valid for reads of `len` bytes
    /// - The target byte range is not concurrently read (cursor protocol)
    ///
    /// # 安全性
    /// 调用者必须确保：
    /// - 缓冲区已分配且 `len <= capacity`
    /// - `src` 可读取 `len` 字节
    /// - 目标字节范围没有被并发读取（游标协议）
    pub unsafe fn copy_in(&self, pos: usize, src: *const u8, len: usize) {
        unsafe {
            let index = pos & self.mask;
            let bytes_to_end = self.capacity - index;
            if len <= bytes_to_end {
                ptr::copy_nonoverlapping(src, self.storage.byte_at(index), len);
            } else {
                ptr::copy_nonoverlapping(src, self.storage.byte_at(index), bytes_to_end);
                ptr::copy_nonoverlapping(src.add(bytes_to_end), self.storage.base(), len - bytes_to_end);
            }
        }
    }

    /// Copy `len` bytes out of the ring from free-running position `pos`
    ///
    /// 从自由递增位置 `pos` 处向环外拷贝 `len` 字节
    ///
    /// # Safety
    /// Caller must ensure:
    /// - The buffer is allocated and `len <= capacity`
    /// - `dst` is valid for writes of `len` bytes
    /// - The source byte range is not concurrently written (cursor protocol)
    ///
    /// # 安全性
    /// 调用者必须确保：
    /// - 缓冲区已分配且 `len <= capacity`
    /// - `dst` 可写入 `len` 字节
    /// - 源字节范围没有被并发写入（游标协议）
    pub unsafe fn copy_out(&self, pos: usize, dst: *mut u8, len: usize) {
        unsafe {
            let index = pos & self.mask;
            let bytes_to_end = self.capacity - index;
            if len <= bytes_to_end {
                ptr::copy_nonoverlapping(self.storage.byte_at(index), dst, len);
            } else {
                ptr::copy_nonoverlapping(self.storage.byte_at(index), dst, bytes_to_end);
                ptr::copy_nonoverlapping(self.storage.base(), dst.add(bytes_to_end), len - bytes_to_end);
            }
        }
    }

    /// Write whole items and advance the write cursor
    ///
    /// 写入整数个条目并推进写游标
    ///
    /// Either an integral number of items is written or zero. With
    /// `allow_partial` false the request is all-or-nothing.
    ///
    /// 要么写入整数个条目，要么写入零个。当 `allow_partial` 为 false 时，
    /// 请求是全有或全无的。
    pub fn write_items(
        &self,
        src: *const u8,
        item_size: usize,
        item_count: usize,
        allow_partial: bool,
    ) -> usize {
        if src.is_null() || item_size == 0 || item_count == 0 || self.capacity == 0 {
            return 0;
        }

        let write_pos = self.write_pos.load(Ordering::Relaxed);
        let read_pos = self.read_pos.load(Ordering::Acquire);

        let bytes_used = write_pos.wrapping_sub(read_pos);
        let bytes_free = self.capacity - bytes_used;
        let items_free = bytes_free / item_size;
        if items_free == 0 || (items_free < item_count && !allow_partial) {
            return 0;
        }

        let items_to_write = items_free.min(item_count);
        let bytes_to_write = items_to_write * item_size;

        // SAFETY: bytes_to_write <= bytes_free <= capacity; the cursor
        // protocol keeps the target range disjoint from the consumer's
        unsafe {
            self.copy_in(write_pos, src, bytes_to_write);
        }

        self.write_pos
            .store(write_pos.wrapping_add(bytes_to_write), Ordering::Release);

        items_to_write
    }

    /// Read whole items and advance the read cursor
    ///
    /// 读取整数个条目并推进读游标
    pub fn read_items(
        &self,
        dst: *mut u8,
        item_size: usize,
        item_count: usize,
        allow_partial: bool,
    ) -> usize {
        if dst.is_null() || item_size == 0 || item_count == 0 || self.capacity == 0 {
            return 0;
        }

        let write_pos = self.write_pos.load(Ordering::Acquire);
        let read_pos = self.read_pos.load(Ordering::Relaxed);

        let bytes_used = write_pos.wrapping_sub(read_pos);
        let items_available = bytes_used / item_size;
        if items_available == 0 || (items_available < item_count && !allow_partial) {
            return 0;
        }

        let items_to_read = items_available.min(item_count);
        let bytes_to_read = items_to_read * item_size;

        // SAFETY: bytes_to_read <= bytes_used <= capacity; the cursor
        // protocol keeps the source range disjoint from the producer's
        unsafe {
            self.copy_out(read_pos, dst, bytes_to_read);
        }

        self.read_pos
            .store(read_pos.wrapping_add(bytes_to_read), Ordering::Release);

        items_to_read
    }

    /// Read whole items without advancing the read cursor
    ///
    /// 读取整数个条目但不推进读游标
    ///
    /// Refuses partial results: delivers exactly `item_count` items or
    /// reports false.
    ///
    /// 拒绝部分结果：要么恰好交付 `item_count` 个条目，要么报告 false。
    pub fn peek_items(&self, dst: *mut u8, item_size: usize, item_count: usize) -> bool {
        if dst.is_null() || item_size == 0 || item_count == 0 || self.capacity == 0 {
            return false;
        }

        let write_pos = self.write_pos.load(Ordering::Acquire);
        let read_pos = self.read_pos.load(Ordering::Relaxed);

        let bytes_used = write_pos.wrapping_sub(read_pos);
        let items_available = bytes_used / item_size;
        if items_available < item_count {
            return false;
        }

        let bytes_to_peek = item_count * item_size;

        // SAFETY: bytes_to_peek <= bytes_used <= capacity
        unsafe {
            self.copy_out(read_pos, dst, bytes_to_peek);
        }

        true
    }

    /// Skip whole items, advancing the read cursor without copying
    ///
    /// 跳过整数个条目，推进读游标但不进行拷贝
    pub fn skip_items(&self, item_size: usize, item_count: usize, allow_partial: bool) -> usize {
        if item_size == 0 || item_count == 0 || self.capacity == 0 {
            return 0;
        }

        let write_pos = self.write_pos.load(Ordering::Acquire);
        let read_pos = self.read_pos.load(Ordering::Relaxed);

        let bytes_used = write_pos.wrapping_sub(read_pos);
        let items_available = bytes_used / item_size;
        if items_available == 0 || (items_available < item_count && !allow_partial) {
            return 0;
        }

        let items_to_skip = items_available.min(item_count);
        let bytes_to_skip = items_to_skip * item_size;

        self.read_pos
            .store(read_pos.wrapping_add(bytes_to_skip), Ordering::Release);

        items_to_skip
    }

    /// Advance the read cursor to the write cursor, emptying the buffer
    ///
    /// 将读游标推进到写游标处，清空缓冲区
    pub fn drain(&self) -> usize {
        let write_pos = self.write_pos.load(Ordering::Acquire);
        let read_pos = self.read_pos.load(Ordering::Relaxed);

        let bytes_used = write_pos.wrapping_sub(read_pos);
        if bytes_used == 0 {
            return 0;
        }

        self.read_pos.store(write_pos, Ordering::Release);
        bytes_used
    }

    /// The current writable region as up to two raw segments in physical order
    ///
    /// 当前可写区域，按物理顺序以最多两个原始段表示
    ///
    /// The second segment is empty unless the free region wraps. The
    /// segment lengths sum to the free space.
    ///
    /// 除非空闲区域发生环绕，否则第二段为空。两段长度之和等于空闲空间。
    pub fn write_segments(&self) -> ((*mut u8, usize), (*mut u8, usize)) {
        let write_pos = self.write_pos.load(Ordering::Relaxed);
        let read_pos = self.read_pos.load(Ordering::Acquire);

        let bytes_used = write_pos.wrapping_sub(read_pos);
        let bytes_free = self.capacity - bytes_used;
        if bytes_free == 0 {
            return ((ptr::null_mut(), 0), (ptr::null_mut(), 0));
        }

        let index = write_pos & self.mask;
        let bytes_to_end = self.capacity - index;
        // SAFETY: capacity != 0 here, so the storage is allocated
        unsafe {
            if bytes_free <= bytes_to_end {
                ((self.storage.byte_at(index), bytes_free), (ptr::null_mut(), 0))
            } else {
                (
                    (self.storage.byte_at(index), bytes_to_end),
                    (self.storage.base(), bytes_free - bytes_to_end),
                )
            }
        }
    }

    /// The current readable region as up to two raw segments in physical order
    ///
    /// 当前可读区域，按物理顺序以最多两个原始段表示
    pub fn read_segments(&self) -> ((*const u8, usize), (*const u8, usize)) {
        let write_pos = self.write_pos.load(Ordering::Acquire);
        let read_pos = self.read_pos.load(Ordering::Relaxed);

        let bytes_used = write_pos.wrapping_sub(read_pos);
        if bytes_used == 0 {
            return ((ptr::null(), 0), (ptr::null(), 0));
        }

        let index = read_pos & self.mask;
        let bytes_to_end = self.capacity - index;
        // SAFETY: capacity != 0 here, so the storage is allocated
        unsafe {
            if bytes_used <= bytes_to_end {
                ((self.storage.byte_at(index) as *const u8, bytes_used), (ptr::null(), 0))
            } else {
                (
                    (self.storage.byte_at(index) as *const u8, bytes_to_end),
                    (self.storage.base() as *const u8, bytes_used - bytes_to_end),
                )
            }
        }
    }

    /// Publish `count` bytes previously staged through the write segments
    ///
    /// 发布先前通过写入段暂存的 `count` 字节
    ///
    /// Committing more than the free space desynchronizes the stream.
    ///
    /// 提交超过空闲空间的字节数会使数据流失去同步。
    pub fn commit_write(&self, count: usize) {
        debug_assert!(
            count <= self.free_space(),
            "commit_write: committing more than available free space"
        );
        let write_pos = self.write_pos.load(Ordering::Relaxed);
        self.write_pos
            .store(write_pos.wrapping_add(count), Ordering::Release);
    }

    /// Release `count` bytes previously consumed through the read segments
    ///
    /// 释放先前通过读取段消费的 `count` 字节
    pub fn commit_read(&self, count: usize) {
        debug_assert!(
            count <= self.available_bytes(),
            "commit_read: committing more than available data"
        );
        let read_pos = self.read_pos.load(Ordering::Relaxed);
        self.read_pos
            .store(read_pos.wrapping_add(count), Ordering::Release);
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;

    #[test]
    fn test_unallocated_core() {
        let core = RingCore::unallocated();
        assert!(!core.is_allocated());
        assert_eq!(core.capacity(), 0);
        assert_eq!(core.free_space(), 0);
        assert_eq!(core.available_bytes(), 0);
    }

    #[test]
    fn test_allocate_rounds_up() {
        let mut core = RingCore::unallocated();
        assert!(core.allocate(3));
        assert_eq!(core.capacity(), 4);
        assert!(core.allocate(100));
        assert_eq!(core.capacity(), 128);
        assert!(core.allocate(128));
        assert_eq!(core.capacity(), 128);
    }

    #[test]
    fn test_allocate_range_checks() {
        let mut core = RingCore::unallocated();
        assert!(!core.allocate(0));
        assert!(!core.allocate(1));
        assert!(core.allocate(MIN_CAPACITY));
        assert_eq!(core.capacity(), 2);
        assert!(!core.allocate(MAX_CAPACITY + 1));
        assert!(!core.allocate(usize::MAX));
    }

    #[test]
    fn test_write_read_no_wrap() {
        let mut core = RingCore::unallocated();
        assert!(core.allocate(8));

        let data = [1u8, 2, 3, 4];
        assert_eq!(core.write_items(data.as_ptr(), 1, 4, true), 4);
        assert_eq!(core.available_bytes(), 4);
        assert_eq!(core.free_space(), 4);

        let mut out = [0u8; 4];
        assert_eq!(core.read_items(out.as_mut_ptr(), 1, 4, true), 4);
        assert_eq!(out, data);
        assert_eq!(core.available_bytes(), 0);
    }

    #[test]
    fn test_write_read_with_wrap() {
        let mut core = RingCore::unallocated();
        assert!(core.allocate(8));

        // Move the cursors near the end of the region
        let junk = [0u8; 6];
        assert_eq!(core.write_items(junk.as_ptr(), 1, 6, true), 6);
        assert_eq!(core.skip_items(1, 6, true), 6);

        // This write straddles the wrap boundary
        let data = [10u8, 20, 30, 40, 50];
        assert_eq!(core.write_items(data.as_ptr(), 1, 5, true), 5);

        let mut out = [0u8; 5];
        assert_eq!(core.read_items(out.as_mut_ptr(), 1, 5, true), 5);
        assert_eq!(out, data);
    }

    #[test]
    fn test_whole_items_policy() {
        let mut core = RingCore::unallocated();
        assert!(core.allocate(16));

        // 16 bytes of space fits 4 four-byte items
        let data = [0u32; 5];
        assert_eq!(core.write_items(data.as_ptr() as *const u8, 4, 5, true), 4);
        // Full request refused without partials
        let more = [0u32; 2];
        assert_eq!(core.write_items(more.as_ptr() as *const u8, 4, 2, false), 0);
        assert_eq!(core.available_bytes(), 16);
    }

    #[test]
    fn test_drain() {
        let mut core = RingCore::unallocated();
        assert!(core.allocate(16));
        assert_eq!(core.drain(), 0);

        let data = [7u8; 10];
        assert_eq!(core.write_items(data.as_ptr(), 1, 10, true), 10);
        assert_eq!(core.drain(), 10);
        assert!(core.is_empty());
        assert_eq!(core.drain(), 0);
    }

    #[test]
    fn test_segments_sum_to_free_and_used() {
        let mut core = RingCore::unallocated();
        assert!(core.allocate(16));

        let data = [1u8; 12];
        assert_eq!(core.write_items(data.as_ptr(), 1, 12, true), 12);
        assert_eq!(core.skip_items(1, 8, true), 8);

        let ((_, w1), (_, w2)) = core.write_segments();
        assert_eq!(w1 + w2, core.free_space());

        let ((_, r1), (_, r2)) = core.read_segments();
        assert_eq!(r1 + r2, core.available_bytes());
    }

    #[test]
    fn test_free_running_cursor_wraps_index_type() {
        let mut core = RingCore::unallocated();
        assert!(core.allocate(4));

        // Place both cursors near the integer modulus so arithmetic wraps
        core.write_pos().store(usize::MAX - 1, Ordering::Relaxed);
        core.read_pos().store(usize::MAX - 1, Ordering::Relaxed);

        let data = [9u8, 8, 7];
        assert_eq!(core.write_items(data.as_ptr(), 1, 3, true), 3);
        assert_eq!(core.available_bytes(), 3);

        let mut out = [0u8; 3];
        assert_eq!(core.read_items(out.as_mut_ptr(), 1, 3, true), 3);
        assert_eq!(out, data);
        assert!(core.is_empty());
    }
}
