/// Owned raw byte region backing the ring buffer
///
/// 环形缓冲区底层的自有原始字节区域
///
/// This type owns a contiguous heap allocation of bytes, or nothing at all
/// (the unallocated state). Unlike a `Vec<u8>`, allocation failure is
/// observable: `allocate` returns `None` instead of aborting the process,
/// which feeds the ring buffer's fallible construction paths.
///
/// 此类型拥有一块连续的堆字节区域，或者什么都不拥有（未分配状态）。
/// 与 `Vec<u8>` 不同，分配失败是可观察的：`allocate` 返回 `None` 而不是中止进程，
/// 这为环形缓冲区的可失败构造路径提供支持。

use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr;

/// Alignment of the backing region, matching the common cache line size
///
/// 底层区域的对齐方式，与常见的缓存行大小一致
const REGION_ALIGN: usize = 64;

/// An owned, fixed-size byte region with an explicit unallocated state
///
/// 自有的固定大小字节区域，带有显式的未分配状态
///
/// The region is zero-initialized on allocation, so every byte is always
/// a valid `u8` regardless of what has been written through the ring.
///
/// 区域在分配时被零初始化，因此无论通过环写入了什么，每个字节始终是有效的 `u8`。
pub struct ByteStorage {
    /// Base of the region, null when unallocated
    ///
    /// 区域基址，未分配时为空指针
    ptr: *mut u8,

    /// Length of the region in bytes, zero when unallocated
    ///
    /// 区域长度（字节），未分配时为零
    len: usize,
}

impl ByteStorage {
    /// Create storage in the unallocated state
    ///
    /// 创建处于未分配状态的存储
    #[inline]
    pub const fn unallocated() -> Self {
        Self {
            ptr: ptr::null_mut(),
            len: 0,
        }
    }

    /// Allocate a zeroed region of exactly `len` bytes
    ///
    /// 分配一块恰好 `len` 字节的零初始化区域
    ///
    /// Returns `None` if the process allocator refuses the request or the
    /// layout is unrepresentable. `len` must be nonzero.
    ///
    /// 如果进程分配器拒绝请求或布局不可表示，则返回 `None`。`len` 必须非零。
    pub fn allocate(len: usize) -> Option<Self> {
        debug_assert!(len > 0);

        let layout = Layout::from_size_align(len, REGION_ALIGN).ok()?;
        // SAFETY: layout has nonzero size
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            return None;
        }

        Some(Self { ptr, len })
    }

    /// Whether a region is currently allocated
    ///
    /// 当前是否已分配区域
    #[inline]
    pub fn is_allocated(&self) -> bool {
        !self.ptr.is_null()
    }

    /// Length of the region in bytes (zero when unallocated)
    ///
    /// 区域长度（字节），未分配时为零
    #[inline]
    #[allow(unused)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Base pointer of the region
    ///
    /// 区域的基址指针
    ///
    /// Null when unallocated; callers must check `is_allocated` before
    /// dereferencing.
    ///
    /// 未分配时为空指针；调用者在解引用前必须检查 `is_allocated`。
    #[inline(always)]
    pub fn base(&self) -> *mut u8 {
        self.ptr
    }

    /// Pointer to the byte at `offset`
    ///
    /// 指向 `offset` 处字节的指针
    ///
    /// # Safety
    /// - The region must be allocated
    /// - `offset` must be <= the region length
    ///
    /// # 安全性
    /// - 区域必须已分配
    /// - `offset` 必须 <= 区域长度
    #[inline(always)]
    pub unsafe fn byte_at(&self, offset: usize) -> *mut u8 {
        debug_assert!(self.is_allocated() && offset <= self.len);
        unsafe { self.ptr.add(offset) }
    }

    /// Release the region and return to the unallocated state. Idempotent.
    ///
    /// 释放区域并回到未分配状态。幂等。
    pub fn release(&mut self) {
        if !self.ptr.is_null() {
            // SAFETY: ptr was produced by alloc_zeroed with this exact layout
            unsafe {
                let layout = Layout::from_size_align_unchecked(self.len, REGION_ALIGN);
                dealloc(self.ptr, layout);
            }
            self.ptr = ptr::null_mut();
            self.len = 0;
        }
    }
}

impl Drop for ByteStorage {
    fn drop(&mut self) {
        self.release();
    }
}

// The region is plain bytes; the ring buffer's cursor protocol partitions
// all concurrent access to it.
// 区域是纯字节；环形缓冲区的游标协议划分了对它的所有并发访问。
unsafe impl Send for ByteStorage {}
unsafe impl Sync for ByteStorage {}
