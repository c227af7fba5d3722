//! The memory view: read-only random access over a target address space.
//!
//! Grounded on `memory_read` in this lineage's `dwfl_frame_unwind.c`
//! ancestor, which branches on whether the target is a live task (reads
//! through the OS process-inspection primitive) or a core image (scans
//! loadable segments and reads from the file-backed segment data). We
//! keep that split as two [`MemoryView`] implementations rather than one
//! function with a runtime branch, and add the endianness handling the
//! original left as a `FIXME`.

use crate::error::ExpressionError;

/// Architectural word width of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordWidth {
    W32,
    W64,
}

impl WordWidth {
    pub fn bytes(self) -> u64 {
        match self {
            WordWidth::W32 => 4,
            WordWidth::W64 => 8,
        }
    }

    /// Truncate a value to this width, leaving the upper bits zero.
    pub fn wrap(self, v: u64) -> u64 {
        match self {
            WordWidth::W32 => v & 0xffff_ffff,
            WordWidth::W64 => v,
        }
    }

    /// Reinterpret a wrapped value as a signed integer of this width,
    /// sign-extended to `i64`.
    pub fn as_signed(self, v: u64) -> i64 {
        match self {
            WordWidth::W32 => (v as u32) as i32 as i64,
            WordWidth::W64 => v as i64,
        }
    }
}

/// Byte order of the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// A read-only, random-access byte source over a target's address space.
pub trait MemoryView {
    /// Read one machine word at `addr`, interpreted per `width` and
    /// `endian`. Fails if `addr` lies outside any mapped region.
    fn read_word(&self, addr: u64, width: WordWidth, endian: Endian) -> Result<u64, ExpressionError>;
}

/// The OS-provided primitive for reading a word out of a live process's
/// address space, at the host's native word width. Callers supply their
/// own (e.g. `process_vm_readv`, `ptrace(PEEKDATA)`, a Mach task port
/// read, ...).
pub trait LiveTask {
    /// Reads one native-width word at `addr`. `Err(())` means `addr` is
    /// not mapped (or the read otherwise failed); the reason is not
    /// distinguished, matching the external contract.
    fn read_native_word(&self, addr: u64) -> Result<u64, ()>;
}

/// A [`MemoryView`] backed by a live, running task.
pub struct LiveTaskMemory<T: LiveTask> {
    task: T,
}

impl<T: LiveTask> LiveTaskMemory<T> {
    pub fn new(task: T) -> Self {
        Self { task }
    }
}

impl<T: LiveTask> MemoryView for LiveTaskMemory<T> {
    // Known gap: on a big-endian target read through a little-endian
    // host (or vice versa), this does not byte-swap. The historical C
    // implementation this is grounded on has the same gap (masks for a
    // 32-bit target, otherwise trusts the native read to already be in
    // host order) and leaves it as an open `FIXME`; `endian` is accepted
    // here for interface symmetry with `CoreImageMemory` but is not
    // consulted on this path.
    fn read_word(&self, addr: u64, width: WordWidth, _endian: Endian) -> Result<u64, ExpressionError> {
        let raw = self
            .task
            .read_native_word(addr)
            .map_err(|()| ExpressionError::MemoryRead(addr))?;
        Ok(width.wrap(raw))
    }
}

/// One loadable segment of a core image: a virtual address range backed
/// by bytes at `file_offset` within the image.
#[derive(Debug, Clone, Copy)]
pub struct CoreSegment {
    pub vaddr_start: u64,
    pub vaddr_end: u64,
    pub file_offset: u64,
}

fn segment_start(align: u64, start: u64) -> u64 {
    if align > 1 {
        start & !(align - 1)
    } else {
        start
    }
}

fn segment_end(align: u64, end: u64) -> u64 {
    if align > 1 {
        (end + align - 1) & !(align - 1)
    } else {
        end
    }
}

/// A [`MemoryView`] backed by a core-dump (or other snapshot) image: a
/// byte slice plus the loadable segments describing how virtual
/// addresses map into it.
pub struct CoreImageMemory<'d> {
    image: &'d [u8],
    segments: &'d [CoreSegment],
    segment_align: u64,
}

impl<'d> CoreImageMemory<'d> {
    pub fn new(image: &'d [u8], segments: &'d [CoreSegment], segment_align: u64) -> Self {
        Self {
            image,
            segments,
            segment_align,
        }
    }
}

impl<'d> MemoryView for CoreImageMemory<'d> {
    fn read_word(&self, addr: u64, width: WordWidth, endian: Endian) -> Result<u64, ExpressionError> {
        let bytes = width.bytes();
        for seg in self.segments {
            let start = segment_start(self.segment_align, seg.vaddr_start);
            let end = segment_end(self.segment_align, seg.vaddr_end);
            if addr < start || addr.checked_add(bytes).map_or(true, |e| e > end) {
                continue;
            }
            let file_off = seg.file_offset.wrapping_add(addr - start);
            let file_off = usize::try_from(file_off).map_err(|_| ExpressionError::MemoryRead(addr))?;
            let bytes_len = bytes as usize;
            let slice = self
                .image
                .get(file_off..file_off + bytes_len)
                .ok_or(ExpressionError::MemoryRead(addr))?;
            return Ok(decode_word(slice, endian));
        }
        Err(ExpressionError::MemoryRead(addr))
    }
}

fn decode_word(bytes: &[u8], endian: Endian) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    match endian {
        Endian::Little => u64::from_le_bytes(buf),
        Endian::Big => {
            // Right-align the big-endian bytes before decoding, since a
            // 4-byte word was copied into the low bytes of `buf`.
            let mut be_buf = [0u8; 8];
            be_buf[8 - bytes.len()..].copy_from_slice(bytes);
            u64::from_be_bytes(be_buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeTask(std::collections::HashMap<u64, u64>);
    impl LiveTask for FakeTask {
        fn read_native_word(&self, addr: u64) -> Result<u64, ()> {
            self.0.get(&addr).copied().ok_or(())
        }
    }

    #[test]
    fn live_task_masks_32_bit_reads() {
        let mut map = std::collections::HashMap::new();
        map.insert(0x1000, 0xdead_beef_1234_5678);
        let mem = LiveTaskMemory::new(FakeTask(map));
        let v = mem.read_word(0x1000, WordWidth::W32, Endian::Little).unwrap();
        assert_eq!(v, 0x1234_5678);
    }

    #[test]
    fn live_task_read_of_unmapped_address_fails() {
        let mem = LiveTaskMemory::new(FakeTask(std::collections::HashMap::new()));
        assert!(mem.read_word(0x42, WordWidth::W64, Endian::Little).is_err());
    }

    #[test]
    fn core_image_reads_within_segment() {
        let mut image = vec![0u8; 64];
        image[16..24].copy_from_slice(&0xdead_beef_u64.to_le_bytes());
        let segs = [CoreSegment {
            vaddr_start: 0x7fff_0000,
            vaddr_end: 0x7fff_0000 + 64,
            file_offset: 0,
        }];
        let mem = CoreImageMemory::new(&image, &segs, 1);
        let v = mem
            .read_word(0x7fff_0000 + 16, WordWidth::W64, Endian::Little)
            .unwrap();
        assert_eq!(v, 0xdead_beef);
    }

    #[test]
    fn core_image_read_straddling_segment_boundary_fails() {
        let image = vec![0u8; 32];
        let segs = [CoreSegment {
            vaddr_start: 0x1000,
            vaddr_end: 0x1004,
            file_offset: 0,
        }];
        let mem = CoreImageMemory::new(&image, &segs, 1);
        // The segment only covers 4 bytes; an 8-byte read at its start
        // straddles the boundary and must fail rather than read past it.
        assert!(mem
            .read_word(0x1000, WordWidth::W64, Endian::Little)
            .is_err());
    }
}
