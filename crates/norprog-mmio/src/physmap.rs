//! Physical memory mapping of the flash window
//!
//! Maps the flash device's physical address window through /dev/mem so its
//! command, status and array locations can be accessed with volatile 16-bit
//! loads and stores.
//!
//! # Safety
//!
//! Accessing physical memory is inherently unsafe and requires root
//! privileges. The mapping is page aligned internally and every access is
//! bounds checked against the requested size.

use crate::error::{MmioError, Result};

/// A mapped region of physical memory
#[cfg(target_os = "linux")]
#[derive(Debug)]
pub struct PhysMap {
    /// Pointer to the first requested byte (not the page start)
    ptr: *mut u8,
    /// Size requested by the caller
    size: usize,
    /// Size of the page-aligned mapping
    map_size: usize,
    /// Physical address (for error reporting)
    phys_addr: u64,
}

#[cfg(target_os = "linux")]
impl PhysMap {
    /// Map `size` bytes of physical memory starting at `phys_addr`
    ///
    /// The caller must ensure that the range is the flash window of a
    /// device nothing else is driving.
    pub fn new(phys_addr: u64, size: usize) -> Result<Self> {
        use std::fs::OpenOptions;
        use std::os::unix::fs::OpenOptionsExt;
        use std::os::unix::io::AsRawFd;

        // O_SYNC for uncached access, required for device registers
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open("/dev/mem")?;

        let page_mask = page_size() - 1;
        let offset = (phys_addr as usize) & page_mask;
        let aligned_addr = phys_addr & !(page_mask as u64);
        let map_size = (size + offset + page_mask) & !page_mask;

        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                map_size,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                aligned_addr as libc::off_t,
            )
        };

        if ptr == libc::MAP_FAILED {
            return Err(MmioError::MemoryMap {
                address: phys_addr,
                size,
            });
        }

        log::debug!(
            "Mapped {:#x} bytes at physical {:#x} ({:#x} with alignment)",
            size,
            phys_addr,
            map_size
        );

        Ok(Self {
            ptr: unsafe { (ptr as *mut u8).add(offset) },
            size,
            map_size,
            phys_addr,
        })
    }

    /// Read a 16-bit value, or `None` if `offset` is outside the mapping
    /// or not 16-bit aligned
    #[inline]
    pub fn read16(&self, offset: usize) -> Option<u16> {
        if !self.fits16(offset) {
            return None;
        }
        Some(unsafe { core::ptr::read_volatile(self.ptr.add(offset) as *const u16) })
    }

    /// Write a 16-bit value; returns false if `offset` is outside the
    /// mapping or not 16-bit aligned
    #[inline]
    pub fn write16(&self, offset: usize, value: u16) -> bool {
        if !self.fits16(offset) {
            return false;
        }
        unsafe { core::ptr::write_volatile(self.ptr.add(offset) as *mut u16, value) };
        true
    }

    fn fits16(&self, offset: usize) -> bool {
        offset & 1 == 0 && offset.checked_add(2).is_some_and(|end| end <= self.size)
    }

    /// Get the physical address of this mapping
    pub fn phys_addr(&self) -> u64 {
        self.phys_addr
    }

    /// Get the size of this mapping
    pub fn size(&self) -> usize {
        self.size
    }
}

#[cfg(target_os = "linux")]
impl Drop for PhysMap {
    fn drop(&mut self) {
        let page_mask = page_size() - 1;
        let offset = (self.phys_addr as usize) & page_mask;
        unsafe {
            let original_ptr = self.ptr.sub(offset);
            libc::munmap(original_ptr as *mut libc::c_void, self.map_size);
        }
    }
}

#[cfg(target_os = "linux")]
fn page_size() -> usize {
    unsafe { libc::sysconf(libc::_SC_PAGESIZE) as usize }
}

// The mapping points at device registers, not Rust-owned memory
#[cfg(target_os = "linux")]
unsafe impl Send for PhysMap {}

// Stub for non-Linux platforms
#[cfg(not(target_os = "linux"))]
#[derive(Debug)]
pub struct PhysMap {
    _private: (),
}

#[cfg(not(target_os = "linux"))]
impl PhysMap {
    /// Physical mapping is unavailable on this platform
    pub fn new(_phys_addr: u64, _size: usize) -> Result<Self> {
        Err(MmioError::NotSupported)
    }

    /// Always `None`
    pub fn read16(&self, _offset: usize) -> Option<u16> {
        None
    }

    /// Always false
    pub fn write16(&self, _offset: usize, _value: u16) -> bool {
        false
    }

    /// Always 0
    pub fn phys_addr(&self) -> u64 {
        0
    }

    /// Always 0
    pub fn size(&self) -> usize {
        0
    }
}
