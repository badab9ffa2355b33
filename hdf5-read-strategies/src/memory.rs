//! Whole-process resident set size.
//!
//! The numbers include every allocation in the process, not just the read being
//! measured. Use the subprocess runner when that noise matters.

use crate::Result;

const MIB: f64 = (1 << 20) as f64;

/// Resident set size of the current process, in bytes.
#[cfg(target_os = "linux")]
pub fn resident_set_size() -> Result<u64> {
    // statm: size resident shared text lib data dt, in pages
    let statm = std::fs::read_to_string("/proc/self/statm")?;
    let resident_pages: u64 = statm
        .split_whitespace()
        .nth(1)
        .and_then(|field| field.parse().ok())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("malformed /proc/self/statm: {statm:?}"),
            )
        })?;
    Ok(resident_pages * page_size())
}

/// Peak resident set size of the current process, in bytes.
/// `getrusage` does not expose the current value outside Linux.
#[cfg(not(target_os = "linux"))]
pub fn resident_set_size() -> Result<u64> {
    let mut usage = std::mem::MaybeUninit::<libc::rusage>::uninit();
    let ret = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if ret != 0 {
        return Err(std::io::Error::last_os_error().into());
    }
    let usage = unsafe { usage.assume_init() };
    let maxrss = u64::try_from(usage.ru_maxrss).unwrap_or(0);
    // macOS reports bytes, the BSDs KiB
    if cfg!(target_os = "macos") {
        Ok(maxrss)
    } else {
        Ok(maxrss * 1024)
    }
}

#[cfg(target_os = "linux")]
fn page_size() -> u64 {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    u64::try_from(size).unwrap_or(4096)
}

/// `after - before` in MiB. Negative when the process shrank.
pub fn delta_mib(before: u64, after: u64) -> f64 {
    (after as f64 - before as f64) / MIB
}
