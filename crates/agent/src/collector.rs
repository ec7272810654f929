//! sysinfo-based host resource collection.
//!
//! [`SystemCollector`] samples global CPU utilization over a fixed
//! one-second window, then reads memory and root-filesystem usage as
//! instantaneous values.
//!
//! Disk usage is `used / (used + available)` where `used = total - free`.
//! Blocks reserved for root count neither as used nor as available, so a
//! full-for-users filesystem reads 100%.
//!
//! Sampling is trusted not to fail. If the root filesystem cannot be read
//! (e.g. an unusual container layout) disk usage is reported as 0% and a
//! warning is logged instead of aborting the cycle.

use std::time::Duration;

use async_trait::async_trait;
use sysinfo::System;

use hostwatch_core::sample::ResourceUsage;

/// Observation window for the CPU utilization measurement.
pub const CPU_SAMPLE_WINDOW: Duration = Duration::from_secs(1);

/// Mount point whose usage is reported as disk utilization.
const ROOT_MOUNT: &str = "/";

/// Source of host resource utilization for the monitor loop.
#[async_trait]
pub trait ResourceSampler: Send {
    /// Measure CPU, memory and disk utilization.
    ///
    /// Completes no sooner than the CPU observation window.
    async fn sample(&mut self) -> ResourceUsage;
}

/// Reads utilization from the local host via `sysinfo`.
pub struct SystemCollector {
    system: System,
    cpu_window: Duration,
}

impl Default for SystemCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCollector {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            cpu_window: CPU_SAMPLE_WINDOW.max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL),
        }
    }

    /// CPU usage in percent across all cores, measured over `cpu_window`.
    async fn cpu_percent(&mut self) -> f64 {
        // The first refresh only records a baseline; usage is the delta
        // between two refreshes.
        self.system.refresh_cpu_usage();
        tokio::time::sleep(self.cpu_window).await;
        self.system.refresh_cpu_usage();
        f64::from(self.system.global_cpu_usage())
    }

    fn memory_percent(&mut self) -> f64 {
        self.system.refresh_memory();
        percent(self.system.used_memory(), self.system.total_memory())
    }

    fn disk_percent(&self) -> f64 {
        match root_fs_stats() {
            Some(stats) => stats.used_percent(),
            None => {
                tracing::warn!(
                    mount_point = ROOT_MOUNT,
                    "Root filesystem stats unavailable -- reporting disk usage as 0%"
                );
                0.0
            }
        }
    }
}

/// Byte counts for one filesystem, as reported by `statvfs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStats {
    pub total: u64,
    /// Free blocks including those reserved for root.
    pub free: u64,
    /// Free blocks available to unprivileged users.
    pub available: u64,
}

impl FsStats {
    /// Used space as a percentage of the space users can actually fill.
    pub fn used_percent(&self) -> f64 {
        let used = self.total.saturating_sub(self.free);
        percent(used, used.saturating_add(self.available))
    }
}

#[cfg(unix)]
fn root_fs_stats() -> Option<FsStats> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;

    let c_path = CString::new(ROOT_MOUNT).ok()?;
    let mut stat = MaybeUninit::<libc::statvfs>::uninit();

    // Safety: `c_path` is NUL-terminated and `stat` is only read on success.
    let ret = unsafe { libc::statvfs(c_path.as_ptr(), stat.as_mut_ptr()) };
    if ret != 0 {
        return None;
    }
    let stat = unsafe { stat.assume_init() };

    let block_size = stat.f_frsize as u64;
    Some(FsStats {
        total: stat.f_blocks as u64 * block_size,
        free: stat.f_bfree as u64 * block_size,
        available: stat.f_bavail as u64 * block_size,
    })
}

/// Without `statvfs` the reserved/free split is unknown; treat all free
/// space as available.
#[cfg(not(unix))]
fn root_fs_stats() -> Option<FsStats> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .find(|disk| disk.mount_point().parent().is_none())?;
    Some(FsStats {
        total: disk.total_space(),
        free: disk.available_space(),
        available: disk.available_space(),
    })
}

#[async_trait]
impl ResourceSampler for SystemCollector {
    async fn sample(&mut self) -> ResourceUsage {
        let cpu_percent = self.cpu_percent().await;
        let memory_percent = self.memory_percent();
        let disk_percent = self.disk_percent();

        ResourceUsage {
            cpu_percent,
            memory_percent,
            disk_percent,
        }
    }
}

/// `used / total` as a percentage, or 0 when `total` is 0.
pub fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (used as f64 / total as f64) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_of_total() {
        assert_eq!(percent(50, 200), 25.0);
        assert_eq!(percent(200, 200), 100.0);
        assert_eq!(percent(0, 200), 0.0);
    }

    #[test]
    fn percent_with_zero_total_is_zero() {
        assert_eq!(percent(10, 0), 0.0);
    }

    #[test]
    fn disk_usage_excludes_reserved_blocks() {
        // 100 GiB volume, 20 GiB free of which 5 GiB are reserved for root.
        let stats = FsStats {
            total: 100 << 30,
            free: 20 << 30,
            available: 15 << 30,
        };
        // used = 80 GiB; 80 / (80 + 15)
        let expected = 80.0 / 95.0 * 100.0;
        assert!((stats.used_percent() - expected).abs() < 1e-9);
        assert!(stats.used_percent() < 85.0, "must not count reserved space as used");
    }

    #[test]
    fn disk_usage_without_reserved_blocks_is_used_over_total() {
        let stats = FsStats {
            total: 1000,
            free: 750,
            available: 750,
        };
        assert_eq!(stats.used_percent(), 25.0);
    }

    #[test]
    fn disk_full_for_users_reads_one_hundred_percent() {
        let stats = FsStats {
            total: 1000,
            free: 50,
            available: 0,
        };
        assert_eq!(stats.used_percent(), 100.0);
    }

    #[test]
    fn empty_filesystem_reads_zero() {
        let stats = FsStats {
            total: 0,
            free: 0,
            available: 0,
        };
        assert_eq!(stats.used_percent(), 0.0);
    }

    #[cfg(unix)]
    #[test]
    fn root_filesystem_stats_are_consistent() {
        let stats = root_fs_stats().expect("statvfs(\"/\") should succeed");
        assert!(stats.free <= stats.total);
        assert!(stats.available <= stats.free);
    }

    #[test]
    fn cpu_window_is_at_least_one_second() {
        let collector = SystemCollector::new();
        assert!(collector.cpu_window >= CPU_SAMPLE_WINDOW);
    }
}
