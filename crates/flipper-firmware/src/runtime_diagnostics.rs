use std::thread;
use std::time::Duration;

use esp_idf_svc::hal::cpu::Core;
use esp_idf_svc::hal::task::thread::ThreadSpawnConfiguration;
use esp_idf_svc::sys;

const MEMORY_LOG_INTERVAL: Duration = Duration::from_secs(5);
const LOW_MEMORY_LOG_INTERVAL: Duration = Duration::from_secs(1);
/// Free heap below which the monitor logs every second.
const LOW_MEMORY_THRESHOLD: u32 = 20 * 1024;
const MEMORY_MONITOR_STACK_BYTES: usize = 4 * 1024;
const BACKGROUND_THREAD_PRIORITY: u8 = 1;

#[derive(Debug, Clone, Copy)]
struct HeapStats {
    free: u32,
    min_free: u32,
    largest_block: usize,
    total: usize,
}

impl HeapStats {
    fn read() -> Self {
        unsafe {
            Self {
                free: sys::esp_get_free_heap_size(),
                min_free: sys::esp_get_minimum_free_heap_size(),
                largest_block: sys::heap_caps_get_largest_free_block(sys::MALLOC_CAP_8BIT),
                total: sys::heap_caps_get_total_size(sys::MALLOC_CAP_8BIT),
            }
        }
    }

    fn usage_percent(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        let used = self.total.saturating_sub(self.free as usize);
        used as f32 * 100.0 / self.total as f32
    }

    fn is_low(&self) -> bool {
        self.free < LOW_MEMORY_THRESHOLD
    }
}

/// Log heap usage statistics.
pub fn log_heap(label: &str) {
    let stats = HeapStats::read();
    log::info!(
        "[MEM] {}: free={} min_free={} largest={} heap={} used={:.1}%{}",
        label,
        stats.free,
        stats.min_free,
        stats.largest_block,
        stats.total,
        stats.usage_percent(),
        if stats.is_low() { " [LOW MEMORY!]" } else { "" }
    );
}

/// Log heap statistics forever: every 5 s, every second when memory is low.
pub fn spawn_memory_monitor() {
    let spawned = thread::Builder::new()
        .name("mem-monitor".into())
        .stack_size(MEMORY_MONITOR_STACK_BYTES)
        .spawn(|| loop {
            log_heap("monitor");
            let interval = if HeapStats::read().is_low() {
                LOW_MEMORY_LOG_INTERVAL
            } else {
                MEMORY_LOG_INTERVAL
            };
            thread::sleep(interval);
        });

    if let Err(err) = spawned {
        log::warn!("Failed to start memory monitor: {}", err);
    }
}

/// Threads spawned after this run on core 0 at low priority, leaving core 1
/// to the input loop.
pub fn configure_background_threads() {
    let config = ThreadSpawnConfiguration {
        priority: BACKGROUND_THREAD_PRIORITY,
        inherit: false,
        pin_to_core: Some(Core::Core0),
        ..Default::default()
    };

    if let Err(err) = config.set() {
        log::warn!("Failed to configure pthread defaults: {}", err);
    } else {
        log::info!(
            "Background threads: priority={} core=0",
            config.priority
        );
    }
}

pub fn restore_thread_defaults() {
    if let Err(err) = ThreadSpawnConfiguration::default().set() {
        log::warn!("Failed to restore pthread defaults: {}", err);
    }
}
