//! Background panel flushing with request coalescing.
//!
//! Drawing code marks the frame dirty with [`RenderQueue::request_refresh`],
//! which never waits on the queue. A dedicated worker drains every pending
//! request, takes the display lock and flushes once. When the queue cannot be
//! set up the subsystem settles on a synchronous path that flushes inside the
//! request instead.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::Duration;

use crate::display_lock::{DisplayGuard, DisplayLock};
use crate::panel::{NoIndicator, Panel, StatusIndicator};

/// Refresh tokens the queue can hold before requests are dropped.
pub const RENDER_QUEUE_DEPTH: usize = 256;
/// Pause before a partial black/white e-paper flush.
pub const RENDER_QUEUE_SETTLE_MS: u64 = 200;

const RENDER_WORKER_STACK_BYTES: usize = 8 * 1024;

/// E-paper colour configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    BlackWhite,
    ThreeColor,
}

/// Which panels the device drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// SSD1306 only.
    Oled,
    /// E-paper only.
    EPaper { color: ColorMode, full_update: bool },
    /// OLED as the primary, e-paper as a debounced secondary.
    Dual { color: ColorMode, full_update: bool },
}

impl DisplayMode {
    /// Settle delay applied by the render worker before each flush.
    pub fn settle_delay(&self) -> Option<Duration> {
        match *self {
            DisplayMode::Oled => None,
            DisplayMode::EPaper { color, full_update } | DisplayMode::Dual { color, full_update } => {
                (color == ColorMode::BlackWhite && !full_update)
                    .then(|| Duration::from_millis(RENDER_QUEUE_SETTLE_MS))
            }
        }
    }

    pub fn has_secondary(&self) -> bool {
        matches!(self, DisplayMode::Dual { .. })
    }
}

/// Render worker configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Zero means no queue: every request flushes synchronously.
    pub queue_depth: usize,
    pub settle: Option<Duration>,
    pub worker_name: &'static str,
    pub worker_stack: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            queue_depth: RENDER_QUEUE_DEPTH,
            settle: None,
            worker_name: "render-queue",
            worker_stack: RENDER_WORKER_STACK_BYTES,
        }
    }
}

impl RenderConfig {
    pub fn for_mode(mode: DisplayMode) -> Self {
        Self {
            settle: mode.settle_delay(),
            ..Self::default()
        }
    }
}

enum RenderPath {
    Queued(SyncSender<()>),
    Synchronous,
}

struct Shared<P> {
    lock: DisplayLock<P>,
    status: Arc<dyn StatusIndicator>,
    busy: AtomicBool,
    pending: AtomicUsize,
    /// A flush was requested while this thread still had the panel borrowed.
    deferred: AtomicBool,
}

impl<P: Panel> Shared<P> {
    fn flush(&self, guard: &DisplayGuard<'_, P>) {
        let Some(mut panel) = guard.try_panel() else {
            log::debug!("Panel still borrowed by the caller, flush deferred");
            self.deferred.store(true, Ordering::Release);
            return;
        };
        self.deferred.store(false, Ordering::Release);
        self.status.set_busy();
        if let Err(err) = panel.flush() {
            log::warn!("Panel flush failed: {:?}", err);
        }
        self.status.set_ready();
    }

    fn take_token(&self) {
        self.pending.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Owns the shared panel, its lock and the render worker.
pub struct RenderQueue<P: Panel + 'static> {
    shared: Arc<Shared<P>>,
    config: RenderConfig,
    path: OnceLock<RenderPath>,
}

impl<P: Panel + 'static> RenderQueue<P> {
    pub fn new(panel: P, config: RenderConfig) -> Self {
        Self::with_status(panel, config, Arc::new(NoIndicator))
    }

    pub fn with_status(panel: P, config: RenderConfig, status: Arc<dyn StatusIndicator>) -> Self {
        Self {
            shared: Arc::new(Shared {
                lock: DisplayLock::new(panel),
                status,
                busy: AtomicBool::new(false),
                pending: AtomicUsize::new(0),
                deferred: AtomicBool::new(false),
            }),
            config,
            path: OnceLock::new(),
        }
    }

    /// Start the render worker. Only the first call (from any thread) does
    /// anything.
    pub fn init(&self) {
        self.path();
    }

    /// Mark the frame dirty. Never waits for the queue; a full queue drops the
    /// request because the pending flush will show the current frame anyway.
    pub fn request_refresh(&self) {
        match self.path() {
            RenderPath::Queued(tokens) => {
                self.shared.pending.fetch_add(1, Ordering::AcqRel);
                match tokens.try_send(()) {
                    Ok(()) => {}
                    Err(TrySendError::Full(())) => {
                        self.shared.take_token();
                        log::debug!("Render queue full, request dropped");
                    }
                    Err(TrySendError::Disconnected(())) => {
                        self.shared.take_token();
                        log::warn!("Render worker gone, flushing synchronously");
                        self.flush_now();
                    }
                }
            }
            RenderPath::Synchronous => self.flush_now(),
        }
    }

    /// Complete a synchronous flush that was requested while the panel was
    /// still borrowed. The shell calls this once per loop iteration.
    pub fn flush_deferred(&self) {
        if self.shared.deferred.load(Ordering::Acquire) {
            self.flush_now();
        }
    }

    /// A physical flush is executing (or waiting for the lock to execute).
    pub fn is_render_busy(&self) -> bool {
        self.shared.busy.load(Ordering::Acquire)
    }

    /// At least one refresh token is waiting for the worker.
    pub fn is_render_pending(&self) -> bool {
        self.shared.pending.load(Ordering::Acquire) > 0
    }

    /// Whether requests go through the background worker.
    pub fn is_queued(&self) -> bool {
        matches!(self.path.get(), Some(RenderPath::Queued(_)))
    }

    pub fn lock(&self) -> &DisplayLock<P> {
        &self.shared.lock
    }

    pub fn status(&self) -> &dyn StatusIndicator {
        self.shared.status.as_ref()
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn path(&self) -> &RenderPath {
        self.path.get_or_init(|| self.start())
    }

    fn start(&self) -> RenderPath {
        if self.config.queue_depth == 0 {
            log::warn!("Render queue unavailable, flushing synchronously");
            return RenderPath::Synchronous;
        }

        let (tokens, receiver) = mpsc::sync_channel(self.config.queue_depth);
        let shared = Arc::clone(&self.shared);
        let settle = self.config.settle;
        let spawned = thread::Builder::new()
            .name(self.config.worker_name.into())
            .stack_size(self.config.worker_stack)
            .spawn(move || render_worker(shared, receiver, settle));

        match spawned {
            Ok(_) => {
                log::info!(
                    "Render queue initialized: depth={} settle={:?}",
                    self.config.queue_depth,
                    settle
                );
                RenderPath::Queued(tokens)
            }
            Err(err) => {
                log::warn!("Failed to spawn render worker ({}), flushing synchronously", err);
                RenderPath::Synchronous
            }
        }
    }

    fn flush_now(&self) {
        self.shared.busy.store(true, Ordering::Release);
        let guard = self.shared.lock.acquire();
        self.shared.flush(&guard);
        drop(guard);
        self.shared.busy.store(false, Ordering::Release);
    }
}

/// Drain every token currently queued, returning how many were taken.
fn drain<P: Panel>(shared: &Shared<P>, tokens: &Receiver<()>) -> usize {
    let mut taken = 0;
    while tokens.try_recv().is_ok() {
        shared.take_token();
        taken += 1;
    }
    taken
}

// Runs until the owning RenderQueue drops its sender.
fn render_worker<P: Panel>(shared: Arc<Shared<P>>, tokens: Receiver<()>, settle: Option<Duration>) {
    while tokens.recv().is_ok() {
        shared.busy.store(true, Ordering::Release);
        shared.take_token();
        let mut coalesced = 1 + drain(&shared, &tokens);

        let guard = shared.lock.acquire();
        if let Some(settle) = settle {
            thread::sleep(settle);
        }
        // Requests made while waiting for the lock or settling are covered
        // by this flush.
        coalesced += drain(&shared, &tokens);
        log::debug!("Flushing panel for {} coalesced request(s)", coalesced);
        shared.flush(&guard);
        drop(guard);

        shared.busy.store(false, Ordering::Release);
    }
    log::info!("Render worker stopped");
}
