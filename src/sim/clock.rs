//! Shared animation clock
//!
//! Multiplexes any number of per-frame listeners onto a single frame request.
//! The clock only tracks *which* listeners are subscribed; the owner
//! dispatches each key returned by [`AnimationClock::begin_tick`]. Iterating
//! that snapshot lets listeners subscribe or unsubscribe mid-tick safely.

use std::collections::BTreeSet;

/// Handle of a pending frame request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

/// Host primitive that delivers a callback on the next frame
pub trait FrameSource {
    /// `None` when the host could not schedule a frame
    fn request_frame(&mut self) -> Option<FrameHandle>;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Frame source driven by hand (native runs and tests)
#[derive(Debug, Default)]
pub struct ManualFrameSource {
    next: i32,
    outstanding: Option<FrameHandle>,
    requests: u32,
}

impl ManualFrameSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending request, if the host would fire a frame now
    pub fn outstanding(&self) -> Option<FrameHandle> {
        self.outstanding
    }

    /// Total requests issued
    pub fn requests(&self) -> u32 {
        self.requests
    }
}

impl FrameSource for ManualFrameSource {
    fn request_frame(&mut self) -> Option<FrameHandle> {
        self.next += 1;
        self.requests += 1;
        let handle = FrameHandle(self.next);
        self.outstanding = Some(handle);
        Some(handle)
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.outstanding == Some(handle) {
            self.outstanding = None;
        }
    }
}

/// Per-frame scheduler shared by every motion system
///
/// Outside a tick, a frame request is pending iff at least one listener is
/// subscribed.
pub struct AnimationClock<K> {
    source: Box<dyn FrameSource>,
    pending: Option<FrameHandle>,
    listeners: BTreeSet<K>,
    in_tick: bool,
}

impl<K: Ord + Copy> AnimationClock<K> {
    pub fn new(source: Box<dyn FrameSource>) -> Self {
        Self {
            source,
            pending: None,
            listeners: BTreeSet::new(),
            in_tick: false,
        }
    }

    /// Subscribe a listener; starts the frame loop for the first one
    pub fn add(&mut self, listener: K) {
        self.listeners.insert(listener);
        self.ensure_running();
    }

    /// Unsubscribe a listener; stops the frame loop when none remain.
    /// Unknown listeners are ignored.
    pub fn remove(&mut self, listener: K) {
        self.listeners.remove(&listener);
        if self.listeners.is_empty() {
            self.stop();
        }
    }

    pub fn contains(&self, listener: K) -> bool {
        self.listeners.contains(&listener)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Whether a frame request is outstanding
    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    /// Called when the host frame fires. Returns the listeners to invoke this
    /// frame; listeners added before [`end_tick`](Self::end_tick) wait for the
    /// next frame.
    pub fn begin_tick(&mut self) -> Vec<K> {
        // The request that brought us here has been consumed
        self.pending = None;
        self.in_tick = true;
        self.listeners.iter().copied().collect()
    }

    /// Requests the next frame if anyone is still listening
    pub fn end_tick(&mut self) {
        self.in_tick = false;
        self.ensure_running();
    }

    fn ensure_running(&mut self) {
        if self.in_tick || self.pending.is_some() || self.listeners.is_empty() {
            return;
        }
        self.pending = self.source.request_frame();
        if self.pending.is_none() {
            log::warn!("Frame request failed; retrying on next subscription");
        }
    }

    fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.source.cancel_frame(handle);
        }
    }
}
