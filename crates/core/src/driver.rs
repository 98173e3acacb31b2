//! The frame loop.
//!
//! A host delivers [`HostEvent`]s (a frame is due, the viewport changed, the
//! view went away). [`AnimationDriver::run`] consumes them one at a time, so
//! a resize always completes between two ticks. Each tick clears the surface,
//! advances and draws every particle, then draws links from the updated
//! positions.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, trace};

use crate::backdrop::Backdrop;
use crate::error::BackdropError;
use crate::recipe::ScheduledResize;
use crate::surface::Surface;

/// Lifecycle of an [`AnimationDriver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverState {
    /// Created, no frame rendered yet.
    Idle,
    /// At least one frame rendered and not stopped.
    Running,
    /// Stop requested or host closed. Terminal.
    Stopped,
}

/// What one tick produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FrameStats {
    /// 1-based index of the frame just rendered.
    pub frame: u64,
    pub particles: usize,
    pub links: usize,
}

/// Cloneable cancellation flag for a running loop.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Events a host feeds the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// Time to render the next frame.
    Frame,
    /// The viewport now measures `width` x `height` pixels.
    Resize { width: u32, height: u32 },
    /// The view was torn down.
    Closed,
}

/// The host side of the loop: event source plus presentation hook.
pub trait FrameHost<S: Surface + ?Sized> {
    /// Blocks until the next event is available.
    fn next_event(&mut self) -> HostEvent;

    /// Called after every rendered frame with the surface in its final state.
    fn present(&mut self, _surface: &S, _stats: &FrameStats) -> Result<(), BackdropError> {
        Ok(())
    }
}

/// Owns the tick cadence and the Idle → Running → Stopped state machine.
#[derive(Debug)]
pub struct AnimationDriver {
    state: DriverState,
    frames: u64,
    stop: StopHandle,
}

impl Default for AnimationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationDriver {
    pub fn new() -> Self {
        Self {
            state: DriverState::Idle,
            frames: 0,
            stop: StopHandle::new(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// A handle that stops [`AnimationDriver::run`] before its next event.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Marks the driver stopped; hosts driving [`AnimationDriver::tick`]
    /// themselves check [`AnimationDriver::is_stopped`] before rescheduling.
    pub fn stop(&mut self) {
        self.stop.stop();
        self.state = DriverState::Stopped;
    }

    pub fn is_stopped(&self) -> bool {
        self.state == DriverState::Stopped || self.stop.is_stopped()
    }

    /// Renders one frame: clear, advance+draw particles, draw links.
    pub fn tick<S: Surface + ?Sized>(
        &mut self,
        backdrop: &mut Backdrop,
        surface: &mut S,
    ) -> FrameStats {
        if self.state == DriverState::Idle {
            self.state = DriverState::Running;
        }
        let dims = backdrop.dimensions();

        surface.clear();
        backdrop.field_mut().tick(dims, surface);
        let links = backdrop
            .linker()
            .connect(backdrop.field().particles(), dims, surface);

        self.frames += 1;
        let stats = FrameStats {
            frame: self.frames,
            particles: backdrop.particles().len(),
            links,
        };
        trace!(frame = stats.frame, particles = stats.particles, links, "frame rendered");
        stats
    }

    /// Consumes host events until the host closes or the stop handle fires.
    ///
    /// Returns the number of frames rendered by this call. A `present` error
    /// ends the loop and is returned as is.
    pub fn run<S, H>(
        &mut self,
        backdrop: &mut Backdrop,
        surface: &mut S,
        host: &mut H,
    ) -> Result<u64, BackdropError>
    where
        S: Surface + ?Sized,
        H: FrameHost<S> + ?Sized,
    {
        let start = self.frames;
        let result = loop {
            if self.is_stopped() {
                break Ok(());
            }
            match host.next_event() {
                HostEvent::Frame => {
                    let stats = self.tick(backdrop, surface);
                    if let Err(e) = host.present(surface, &stats) {
                        break Err(e);
                    }
                }
                HostEvent::Resize { width, height } => backdrop.resize(surface, width, height),
                HostEvent::Closed => break Ok(()),
            }
        };
        self.state = DriverState::Stopped;
        let rendered = self.frames - start;
        info!(frames = rendered, particles = backdrop.particles().len(), "frame loop ended");
        result.map(|()| rendered)
    }
}

/// Blocks the calling thread until the next frame slot at a fixed rate.
///
/// When a frame overruns its slot the schedule restarts from now instead of
/// rendering catch-up frames back to back.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    next: Option<Instant>,
}

impl FramePacer {
    /// `None` unless `fps` is positive and finite.
    pub fn new(fps: f64) -> Option<Self> {
        if !(fps.is_finite() && fps > 0.0) {
            return None;
        }
        Some(Self {
            interval: Duration::from_secs_f64(1.0 / fps),
            next: None,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn wait(&mut self) {
        let now = Instant::now();
        match self.next {
            Some(deadline) if deadline > now => {
                thread::sleep(deadline - now);
                self.next = Some(deadline + self.interval);
            }
            _ => self.next = Some(now + self.interval),
        }
    }
}

/// A host that plays back a fixed script: an initial size, a number of
/// frames, and resizes scheduled before given frames.
#[derive(Debug, Clone)]
pub struct ScriptedHost {
    initial: Option<(u32, u32)>,
    frames: u64,
    emitted: u64,
    resizes: VecDeque<ScheduledResize>,
    pacer: Option<FramePacer>,
}

impl ScriptedHost {
    /// `resizes[i].frame` is the 0-based frame index the resize precedes.
    pub fn new(width: u32, height: u32, frames: u64, mut resizes: Vec<ScheduledResize>) -> Self {
        resizes.sort_by_key(|r| r.frame);
        Self {
            initial: Some((width, height)),
            frames,
            emitted: 0,
            resizes: resizes.into(),
            pacer: None,
        }
    }

    /// Paces `Frame` events with a [`FramePacer`].
    pub fn with_pacer(mut self, pacer: Option<FramePacer>) -> Self {
        self.pacer = pacer;
        self
    }

    pub fn frames_emitted(&self) -> u64 {
        self.emitted
    }
}

impl<S: Surface + ?Sized> FrameHost<S> for ScriptedHost {
    fn next_event(&mut self) -> HostEvent {
        if let Some((width, height)) = self.initial.take() {
            return HostEvent::Resize { width, height };
        }
        if self.emitted >= self.frames {
            return HostEvent::Closed;
        }
        if self.resizes.front().is_some_and(|r| r.frame <= self.emitted) {
            if let Some(r) = self.resizes.pop_front() {
                return HostEvent::Resize {
                    width: r.width,
                    height: r.height,
                };
            }
        }
        if let Some(pacer) = self.pacer.as_mut() {
            pacer.wait();
        }
        self.emitted += 1;
        HostEvent::Frame
    }
}
