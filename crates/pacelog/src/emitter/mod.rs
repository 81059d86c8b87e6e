//! The throttled emitter.
//!
//! # Design
//!
//! - All state sits behind one mutex per instance; the sink is invoked while
//!   it is held, so emissions from callers and from the deferred task are
//!   strictly ordered.
//! - At most one payload is buffered and at most one deferred flush is
//!   scheduled. They are set and cleared together.
//! - The deferred task holds a strong reference to the instance, so a
//!   buffered payload is still delivered after every handle is dropped.

mod builder;
mod deferred;
mod window;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pacelog_core::{EmitterSettings, FlagSource, Sink, validate_settings};
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

pub use builder::EmitterBuilder;

use deferred::DeferredFlush;
use window::{Admission, ThrottleWindow};

use crate::error::EmitterError;

/// Rate-limits writes to a sink, coalescing bursts to their latest payload.
///
/// Cloning yields another handle to the same emitter. Separately built
/// emitters never share timing or buffered payloads.
pub struct ThrottledEmitter<T> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    sink: Box<dyn Sink<T>>,
    flags: Box<dyn FlagSource>,
    runtime: Handle,
    state: Mutex<State<T>>,
}

struct State<T> {
    window: ThrottleWindow,
    pending: Option<T>,
    deferred: Option<DeferredFlush>,
}

impl<T> State<T> {
    fn cancel_deferred(&mut self) {
        if let Some(deferred) = self.deferred.take() {
            deferred.cancel();
        }
    }
}

impl<T: Send + 'static> ThrottledEmitter<T> {
    /// Create an emitter with default settings (1000 ms, `skip_initial`).
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime context.
    pub fn new(sink: impl Sink<T> + 'static) -> Self {
        Self::builder(sink).build()
    }

    /// Start building an emitter around `sink`.
    pub fn builder(sink: impl Sink<T> + 'static) -> EmitterBuilder<T> {
        EmitterBuilder::new(sink)
    }

    /// Create an emitter from validated settings on the ambient runtime.
    pub fn from_settings(
        settings: &EmitterSettings,
        sink: impl Sink<T> + 'static,
    ) -> Result<Self, EmitterError> {
        validate_settings(settings)?;
        Self::builder(sink)
            .delay(settings.effective_delay())
            .skip_initial(settings.effective_skip_initial())
            .try_build()
    }

    fn assemble(
        sink: Box<dyn Sink<T>>,
        flags: Box<dyn FlagSource>,
        delay: Duration,
        skip_initial: bool,
        runtime: Handle,
    ) -> Self {
        let window = ThrottleWindow::new(delay, skip_initial);
        debug!(delay = ?window.delay(), skip_initial, "Created throttled emitter");

        Self {
            shared: Arc::new(Shared {
                sink,
                flags,
                runtime,
                state: Mutex::new(State {
                    window,
                    pending: None,
                    deferred: None,
                }),
            }),
        }
    }

    /// Offer a payload.
    ///
    /// Written immediately if more than `delay` has passed since the last
    /// write; otherwise buffered (replacing any earlier buffered payload) and
    /// written when the current window closes. Never blocks on the timer.
    pub fn emit(&self, payload: T) {
        let mut state = self.shared.lock();
        let now = Instant::now();

        match state.window.admit(now) {
            Admission::Immediate => {
                trace!("Writing payload immediately");
                self.shared.sink.write(payload);
                state.cancel_deferred();
                state.pending = None;
                state.window.mark(now);
            }
            Admission::Deferred { deadline } => {
                let replaced = state.pending.replace(payload).is_some();
                trace!(replaced, "Buffered payload");

                if state.deferred.is_none() {
                    let wait = deadline.saturating_duration_since(now);
                    debug!(?wait, "Scheduling deferred flush");
                    state.deferred = Some(Shared::schedule(&self.shared, deadline));
                }
            }
        }
    }

    /// Write any buffered payload now and restart the throttle window.
    ///
    /// The window restarts even when nothing was buffered.
    pub fn flush(&self) {
        let mut state = self.shared.lock();
        self.shared.flush_locked(&mut state);
    }

    /// Flush, then write `payload` without throttling.
    ///
    /// The buffered payload (if any) is written first, so ordering is kept.
    /// The throttle window is restarted by the flush only; the direct write
    /// of `payload` does not move it again.
    pub fn now(&self, payload: T) {
        let mut state = self.shared.lock();
        self.shared.flush_locked(&mut state);
        trace!("Writing payload unthrottled");
        self.shared.sink.write(payload);
    }

    /// Behave like [`emit`](Self::emit) if `flag` is set, otherwise do nothing.
    ///
    /// The flag is looked up on every call.
    pub fn debug(&self, flag: &str, payload: T) {
        if self.shared.flags.is_set(flag) {
            self.emit(payload);
        }
    }
}

impl<T> ThrottledEmitter<T> {
    /// Whether a payload is waiting for the window to close.
    pub fn has_pending(&self) -> bool {
        self.shared.lock().pending.is_some()
    }

    /// When the scheduled deferred flush will fire, if one is scheduled.
    pub fn next_flush_at(&self) -> Option<Instant> {
        self.shared.lock().deferred.as_ref().map(DeferredFlush::deadline)
    }

    /// When the throttle window last restarted.
    pub fn last_emit_at(&self) -> Option<Instant> {
        self.shared.lock().window.last_emit()
    }

    /// Minimum interval between writes.
    pub fn delay(&self) -> Duration {
        self.shared.lock().window.delay()
    }

    /// Whether the first call seeds the window instead of writing.
    pub fn skip_initial(&self) -> bool {
        self.shared.lock().window.skip_initial()
    }
}

impl<T> Clone for ThrottledEmitter<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for ThrottledEmitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("ThrottledEmitter")
            .field("delay", &state.window.delay())
            .field("skip_initial", &state.window.skip_initial())
            .field("last_emit", &state.window.last_emit())
            .field("has_pending", &state.pending.is_some())
            .field("next_flush_at", &state.deferred.as_ref().map(DeferredFlush::deadline))
            .finish()
    }
}

impl<T> Shared<T> {
    /// Lock the state, ignoring poisoning left by a panicking sink.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush_locked(&self, state: &mut State<T>) {
        state.cancel_deferred();
        let had_pending = match state.pending.take() {
            Some(payload) => {
                self.sink.write(payload);
                true
            }
            None => false,
        };
        state.window.mark(Instant::now());
        trace!(had_pending, "Flushed");
    }
}

impl<T: Send + 'static> Shared<T> {
    fn schedule(shared: &Arc<Self>, deadline: Instant) -> DeferredFlush {
        let target = Arc::clone(shared);
        DeferredFlush::schedule(&shared.runtime, deadline, move |token| {
            target.fire(token);
        })
    }

    fn fire(&self, token: &CancellationToken) {
        let mut state = self.lock();
        // A flush or immediate write may have won the race for the lock.
        if token.is_cancelled() {
            return;
        }
        self.flush_locked(&mut state);
    }
}
