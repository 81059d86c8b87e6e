//! Emitter construction.

use std::time::Duration;

use pacelog_core::{DEFAULT_DELAY_MS, DEFAULT_SKIP_INITIAL, EnvFlags, FlagSource, Sink};
use tokio::runtime::Handle;

use super::ThrottledEmitter;
use crate::error::EmitterError;

/// Builder for a [`ThrottledEmitter`].
///
/// Defaults: 1000 ms delay, `skip_initial = true`, debug flags read from the
/// process environment, deferred flushes spawned on the ambient runtime.
///
/// # Example
///
/// ```rust,ignore
/// let emitter = ThrottledEmitter::builder(ConsoleSink::stderr())
///     .delay(Duration::from_millis(500))
///     .skip_initial(false)
///     .flags(StaticFlags::new().with("VERBOSE"))
///     .build();
/// ```
pub struct EmitterBuilder<T> {
    sink: Box<dyn Sink<T>>,
    flags: Box<dyn FlagSource>,
    delay: Duration,
    skip_initial: bool,
    runtime: Option<Handle>,
}

impl<T: Send + 'static> EmitterBuilder<T> {
    pub(crate) fn new(sink: impl Sink<T> + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            flags: Box::new(EnvFlags),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            skip_initial: DEFAULT_SKIP_INITIAL,
            runtime: None,
        }
    }

    /// Minimum interval between sink invocations.
    ///
    /// Values above 24 hours are clamped.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Whether the first call only seeds the throttle window.
    pub fn skip_initial(mut self, skip_initial: bool) -> Self {
        self.skip_initial = skip_initial;
        self
    }

    /// Source consulted by [`ThrottledEmitter::debug`].
    pub fn flags(mut self, flags: impl FlagSource + 'static) -> Self {
        self.flags = Box::new(flags);
        self
    }

    /// Runtime that deferred flushes are spawned on.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the emitter.
    ///
    /// # Panics
    ///
    /// Panics if no runtime was set and this is called outside a tokio
    /// runtime context, like `tokio::spawn`. Use [`try_build`](Self::try_build)
    /// to get an error instead.
    pub fn build(self) -> ThrottledEmitter<T> {
        let runtime = self.runtime.clone().unwrap_or_else(Handle::current);
        self.finish(runtime)
    }

    /// Build the emitter, failing if no runtime is available.
    pub fn try_build(self) -> Result<ThrottledEmitter<T>, EmitterError> {
        let runtime = match &self.runtime {
            Some(handle) => handle.clone(),
            None => Handle::try_current().map_err(|_| EmitterError::NoRuntime)?,
        };
        Ok(self.finish(runtime))
    }

    fn finish(self, runtime: Handle) -> ThrottledEmitter<T> {
        ThrottledEmitter::assemble(
            self.sink,
            self.flags,
            self.delay,
            self.skip_initial,
            runtime,
        )
    }
}
