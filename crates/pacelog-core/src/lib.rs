//! Core port definitions and settings for pacelog.
//!
//! This crate holds everything a throttled emitter talks to without owning
//! a runtime:
//! - `ports` - the output sink and named-flag lookup abstractions
//! - `settings` - emitter configuration, validation and env loading
//!
//! The timer-driven emitter itself lives in the `pacelog` crate.

#![deny(unused_crate_dependencies)]

pub mod ports;
pub mod settings;

pub use ports::{ConsoleSink, ConsoleStream, EnvFlags, FlagSource, NoopSink, Sink, StaticFlags};
#[cfg(any(test, feature = "test-utils"))]
pub use ports::MockFlagSource;
pub use settings::{
    DEFAULT_DELAY_MS, DEFAULT_SKIP_INITIAL, DELAY_ENV_VAR, EmitterSettings, MAX_DELAY_MS,
    SKIP_INITIAL_ENV_VAR, SettingsError, validate_settings,
};
