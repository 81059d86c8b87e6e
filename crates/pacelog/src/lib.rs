//! Throttled output emitter.
//!
//! A [`ThrottledEmitter`] sits in front of a [`Sink`] and limits how often the
//! sink is invoked. Calls that arrive too soon are coalesced: only the most
//! recent payload is kept and it is written once the throttle window closes,
//! so a burst of progress updates always ends with the latest one on screen.
//!
//! ```no_run
//! use std::time::Duration;
//! use pacelog::{ConsoleSink, ThrottledEmitter};
//!
//! # async fn run() {
//! let progress = ThrottledEmitter::builder(ConsoleSink::stdout())
//!     .delay(Duration::from_millis(250))
//!     .build();
//!
//! for pct in 0..=100 {
//!     progress.emit(format!("downloaded {pct}%"));
//! }
//! progress.now("download complete".to_string());
//! # }
//! ```
//!
//! - `emitter` - the emitter, its builder and the deferred flush task
//! - `error` - construction errors

#![deny(unused_crate_dependencies)]

mod emitter;
mod error;

pub use emitter::{EmitterBuilder, ThrottledEmitter};
pub use error::EmitterError;

// Re-export core types for convenience
pub use pacelog_core::{
    ConsoleSink, ConsoleStream, DEFAULT_DELAY_MS, DEFAULT_SKIP_INITIAL, EmitterSettings, EnvFlags,
    FlagSource, NoopSink, SettingsError, Sink, StaticFlags,
};
