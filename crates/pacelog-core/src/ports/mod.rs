//! Port definitions (trait abstractions) for external collaborators.
//!
//! An emitter depends on two things it does not implement itself: somewhere
//! to write payloads, and a way to ask whether a named debug flag is on.
//! Both are expressed as `Send + Sync` traits so emitters can hand them to
//! background timer tasks.

mod flags;
mod sink;

pub use flags::{EnvFlags, FlagSource, StaticFlags};
#[cfg(any(test, feature = "test-utils"))]
pub use flags::MockFlagSource;
pub use sink::{ConsoleSink, ConsoleStream, NoopSink, Sink};
