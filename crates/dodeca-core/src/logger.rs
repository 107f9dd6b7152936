//! Minimal stderr logger.
//!
//! Prints `[elapsed LEVEL #frame target] message`, where `#frame` is the index
//! of the frame the current thread is processing (see [`FrameScope`]) and is
//! omitted outside of one. Install it once at startup with `init_with_level`;
//! the `tracing` feature adds a `tracing-subscriber` alternative for span
//! timing of the per-frame stages.

use std::cell::Cell;
use std::fmt;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::EnvFilter;

thread_local! {
    static CURRENT_FRAME: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Tags log lines emitted on this thread with a frame index until dropped.
///
/// Scopes nest; dropping one restores the index that was active before it.
#[must_use = "the frame tag is removed when the scope is dropped"]
pub struct FrameScope {
    previous: Option<u64>,
}

impl FrameScope {
    pub fn enter(index: u64) -> Self {
        let previous = CURRENT_FRAME.with(|f| f.replace(Some(index)));
        Self { previous }
    }
}

impl Drop for FrameScope {
    fn drop(&mut self) {
        CURRENT_FRAME.with(|f| f.set(self.previous));
    }
}

/// Frame index tagged on the current thread, if any.
pub fn current_frame() -> Option<u64> {
    CURRENT_FRAME.with(Cell::get)
}

fn write_line(
    out: &mut impl Write,
    elapsed: f64,
    level: log::Level,
    frame: Option<u64>,
    target: &str,
    args: &fmt::Arguments<'_>,
) -> std::io::Result<()> {
    match frame {
        Some(i) => writeln!(out, "[{elapsed:8.3}s {level:>5} #{i} {target}] {args}"),
        None => writeln!(out, "[{elapsed:8.3}s {level:>5} {target}] {args}"),
    }
}

struct FrameLogger {
    level: LevelFilter,
    started: Instant,
}

impl Log for FrameLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = write_line(
            &mut stderr,
            elapsed,
            record.level(),
            current_frame(),
            record.target(),
            record.args(),
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<FrameLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| FrameLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Install a `tracing` subscriber reporting span close events.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .json()
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_timer(tracing_subscriber::fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(frame: Option<u64>) -> String {
        let mut out = Vec::new();
        write_line(
            &mut out,
            1.5,
            log::Level::Debug,
            frame,
            "dodeca_marker::tracker",
            &format_args!("skipped"),
        )
        .expect("write to vec");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn lines_carry_the_frame_tag_inside_a_scope() {
        assert_eq!(
            line(None),
            "[   1.500s DEBUG dodeca_marker::tracker] skipped\n"
        );
        assert_eq!(
            line(Some(42)),
            "[   1.500s DEBUG #42 dodeca_marker::tracker] skipped\n"
        );
    }

    #[test]
    fn frame_scopes_nest_and_restore() {
        assert_eq!(current_frame(), None);
        {
            let _outer = FrameScope::enter(3);
            assert_eq!(current_frame(), Some(3));
            {
                let _inner = FrameScope::enter(4);
                assert_eq!(current_frame(), Some(4));
            }
            assert_eq!(current_frame(), Some(3));
        }
        assert_eq!(current_frame(), None);
    }

    #[test]
    fn init_error_converts_into_a_boxed_error() {
        fn install() -> Result<(), Box<dyn std::error::Error>> {
            init_with_level(LevelFilter::Warn)?;
            Ok(())
        }
        install().expect("first install");
        install().expect("second install is a no-op");
    }
}
