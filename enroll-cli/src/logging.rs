//! Tracing setup for the `enroll` binary.
//!
//! Console output goes to stderr so stdout carries only command output. A
//! log file can be attached after startup, and both the level and the
//! console can be adjusted at runtime through the functions below.

use anyhow::{Result, anyhow};
use chrono::Local;
use std::{
    fs::File,
    io::{self, IsTerminal, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError},
};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{
        FmtContext, MakeWriter,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
};

// ─── event format ────────────────────────────────────────────────────────────

const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

/// Writes `text` wrapped in `color` when the writer supports ANSI.
fn paint(
    writer: &mut Writer<'_>,
    color: &str,
    text: impl std::fmt::Display,
) -> std::fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{color}{text}{RESET} ")
    } else {
        write!(writer, "{text} ")
    }
}

/// `HH:MM:SS.mmm LEVEL target message`, local time.
struct ConsoleLine;

impl<S, N> FormatEvent<S, N> for ConsoleLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        paint(&mut writer, DIM, Local::now().format("%H:%M:%S%.3f"))?;
        paint(&mut writer, level_color(meta.level()), format_args!("{:>5}", meta.level()))?;
        paint(&mut writer, CYAN, meta.target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

// ─── log file ────────────────────────────────────────────────────────────────

type SharedFile = Arc<Mutex<Option<File>>>;

fn lock_file(file: &Mutex<Option<File>>) -> MutexGuard<'_, Option<File>> {
    file.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Writer for the file layer. Writes are dropped until a file is attached.
#[derive(Clone)]
struct FileSink(SharedFile);

struct FileSinkGuard<'a>(MutexGuard<'a, Option<File>>);

impl Write for FileSinkGuard<'_> {
    fn write(
        &mut self,
        buf: &[u8],
    ) -> io::Result<usize> {
        self.0.as_mut().map_or(Ok(buf.len()), |file| file.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.as_mut().map_or(Ok(()), |file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for FileSink {
    type Writer = FileSinkGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        FileSinkGuard(lock_file(&self.0))
    }
}

// ─── runtime controls ────────────────────────────────────────────────────────

type Reload<T> = Box<dyn Fn(T) -> Result<()> + Send + Sync>;

/// Handles kept after a successful `init_logging`.
struct Controls {
    level: Reload<String>,
    console: Reload<bool>,
    file: SharedFile,
}

static CONTROLS: OnceLock<Controls> = OnceLock::new();

fn controls() -> Result<&'static Controls> {
    CONTROLS
        .get()
        .ok_or_else(|| anyhow!("logging not yet initialized"))
}

fn reloader<S, T>(
    handle: reload::Handle<EnvFilter, S>,
    filter_for: impl Fn(T) -> Result<EnvFilter> + Send + Sync + 'static,
) -> Reload<T>
where
    S: Subscriber + Send + Sync + 'static,
    T: 'static,
{
    Box::new(move |value: T| {
        let filter = filter_for(value)?;
        handle
            .reload(filter)
            .map_err(|e| anyhow!("log filter reload failed: {e}"))
    })
}

/// `RUST_LOG` wins over the configured level.
fn initial_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Sets the global filter: a bare level or any `EnvFilter` directive.
pub fn set_log_level(level: &str) -> Result<()> {
    (controls()?.level)(level.to_string())
}

/// Shows or hides console output. File logging is unaffected.
pub fn set_console_enabled(enabled: bool) -> Result<()> {
    (controls()?.console)(enabled)
}

/// Appends log output to `path`, replacing any file attached earlier. The
/// parent directory must exist.
pub fn enable_file_logging(path: &Path) -> Result<()> {
    let controls = controls()?;
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow!("cannot open log file '{}': {e}", path.display()))?;
    *lock_file(&controls.file) = Some(file);
    Ok(())
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(default_level: &str) {
    let file: SharedFile = Arc::new(Mutex::new(None));
    let (level_filter, level_handle) = reload::Layer::new(initial_filter(default_level));
    let (console_filter, console_handle) = reload::Layer::new(EnvFilter::new("trace"));

    let console = tracing_subscriber::fmt::layer()
        .event_format(ConsoleLine)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_filter(console_filter);
    let logfile = tracing_subscriber::fmt::layer()
        .event_format(ConsoleLine)
        .with_ansi(false)
        .with_writer(FileSink(file.clone()));

    let installed = tracing_subscriber::registry()
        .with(level_filter)
        .with(console)
        .with(logfile)
        .try_init();
    if installed.is_err() {
        return;
    }

    let _ = CONTROLS.set(Controls {
        level: reloader(level_handle, |level: String| {
            EnvFilter::try_new(&level).map_err(|e| anyhow!("invalid log level '{level}': {e}"))
        }),
        // The global filter still caps what the console sees.
        console: reloader(console_handle, |enabled: bool| {
            Ok(EnvFilter::new(if enabled { "trace" } else { "off" }))
        }),
        file,
    });
}
