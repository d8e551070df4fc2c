//! Tracing subscriber: renders arbor's stage, dry-run and step events on
//! the console and into a per-command log file.
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::Level as TraceLevel;
use tracing::field::{Field, Visit};

use super::types::StepStatus;
use super::utils::log_file_path;

/// Target of stage headers.
pub(super) const STAGE: &str = "arbor::stage";
/// Target of dry-run previews.
pub(super) const DRY_RUN: &str = "arbor::dry_run";
/// Target of step summary lines, which carry `step`, `status` and
/// `detail` fields.
pub(super) const STEP: &str = "arbor::step";

/// Run context written at the top of the log file.
#[derive(Debug, Clone, Default)]
pub struct RunHeader {
    /// Subcommand name; also names the log file.
    pub command: String,
    /// Tree diagram or snapshot being read.
    pub source: Option<PathBuf>,
    /// Directory composed into, if any.
    pub target: Option<PathBuf>,
    /// Whether the run only previews changes.
    pub dry_run: bool,
}

impl RunHeader {
    /// Header for `command` without any paths.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            ..Self::default()
        }
    }

    fn render(&self) -> String {
        let version =
            option_env!("ARBOR_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let mut lines = vec![format!(
            "# arbor {version} {} at {}",
            self.command,
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )];
        if let Some(source) = &self.source {
            lines.push(format!("# source: {}", source.display()));
        }
        if let Some(target) = &self.target {
            lines.push(format!("# target: {}", target.display()));
        }
        if self.dry_run {
            lines.push("# dry run: nothing is written".to_string());
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// What kind of line an event turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Stage,
    DryRun,
    Step,
    Plain,
}

impl Channel {
    fn of(target: &str) -> Self {
        match target {
            STAGE => Self::Stage,
            DRY_RUN => Self::DryRun,
            STEP => Self::Step,
            _ => Self::Plain,
        }
    }
}

/// The fields arbor puts on its events.
#[derive(Debug, Default)]
struct EventFields {
    message: String,
    step: Option<String>,
    status: Option<String>,
    detail: Option<String>,
}

impl EventFields {
    fn of(event: &tracing::Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    fn set(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = value,
            "step" => self.step = Some(value),
            "status" => self.status = Some(value),
            "detail" => self.detail = Some(value),
            _ => {}
        }
    }

    /// `✓ name (detail)` for a step event, with the icon picked by status.
    fn step_line(&self, color: bool) -> String {
        let status = self
            .status
            .as_deref()
            .and_then(StepStatus::from_label)
            .unwrap_or(StepStatus::Skipped);
        let (icon, code) = match status {
            StepStatus::Ok => ("✓", "32"),
            StepStatus::Skipped => ("○", "33"),
            StepStatus::DryRun => ("~", "37"),
            StepStatus::Failed => ("✗", "31"),
        };
        let name = self.step.as_deref().unwrap_or(&self.message);
        let detail = self
            .detail
            .as_ref()
            .map_or_else(String::new, |d| format!(" ({d})"));
        paint(color, code, &format!("{icon} {name}{detail}"))
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.set(field.name(), format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.set(field.name(), value.to_string());
    }
}

fn paint(color: bool, code: &str, text: &str) -> String {
    if color {
        format!("\x1b[{code}m{text}\x1b[0m")
    } else {
        text.to_string()
    }
}

/// Console rendering of one event.
fn console_line(level: TraceLevel, channel: Channel, fields: &EventFields) -> String {
    let msg = &fields.message;
    match (channel, level) {
        (Channel::Step, _) => format!("  {}", fields.step_line(true)),
        (_, TraceLevel::ERROR) => format!("{} {msg}", paint(true, "31", "ERROR")),
        (_, TraceLevel::WARN) => format!("{}  {msg}", paint(true, "33", "WARN")),
        (Channel::Stage, _) => format!("{} {}", paint(true, "1;34", "==>"), paint(true, "1", msg)),
        (Channel::DryRun, _) => format!("  {} {msg}", paint(true, "33", "[DRY RUN]")),
        (Channel::Plain, TraceLevel::INFO) => format!("  {msg}"),
        (Channel::Plain, _) => format!("  {}", paint(true, "2", msg)),
    }
}

/// Log-file rendering of one event, without the timestamp.
fn file_line(level: TraceLevel, channel: Channel, fields: &EventFields) -> String {
    let msg = &fields.message;
    match (channel, level) {
        (Channel::Step, _) => format!("    {}", fields.step_line(false)),
        (_, TraceLevel::ERROR) => format!("    [error] {msg}"),
        (_, TraceLevel::WARN) => format!("    [warn] {msg}"),
        (Channel::Stage, _) => format!("==> {msg}"),
        (Channel::DryRun, _) => format!("    [dry run] {msg}"),
        (Channel::Plain, TraceLevel::INFO) => format!("    {msg}"),
        (Channel::Plain, _) => format!("    [debug] {msg}"),
    }
}

/// A [`tracing_subscriber::Layer`] appending every event to the log file
/// of the current command, with timestamps and without colors.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Truncate the log file for `header.command`, write the header, and
    /// return a layer appending to it.
    ///
    /// Returns `None` if the log directory or the file is unavailable.
    pub(super) fn new(header: &RunHeader) -> Option<Self> {
        let path = log_file_path(&header.command)?;
        fs::write(&path, header.render()).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let fields = EventFields::of(event);
        let line = file_line(*metadata.level(), Channel::of(metadata.target()), &fields);
        let ts = chrono::Utc::now().format("%H:%M:%S");

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "[{ts}] {line}").ok();
        }
    }
}

/// Console event format for arbor.
struct ArborFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ArborFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let fields = EventFields::of(event);
        writeln!(
            writer,
            "{}",
            console_line(*metadata.level(), Channel::of(metadata.target()), &fields)
        )
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output goes to stderr so `parse` can keep stdout for the drawn
/// tree. All events, `debug` included, are also written to the log file
/// named after `header.command`, below a header describing the run.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, header: &RunHeader) {
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let console_layer = fmt::layer()
        .event_format(ArborFormatter)
        .with_writer(std::io::stderr)
        .with_filter(console_level);

    let file_layer = FileLayer::new(header).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
