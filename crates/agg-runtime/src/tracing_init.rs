use std::fmt::{self as stdfmt, Write as _};
use std::path::{Path, PathBuf};

use agg_config::{LogFormat, LoggingConfig};
use anyhow::Result;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::DefaultFields;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormattedFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

// ---------------------------------------------------------------------------
// FileFields: separate field formatter so the file layer keeps its own
// span field cache
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FileFields(DefaultFields);

impl<'writer> fmt::FormatFields<'writer> for FileFields {
    fn format_fields<R: tracing_subscriber::field::RecordFields>(
        &self,
        writer: fmt::format::Writer<'writer>,
        fields: R,
    ) -> stdfmt::Result {
        self.0.format_fields(writer, fields)
    }
}

// ---------------------------------------------------------------------------
// DomainFormat: `[domain]` prefix for plain output
// ---------------------------------------------------------------------------

/// Plain-text formatter that lifts the `domain` field into a prefix:
///
/// ```text
/// 2026-03-02T09:41:07Z  INFO [conf] specification applied aggregators=3
/// ```
///
/// Events without a domain (the `log` records of `agg-core`, dependencies)
/// print without one.
struct DomainFormat {
    timer: SystemTime,
}

impl DomainFormat {
    fn new() -> Self {
        Self { timer: SystemTime }
    }
}

fn level_colour(level: Level) -> &'static str {
    match level {
        Level::ERROR => "31",
        Level::WARN => "33",
        Level::INFO => "32",
        Level::DEBUG => "34",
        Level::TRACE => "35",
    }
}

impl<S, N> FormatEvent<S, N> for DomainFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> fmt::FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> stdfmt::Result {
        let ansi = writer.has_ansi_escapes();
        let level = *event.metadata().level();

        if ansi {
            write!(writer, "\x1b[2m")?;
        }
        if self.timer.format_time(&mut writer).is_err() {
            write!(writer, "<unknown time>")?;
        }
        if ansi {
            write!(writer, "\x1b[0m \x1b[{}m{level:>5}\x1b[0m ", level_colour(level))?;
        } else {
            write!(writer, " {level:>5} ")?;
        }

        let mut fields = FieldSplitter::default();
        event.record(&mut fields);

        match (&fields.domain, ansi) {
            (Some(domain), true) => write!(writer, "\x1b[1;36m[{domain}]\x1b[0m ")?,
            (Some(domain), false) => write!(writer, "[{domain}] ")?,
            (None, _) => {}
        }

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}{{", span.name())?;
                if let Some(span_fields) = span.extensions().get::<FormattedFields<N>>() {
                    if !span_fields.is_empty() {
                        write!(writer, "{span_fields}")?;
                    }
                }
                write!(writer, "}}: ")?;
            }
        }

        write!(writer, "{}", fields.message)?;
        if !fields.rest.is_empty() {
            if ansi {
                write!(writer, " \x1b[3m{}\x1b[0m", fields.rest)?;
            } else {
                write!(writer, " {}", fields.rest)?;
            }
        }
        writeln!(writer)
    }
}

// ---------------------------------------------------------------------------
// FieldSplitter: pulls `domain` and `message` out of an event's fields
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FieldSplitter {
    domain: Option<String>,
    message: String,
    rest: String,
}

impl FieldSplitter {
    fn push_field(&mut self, name: &str, value: impl stdfmt::Display) {
        if !self.rest.is_empty() {
            self.rest.push(' ');
        }
        write!(&mut self.rest, "{name}={value}").ok();
    }
}

impl Visit for FieldSplitter {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "domain" => self.domain = Some(value.to_string()),
            "message" => self.message = value.to_string(),
            name => self.push_field(name, format_args!("{value:?}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn stdfmt::Debug) {
        match field.name() {
            "domain" => {
                self.domain = Some(format!("{value:?}").trim_matches('"').to_string());
            }
            "message" => {
                write!(&mut self.message, "{value:?}").ok();
            }
            name => self.push_field(name, format_args!("{value:?}")),
        }
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push_field(field.name(), value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push_field(field.name(), value);
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push_field(field.name(), value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push_field(field.name(), value);
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Install the global `tracing` subscriber described by `config`.
///
/// Logs always go to stderr; `config.file` adds a non-blocking file writer
/// whose [`WorkerGuard`] is returned and must live until exit. `RUST_LOG`,
/// when set, replaces the configured filter. `log` records from `agg-core`
/// reach the subscriber through tracing-subscriber's `tracing-log` bridge.
pub fn init_tracing(config: &LoggingConfig, base_dir: &Path) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(config)?;
    let json = config.format == LogFormat::Json;

    let (file_writer, guard) = match &config.file {
        Some(file) => {
            let (writer, guard) = file_writer(&resolve_log_path(file, base_dir))?;
            (Some(writer), Some(guard))
        }
        None => (None, None),
    };

    // JSON keeps `domain` as an ordinary field for log queries.
    let json_stderr = json.then(|| {
        fmt::layer()
            .json()
            .with_target(false)
            .with_writer(std::io::stderr)
    });
    let plain_stderr = (!json).then(|| {
        fmt::layer()
            .event_format(DomainFormat::new())
            .with_writer(std::io::stderr)
    });
    let json_file = file_writer.clone().filter(|_| json).map(|writer| {
        fmt::layer()
            .json()
            .fmt_fields(FileFields::default())
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
    });
    let plain_file = file_writer.filter(|_| !json).map(|writer| {
        fmt::layer()
            .event_format(DomainFormat::new())
            .fmt_fields(FileFields::default())
            .with_ansi(false)
            .with_writer(writer)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(json_stderr)
        .with(plain_stderr)
        .with(json_file)
        .with(plain_file)
        .try_init()?;

    Ok(guard)
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if std::env::var("RUST_LOG").is_ok() {
        return Ok(EnvFilter::from_default_env());
    }
    let directives = config.filter_directives();
    EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("invalid log filter '{directives}': {e}"))
}

/// Relative log paths are taken from the config file's directory.
fn resolve_log_path(file: &Path, base_dir: &Path) -> PathBuf {
    if file.is_relative() {
        base_dir.join(file)
    } else {
        file.to_path_buf()
    }
}

fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    let dir = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("log file path has no parent directory"))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("log file path has no file name"))?;
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}
