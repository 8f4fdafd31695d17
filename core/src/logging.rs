//! Log output that never leaks the API credentials.
//!
//! The request pipeline logs full failure details (URLs, response bodies, header dumps), so every
//! binary installs [`RedactedLoggerBuilder`], a `tracing_subscriber` formatter that masks bearer
//! tokens and `token=`-style pairs before a line is written.

use chrono::{SecondsFormat, Utc};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::fmt::{self, Write};
use std::sync::OnceLock;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

const MASK: &str = "[REDACTED]";

const SECRET_KEYS: &[&str] = &[
    "token",
    "api_token",
    "api-token",
    "apitoken",
    "access_token",
    "bearer_token",
    "password",
    "secret",
];

const HEADER_KEYS: &[&str] = &["authorization", "proxy-authorization"];

/// Builder for installing the redacting subscriber.
pub struct RedactedLoggerBuilder {
    level: tracing::Level,
    directives: Option<String>,
    include_timestamp: bool,
    include_target: bool,
}

impl RedactedLoggerBuilder {
    pub fn new(level: tracing::Level) -> Self {
        Self {
            level,
            directives: None,
            include_timestamp: true,
            include_target: false,
        }
    }

    /// Extra `EnvFilter` directives (e.g. `"reqwest=warn"`); `RUST_LOG` still wins when set.
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    pub fn include_timestamp(mut self, include: bool) -> Self {
        self.include_timestamp = include;
        self
    }

    pub fn include_target(mut self, include: bool) -> Self {
        self.include_target = include;
        self
    }

    fn filter(&self) -> EnvFilter {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
        let mut wanted = self.level.as_str().to_ascii_lowercase();
        if let Some(extra) = &self.directives {
            wanted.push(',');
            wanted.push_str(extra);
        }
        EnvFilter::try_new(&wanted).unwrap_or_else(|_| EnvFilter::new(self.level.as_str()))
    }

    /// Install the subscriber globally. Fails if one is already installed.
    pub fn init(self) -> Result<(), tracing_subscriber::util::TryInitError> {
        let formatter = RedactingFormatter {
            include_timestamp: self.include_timestamp,
            include_target: self.include_target,
        };

        tracing_subscriber::util::SubscriberInitExt::try_init(
            tracing_subscriber::fmt()
                .with_env_filter(self.filter())
                .with_writer(std::io::stderr)
                .event_format(formatter),
        )
    }
}

/// Mask credentials in `input`, borrowing when nothing matched.
pub fn redact(input: &str) -> Cow<'_, str> {
    rules()
        .iter()
        .fold(Cow::Borrowed(input), |acc, rule| rule.apply(acc))
}

struct Rule {
    pattern: Regex,
    kind: RuleKind,
}

#[derive(Clone, Copy)]
enum RuleKind {
    /// `token=abc`, `password: "abc"`
    KeyValue,
    /// `"token":"abc"`
    Json,
    /// `Authorization: Bearer abc`
    Header,
    /// `Bearer abc` on its own, e.g. inside a debug-printed header map
    BareBearer,
}

impl Rule {
    fn apply<'a>(&self, text: Cow<'a, str>) -> Cow<'a, str> {
        if !self.pattern.is_match(&text) {
            return text;
        }

        let replaced = self.pattern.replace_all(&text, |caps: &Captures| match self.kind {
            RuleKind::KeyValue => format!("{}{}{}", &caps["key"], &caps["sep"], MASK),
            RuleKind::Json => format!("{}{}{}", &caps["prefix"], MASK, &caps["suffix"]),
            RuleKind::Header => {
                let scheme = caps.name("scheme").map(|m| m.as_str()).unwrap_or("");
                format!("{}{}{}", &caps["prefix"], scheme, MASK)
            }
            RuleKind::BareBearer => format!("{}{}", &caps["scheme"], MASK),
        });

        Cow::Owned(replaced.into_owned())
    }
}

fn alternation(values: &[&str]) -> String {
    values
        .iter()
        .map(|value| regex::escape(value))
        .collect::<Vec<_>>()
        .join("|")
}

fn rules() -> &'static [Rule] {
    static RULES: OnceLock<Vec<Rule>> = OnceLock::new();
    RULES.get_or_init(|| {
        let secrets = alternation(SECRET_KEYS);
        let headers = alternation(HEADER_KEYS);

        let compile = |pattern: String, kind: RuleKind| Rule {
            pattern: Regex::new(&pattern).expect("redaction patterns are valid"),
            kind,
        };

        vec![
            compile(
                format!(r#"(?i)(?P<prefix>"(?:{secrets})"\s*:\s*")(?P<value>[^"]*)(?P<suffix>")"#),
                RuleKind::Json,
            ),
            compile(
                format!(
                    r#"(?i)(?P<prefix>\b(?:{headers})\b"?\s*[:=]\s*"?)(?P<scheme>(?:bearer|basic)\s+)?(?P<value>[A-Za-z0-9._~+/=-]{{4,}})"#
                ),
                RuleKind::Header,
            ),
            compile(
                r#"(?P<scheme>\b[Bb]earer\s+)(?P<value>[A-Za-z0-9._~+/-]{4,}=*)"#.to_string(),
                RuleKind::BareBearer,
            ),
            compile(
                format!(
                    r#"(?i)(?P<key>\b(?:{secrets})\b)(?P<sep>\s*[:=]\s*)(?P<value>"[^"]*"|'[^']*'|[^\s,;&]+)"#
                ),
                RuleKind::KeyValue,
            ),
        ]
    })
}

#[derive(Default)]
struct FieldCollector {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl FieldCollector {
    fn push(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = Some(value);
        } else {
            self.fields.push((field.name().to_string(), value));
        }
    }
}

impl Visit for FieldCollector {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.push(field, format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.push(field, value.to_string());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.push(field, value.to_string());
    }
}

struct RedactingFormatter {
    include_timestamp: bool,
    include_target: bool,
}

impl<S, N> FormatEvent<S, N> for RedactingFormatter
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut line = String::new();

        if self.include_timestamp {
            let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            write!(line, "{} ", now)?;
        }

        write!(line, "{:<5} ", event.metadata().level())?;

        if self.include_target {
            write!(line, "{}: ", event.metadata().target())?;
        }

        let mut collector = FieldCollector::default();
        event.record(&mut collector);

        if let Some(message) = &collector.message {
            line.push_str(message);
        }

        for (key, value) in &collector.fields {
            write!(line, " {}={}", key, value)?;
        }

        writer.write_str(&redact(&line))?;
        writer.write_char('\n')
    }
}
