//! Structured JSON logging to stderr.
//!
//! Each record is one JSON object per line:
//!
//! ```json
//! {"level":"debug","msg":"fragment dropped","fragment":"secret=1","reason":"unauthorized","ts":1760400000000}
//! ```
//!
//! `ts` is milliseconds since the Unix epoch.
//!
//! # Usage
//!
//! ```no_run
//! # use queryable::log;
//! log!(warn, "fragment limit reached", max: 100);
//! log::debug!("fragment dropped", fragment: "a=1", reason: "malformed");
//! ```
//!
//! `log::debug!` is compiled out of release builds. Output can be silenced at
//! runtime with [`set_enabled`], which is useful in tests and benchmarks.

use std::fmt::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static ENABLED: AtomicBool = AtomicBool::new(true);

/// Turn log output on or off for the whole process.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Whether log output is currently enabled.
#[inline]
pub fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

#[doc(hidden)]
#[must_use]
pub fn __escape_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            },
            c => out.push(c),
        }
    }
    out
}

#[doc(hidden)]
#[must_use]
pub fn __build_structured_log(level: &str, msg: &str, fields: &[(&str, String)]) -> String {
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    __build_structured_log_at(level, msg, fields, ts)
}

#[doc(hidden)]
#[must_use]
pub fn __build_structured_log_at(
    level: &str,
    msg: &str,
    fields: &[(&str, String)],
    ts: u128,
) -> String {
    let mut out = String::with_capacity(48 + msg.len() + fields.len() * 24);
    let _ = write!(out, r#"{{"level":"{level}","msg":"{}""#, __escape_json(msg));
    for (key, value) in fields {
        let _ = write!(
            out,
            r#","{}":"{}""#,
            __escape_json(key),
            __escape_json(value)
        );
    }
    let _ = write!(out, r#","ts":{ts}}}"#);
    out
}

#[doc(hidden)]
pub fn __emit(line: &str) {
    if enabled() {
        eprintln!("{line}");
    }
}

/// Structured logging macro with key-value pairs.
///
/// ```no_run
/// # use queryable::log;
/// log!(info, "parser ready", fields: 3);
/// log!(warn, "list too long", key: "status", len: 2000);
/// ```
#[macro_export]
macro_rules! log {
    ($level:ident, $msg:expr $(, $key:ident : $value:expr)* $(,)?) => {{
        if $crate::log::enabled() {
            let fields: &[(&str, String)] = &[
                $( (stringify!($key), format!("{}", $value)) ),*
            ];
            let line = $crate::log::__build_structured_log(stringify!($level), $msg, fields);
            $crate::log::__emit(&line);
        }
    }};
}

/// Structured debug record, only emitted in debug builds.
#[macro_export]
macro_rules! log_debug {
    ($msg:expr $(, $key:ident : $value:expr)* $(,)?) => {{
        #[cfg(debug_assertions)]
        {
            $crate::log!(debug, $msg $(, $key: $value)*);
        }
        #[cfg(not(debug_assertions))]
        {
            let _ = &$msg;
            $( let _ = &$value; )*
        }
    }};
}

/// Structured warning record.
#[macro_export]
macro_rules! log_warn {
    ($msg:expr $(, $key:ident : $value:expr)* $(,)?) => {{
        $crate::log!(warn, $msg $(, $key: $value)*);
    }};
}

pub use log_debug as debug;
pub use log_warn as warn;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_json() {
        assert_eq!(__escape_json("plain"), "plain");
        assert_eq!(__escape_json(r#"a"b"#), r#"a\"b"#);
        assert_eq!(__escape_json("a\\b"), "a\\\\b");
        assert_eq!(__escape_json("a\nb\tc"), "a\\nb\\tc");
        assert_eq!(__escape_json("\u{0001}"), "\\u0001");
    }

    #[test]
    fn test_structured_line_format() {
        let line = __build_structured_log_at(
            "debug",
            "fragment dropped",
            &[("fragment", "a=\"1\"".to_string()), ("reason", "malformed".to_string())],
            42,
        );
        assert_eq!(
            line,
            r#"{"level":"debug","msg":"fragment dropped","fragment":"a=\"1\"","reason":"malformed","ts":42}"#
        );
    }

    #[test]
    fn test_structured_line_without_fields() {
        let line = __build_structured_log_at("warn", "limit", &[], 0);
        assert_eq!(line, r#"{"level":"warn","msg":"limit","ts":0}"#);
    }
}
