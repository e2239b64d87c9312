//! Date and time parsing and formatting.
//!
//! Without a pattern, text is read as an RFC 1123 date such as
//! `Tue, 3 Jun 2008 11:05:30 GMT`; numeric offsets are accepted too. A
//! [`FORMAT`](qualifiers::FORMAT) annotation supplies a `strftime` pattern
//! instead, for both parsing and formatting.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, ParseError, Utc};
use typeconv_core::{ConversionError, TypeHash, Value, qualifiers, types};

use crate::{Annotation, ConversionContext, ConversionService};

const RFC_1123: &str = "RFC 1123";

pub(crate) fn register(service: &ConversionService) {
    service
        .add_converter(types::TEXT, types::ZONED_DATE_TIME, text_to_zoned_date_time)
        .add_converter(types::TEXT, types::LOCAL_DATE_TIME, text_to_local_date_time)
        .add_converter(types::TEXT, types::LOCAL_DATE, text_to_local_date)
        .add_converter(types::TEXT, types::DATE, text_to_date);
    for source in [types::ZONED_DATE_TIME, types::LOCAL_DATE_TIME, types::LOCAL_DATE, types::DATE] {
        service.add_formatting_converter(source, types::TEXT, qualifiers::FORMAT, format_temporal);
    }
}

fn pattern(context: &ConversionContext) -> Option<&str> {
    context.annotation(qualifiers::FORMAT).and_then(Annotation::value)
}

/// Wrap a parse result, rejecting on failure.
fn finish<T>(
    parsed: Result<T, ParseError>,
    kind: &'static str,
    value: &Value,
    context: &ConversionContext,
    wrap: impl FnOnce(T) -> Value,
) -> Option<Value> {
    match parsed {
        Ok(parsed) => Some(wrap(parsed)),
        Err(e) => {
            context.reject(
                value,
                ConversionError::DateTime {
                    kind,
                    input: value.to_string(),
                    pattern: pattern(context).unwrap_or(RFC_1123).to_owned(),
                    detail: e.to_string(),
                },
            );
            None
        }
    }
}

fn text_to_zoned_date_time(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    let text = value.to_text();
    let text = text.trim();
    let parsed = match pattern(context) {
        Some(pattern) => DateTime::parse_from_str(text, pattern),
        None => DateTime::parse_from_rfc2822(text),
    };
    finish(parsed, "zoned date-time", value, context, Value::ZonedDateTime)
}

/// The offset in RFC 1123 input is read and discarded.
fn text_to_local_date_time(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    let text = value.to_text();
    let text = text.trim();
    let parsed = match pattern(context) {
        Some(pattern) => NaiveDateTime::parse_from_str(text, pattern),
        None => DateTime::parse_from_rfc2822(text).map(|dt| dt.naive_local()),
    };
    finish(parsed, "local date-time", value, context, Value::LocalDateTime)
}

fn text_to_local_date(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    let text = value.to_text();
    let text = text.trim();
    let parsed = match pattern(context) {
        Some(pattern) => NaiveDate::parse_from_str(text, pattern),
        None => DateTime::parse_from_rfc2822(text).map(|dt| dt.date_naive()),
    };
    finish(parsed, "local date", value, context, Value::LocalDate)
}

/// An instant. Patterns without an offset are read as UTC, and date-only
/// patterns as UTC midnight.
fn text_to_date(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    let text = value.to_text();
    let text = text.trim();
    let parsed = match pattern(context) {
        Some(pattern) => DateTime::parse_from_str(text, pattern)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|first| {
                NaiveDateTime::parse_from_str(text, pattern)
                    .map(|dt| dt.and_utc())
                    .or_else(|_| {
                        NaiveDate::parse_from_str(text, pattern)
                            .map(|d| d.and_time(NaiveTime::MIN).and_utc())
                            .map_err(|_| first)
                    })
            }),
        None => DateTime::parse_from_rfc2822(text).map(|dt| dt.with_timezone(&Utc)),
    };
    finish(parsed, "date", value, context, Value::Date)
}

/// Render a date or time with the annotated pattern.
fn format_temporal(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    let pattern = pattern(context)?;
    let mut out = String::new();
    let written = match value {
        Value::ZonedDateTime(v) => write!(out, "{}", v.format(pattern)),
        Value::LocalDateTime(v) => write!(out, "{}", v.format(pattern)),
        Value::LocalDate(v) => write!(out, "{}", v.format(pattern)),
        Value::Date(v) => write!(out, "{}", v.format(pattern)),
        _ => return None,
    };
    match written {
        Ok(()) => Some(Value::Text(out)),
        Err(_) => {
            context.reject(
                value,
                ConversionError::DateTime {
                    kind: "format",
                    input: value.to_string(),
                    pattern: pattern.to_owned(),
                    detail: "pattern does not apply to this value".into(),
                },
            );
            None
        }
    }
}
