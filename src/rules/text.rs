//! Rules whose source is text, plus the universal any-to-text fallback.

use std::path::PathBuf;
use std::str::FromStr;

use num_bigint::BigInt;
use rust_decimal::Decimal;
use typeconv_core::types::{Charset, Currency, Locale, TimeZone, Uri};
use typeconv_core::{ConversionError, TypeHash, Value, types};
use url::Url;
use uuid::Uuid;

use crate::{ConversionContext, ConversionService, naming};

pub(crate) fn register(service: &ConversionService) {
    let string_array = service.types().array_of(types::STRING);
    service
        .add_converter(types::TEXT, types::INT8, text_to_int8)
        .add_converter(types::TEXT, types::INT16, text_to_int16)
        .add_converter(types::TEXT, types::INT32, text_to_int32)
        .add_converter(types::TEXT, types::INT64, text_to_int64)
        .add_converter(types::TEXT, types::FLOAT32, text_to_float32)
        .add_converter(types::TEXT, types::FLOAT64, text_to_float64)
        .add_converter(types::TEXT, types::BIGINT, text_to_bigint)
        .add_converter(types::TEXT, types::DECIMAL, text_to_decimal)
        .add_converter(types::TEXT, types::BOOL, text_to_bool)
        .add_converter(types::TEXT, types::CHAR, text_to_char)
        .add_converter(types::TEXT, types::ENUM, text_to_enum)
        .add_converter(types::TEXT, types::URL, text_to_url)
        .add_converter(types::TEXT, types::URI, text_to_uri)
        .add_converter(types::TEXT, types::LOCALE, text_to_locale)
        .add_converter(types::TEXT, types::CHARSET, text_to_charset)
        .add_converter(types::TEXT, types::CURRENCY, text_to_currency)
        .add_converter(types::TEXT, types::TIME_ZONE, text_to_time_zone)
        .add_converter(types::TEXT, types::UUID, text_to_uuid)
        .add_converter(types::TEXT, types::PATH, text_to_path)
        .add_converter(types::TEXT, types::BYTES, text_to_bytes)
        .add_converter(types::BYTES, types::TEXT, bytes_to_text)
        .add_converter(string_array, types::TEXT, join_strings)
        .add_converter(types::ANY, types::TEXT, any_to_text);
}

// ============================================================================
// Numbers
// ============================================================================

macro_rules! parse_number {
    ($($name:ident => $ty:ty, $variant:ident, $kind:literal;)*) => {
        $(
            fn $name(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
                let text = value.to_text();
                match <$ty>::from_str(&text) {
                    Ok(n) => Some(Value::$variant(n)),
                    Err(e) => {
                        context.reject(
                            value,
                            ConversionError::InvalidNumber {
                                kind: $kind,
                                input: text.into_owned(),
                                detail: e.to_string(),
                            },
                        );
                        None
                    }
                }
            }
        )*
    };
}

parse_number! {
    text_to_int8 => i8, Int8, "int8";
    text_to_int16 => i16, Int16, "int16";
    text_to_int32 => i32, Int32, "int32";
    text_to_int64 => i64, Int64, "int64";
    text_to_float32 => f32, Float32, "float32";
    text_to_float64 => f64, Float64, "float64";
    text_to_bigint => BigInt, BigInt, "bigint";
}

/// Plain or scientific notation.
fn text_to_decimal(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    let text = value.to_text();
    match Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text)) {
        Ok(n) => Some(Value::Decimal(n)),
        Err(e) => {
            context.reject(
                value,
                ConversionError::InvalidNumber {
                    kind: "decimal",
                    input: text.into_owned(),
                    detail: e.to_string(),
                },
            );
            None
        }
    }
}

// ============================================================================
// Scalars
// ============================================================================

/// `true`, `yes`, `y` and `on` (any case) are true; everything else is false.
fn text_to_bool(_: &ConversionService, value: &Value, _: TypeHash, _: &ConversionContext) -> Option<Value> {
    let text = value.to_text();
    let truthy = ["true", "yes", "y", "on"]
        .iter()
        .any(|word| text.eq_ignore_ascii_case(word));
    Some(Value::Bool(truthy))
}

/// Exactly one character, otherwise nothing.
fn text_to_char(_: &ConversionService, value: &Value, _: TypeHash, _: &ConversionContext) -> Option<Value> {
    let text = value.to_text();
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(Value::Char(c)),
        _ => None,
    }
}

/// Exact constant name first, then the name in `UPPER_SNAKE_CASE`.
fn text_to_enum(service: &ConversionService, value: &Value, target: TypeHash, context: &ConversionContext) -> Option<Value> {
    let table = service.types();
    let text = value.to_text();
    if table.has_enum_constant(target, &text) {
        return Some(Value::enum_constant(target, text.into_owned()));
    }
    let normalized = naming::to_constant_case(&text);
    if table.has_enum_constant(target, &normalized) {
        return Some(Value::enum_constant(target, normalized));
    }
    context.reject(
        value,
        ConversionError::UnknownConstant {
            enum_name: table.name_of(target),
            input: text.into_owned(),
        },
    );
    None
}

// ============================================================================
// Leaf value types
// ============================================================================

/// Parse text with `parse`, rejecting on failure.
fn parse_leaf<T>(
    value: &Value,
    context: &ConversionContext,
    parse: impl FnOnce(&str) -> Result<T, ConversionError>,
    wrap: impl FnOnce(T) -> Value,
) -> Option<Value> {
    match parse(&value.to_text()) {
        Ok(parsed) => Some(wrap(parsed)),
        Err(error) => {
            context.reject(value, error);
            None
        }
    }
}

fn text_to_url(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    parse_leaf(
        value,
        context,
        |text| Url::parse(text).map_err(|e| ConversionError::malformed("url", text, e)),
        Value::Url,
    )
}

fn text_to_uri(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    parse_leaf(value, context, Uri::parse, Value::Uri)
}

fn text_to_locale(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    parse_leaf(value, context, Locale::parse, Value::Locale)
}

fn text_to_charset(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    parse_leaf(value, context, Charset::for_name, Value::Charset)
}

fn text_to_currency(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    parse_leaf(value, context, Currency::of, Value::Currency)
}

fn text_to_uuid(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    parse_leaf(
        value,
        context,
        |text| Uuid::parse_str(text).map_err(|e| ConversionError::malformed("uuid", text, e)),
        Value::Uuid,
    )
}

/// Never fails: unknown ids resolve to GMT.
fn text_to_time_zone(_: &ConversionService, value: &Value, _: TypeHash, _: &ConversionContext) -> Option<Value> {
    Some(Value::TimeZone(TimeZone::get(&value.to_text())))
}

fn text_to_path(_: &ConversionService, value: &Value, _: TypeHash, _: &ConversionContext) -> Option<Value> {
    Some(Value::Path(PathBuf::from(value.to_text().into_owned())))
}

// ============================================================================
// Bytes
// ============================================================================

/// Encode with the context charset.
fn text_to_bytes(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    Some(Value::Bytes(context.charset().encode(&value.to_text())))
}

/// Decode with the context charset.
fn bytes_to_text(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    let Value::Bytes(bytes) = value else {
        return None;
    };
    match context.charset().decode(bytes) {
        Ok(text) => Some(Value::Text(text)),
        Err(error) => {
            context.reject(value, error);
            None
        }
    }
}

// ============================================================================
// Into text
// ============================================================================

/// Concatenate a string array with no separator. Empty arrays yield nothing.
fn join_strings(_: &ConversionService, value: &Value, _: TypeHash, _: &ConversionContext) -> Option<Value> {
    let mut items = value.elements()?.peekable();
    items.peek()?;
    Some(Value::Text(items.map(|item| item.to_text()).collect()))
}

/// The canonical text form of any value.
fn any_to_text(_: &ConversionService, value: &Value, _: TypeHash, _: &ConversionContext) -> Option<Value> {
    Some(Value::Text(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeconv_core::TypeEntry;

    fn convert(value: impl Into<Value>, target: TypeHash) -> (Option<Value>, ConversionContext) {
        let service = ConversionService::new();
        let ctx = service.context();
        let result = service.convert(&value.into(), target, &ctx);
        (result, ctx)
    }

    #[test]
    fn test_text_to_integers() {
        assert_eq!(convert("-12", types::INT8).0, Some(Value::Int8(-12)));
        assert_eq!(convert("300", types::INT16).0, Some(Value::Int16(300)));
        assert_eq!(convert("70000", types::INT32).0, Some(Value::Int32(70000)));
        assert_eq!(convert("9000000000", types::INT64).0, Some(Value::Int64(9_000_000_000)));
    }

    #[test]
    fn test_text_to_integer_out_of_range_rejects() {
        let (result, ctx) = convert("300", types::INT8);
        assert_eq!(result, None);
        let errors = ctx.errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0].error, ConversionError::InvalidNumber { kind: "int8", .. }));
        assert_eq!(errors[0].value, Some(Value::from("300")));
    }

    #[test]
    fn test_text_to_floats() {
        assert_eq!(convert("1.5", types::FLOAT32).0, Some(Value::Float32(1.5)));
        assert_eq!(convert("-2.25e2", types::FLOAT64).0, Some(Value::Float64(-225.0)));
        assert_eq!(convert("abc", types::FLOAT64).0, None);
    }

    #[test]
    fn test_text_to_bigint_and_decimal() {
        let big = "123456789012345678901234567890";
        assert_eq!(
            convert(big, types::BIGINT).0,
            Some(Value::BigInt(BigInt::from_str(big).unwrap()))
        );
        assert_eq!(
            convert("10.25", types::DECIMAL).0,
            Some(Value::Decimal(Decimal::from_str("10.25").unwrap()))
        );
        assert_eq!(
            convert("1.5e3", types::DECIMAL).0,
            Some(Value::Decimal(Decimal::from(1500)))
        );
        let (result, ctx) = convert("ten", types::DECIMAL);
        assert_eq!(result, None);
        assert!(ctx.has_errors());
    }

    #[test]
    fn test_text_to_bool_is_lenient() {
        for truthy in ["true", "TRUE", "yes", "Y", "On"] {
            assert_eq!(convert(truthy, types::BOOL).0, Some(Value::Bool(true)), "{truthy}");
        }
        for falsy in ["false", "no", "0", "1", "anything", " On ", "yes\n"] {
            assert_eq!(convert(falsy, types::BOOL).0, Some(Value::Bool(false)), "{falsy}");
        }
    }

    #[test]
    fn test_text_to_char_requires_single_char() {
        assert_eq!(convert("x", types::CHAR).0, Some(Value::Char('x')));
        assert_eq!(convert("é", types::CHAR).0, Some(Value::Char('é')));

        let (result, ctx) = convert("xy", types::CHAR);
        assert_eq!(result, None);
        assert!(!ctx.has_errors());
        assert_eq!(convert("", types::CHAR).0, None);
    }

    #[test]
    fn test_text_to_enum() {
        let service = ConversionService::new();
        let color = service
            .types()
            .register(TypeEntry::enumeration("Color", ["RED", "DARK_GREEN"]))
            .unwrap();
        let ctx = service.context();

        assert_eq!(
            service.convert(&Value::from("RED"), color, &ctx),
            Some(Value::enum_constant(color, "RED"))
        );
        assert_eq!(
            service.convert(&Value::from("darkGreen"), color, &ctx),
            Some(Value::enum_constant(color, "DARK_GREEN"))
        );
        assert_eq!(
            service.convert(&Value::from("dark-green"), color, &ctx),
            Some(Value::enum_constant(color, "DARK_GREEN"))
        );
        assert!(!ctx.has_errors());

        assert_eq!(service.convert(&Value::from("BLUE"), color, &ctx), None);
        assert_eq!(
            ctx.errors()[0].error,
            ConversionError::UnknownConstant {
                enum_name: "Color".into(),
                input: "BLUE".into()
            }
        );
    }

    #[test]
    fn test_text_to_url_and_uri() {
        let (url, _) = convert("https://example.com/a", types::URL);
        assert_eq!(url, Some(Value::Url(Url::parse("https://example.com/a").unwrap())));

        let (bad, ctx) = convert("not a url", types::URL);
        assert_eq!(bad, None);
        assert!(matches!(ctx.errors()[0].error, ConversionError::Malformed { kind: "url", .. }));

        assert!(matches!(convert("../relative", types::URI).0, Some(Value::Uri(_))));
        assert_eq!(convert("a b", types::URI).0, None);
    }

    #[test]
    fn test_text_to_leaf_types() {
        assert_eq!(convert("en_GB", types::LOCALE).0, Some(Value::Locale(Locale::new("en", Some("GB")))));
        assert_eq!(convert("utf-8", types::CHARSET).0, Some(Value::Charset(Charset::Utf8)));
        assert_eq!(convert("usd", types::CURRENCY).0.map(|v| v.to_string()), Some("USD".to_string()));
        assert_eq!(
            convert("67e55044-10b1-426f-9247-bb680e5fe0c8", types::UUID).0,
            Some(Value::Uuid(Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap()))
        );
        assert_eq!(convert("/tmp/x", types::PATH).0, Some(Value::Path(PathBuf::from("/tmp/x"))));
    }

    #[test]
    fn test_malformed_leaf_types_reject() {
        for target in [types::LOCALE, types::CHARSET, types::CURRENCY, types::UUID] {
            let (result, ctx) = convert("???", target);
            assert_eq!(result, None);
            assert_eq!(ctx.errors().len(), 1);
        }

        let (result, ctx) = convert(" 67e55044-10b1-426f-9247-bb680e5fe0c8 ", types::UUID);
        assert_eq!(result, None);
        assert!(ctx.has_errors());
    }

    #[test]
    fn test_time_zone_is_permissive() {
        let (result, ctx) = convert("Not/A Zone", types::TIME_ZONE);
        assert_eq!(result, Some(Value::TimeZone(TimeZone::gmt())));
        assert!(!ctx.has_errors());
        assert_eq!(convert("Europe/Paris", types::TIME_ZONE).0.map(|v| v.to_string()), Some("Europe/Paris".into()));
    }

    #[test]
    fn test_text_bytes_use_context_charset() {
        let service = ConversionService::new();
        let latin1 = service.context().with_charset(Charset::Iso8859_1);
        assert_eq!(
            service.convert(&Value::from("é"), types::BYTES, &latin1),
            Some(Value::Bytes(vec![0xe9]))
        );
        assert_eq!(
            service.convert(&Value::Bytes(vec![0xe9]), types::STRING, &latin1),
            Some(Value::from("é"))
        );

        let utf8 = service.context();
        assert_eq!(service.convert(&Value::Bytes(vec![0xe9]), types::STRING, &utf8), None);
        assert!(utf8.has_errors());
    }

    #[test]
    fn test_string_array_joins() {
        let words = Value::array(types::STRING, [Value::from("ab"), Value::from("cd")]);
        assert_eq!(convert(words, types::STRING).0, Some(Value::from("abcd")));

        let empty = Value::array(types::STRING, Vec::<Value>::new());
        assert_eq!(convert(empty, types::STRING).0, None);
    }

    #[test]
    fn test_any_to_text() {
        assert_eq!(convert(42i32, types::STRING).0, Some(Value::from("42")));
        assert_eq!(convert(2.5f64, types::TEXT).0, Some(Value::from("2.5")));
        assert_eq!(convert(true, types::STRING).0, Some(Value::from("true")));
        assert_eq!(
            convert(Value::list([Value::Int32(1), Value::Int32(2)]), types::STRING).0,
            Some(Value::from("[1, 2]"))
        );
    }
}
