//! Number to number conversion, byte images and human readable sizes.
//!
//! Narrowing between numeric types follows two's complement truncation:
//! integers wrap, floats saturate to `i32` (or `i64`) before wrapping into
//! smaller widths.

use std::str::FromStr;

use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use typeconv_core::{ConversionError, TypeHash, Value, qualifiers, types};

use crate::{ConversionContext, ConversionService};

pub(crate) fn register(service: &ConversionService) {
    service
        .add_converter(types::NUMBER, types::NUMBER, number_to_number)
        .add_converter(types::NUMBER, types::BYTES, number_to_bytes)
        .add_converter(types::CHAR, types::BYTES, number_to_bytes)
        .add_formatting_converter(types::TEXT, types::NUMBER, qualifiers::READABLE_BYTES, readable_bytes);
}

/// Convert between any two numeric types.
fn number_to_number(service: &ConversionService, value: &Value, target: TypeHash, context: &ConversionContext) -> Option<Value> {
    if service.types().is_instance(value.type_hash(), target) {
        return Some(value.clone());
    }
    let converted = match target {
        types::INT8 => Value::Int8(int_value(value)? as i8),
        types::INT16 => Value::Int16(int_value(value)? as i16),
        types::INT32 => Value::Int32(int_value(value)?),
        types::INT64 => Value::Int64(long_value(value)?),
        types::FLOAT32 => Value::Float32(float_value(value)?),
        types::FLOAT64 => Value::Float64(double_value(value)?),
        types::BIGINT => Value::BigInt(big_value(value)?),
        types::DECIMAL => return decimal_value(value, context).map(Value::Decimal),
        _ => return None,
    };
    Some(converted)
}

fn int_value(value: &Value) -> Option<i32> {
    match value {
        Value::Float32(v) => Some(*v as i32),
        Value::Float64(v) => Some(*v as i32),
        other => long_value(other).map(|v| v as i32),
    }
}

fn long_value(value: &Value) -> Option<i64> {
    match value {
        Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_) => value.as_i64(),
        Value::Float32(v) => Some(*v as i64),
        Value::Float64(v) => Some(*v as i64),
        Value::BigInt(v) => Some(wrapping_i64(v)),
        Value::Decimal(v) => v.trunc().to_i128().map(|n| n as i64),
        _ => None,
    }
}

fn float_value(value: &Value) -> Option<f32> {
    match value {
        Value::Float32(v) => Some(*v),
        Value::Float64(v) => Some(*v as f32),
        Value::BigInt(v) => v.to_f32(),
        Value::Decimal(v) => v.to_f32(),
        other => long_value(other).map(|v| v as f32),
    }
}

fn double_value(value: &Value) -> Option<f64> {
    match value {
        Value::Float32(v) => Some(f64::from(*v)),
        Value::Float64(v) => Some(*v),
        Value::BigInt(v) => v.to_f64(),
        Value::Decimal(v) => v.to_f64(),
        other => long_value(other).map(|v| v as f64),
    }
}

fn big_value(value: &Value) -> Option<BigInt> {
    match value {
        Value::BigInt(v) => Some(v.clone()),
        Value::Decimal(v) => v.trunc().to_i128().map(BigInt::from),
        other => long_value(other).map(BigInt::from),
    }
}

/// Exact where the source is exact. Values outside the decimal range reject.
fn decimal_value(value: &Value, context: &ConversionContext) -> Option<Decimal> {
    let parsed = match value {
        Value::Decimal(v) => return Some(*v),
        Value::Int8(_) | Value::Int16(_) | Value::Int32(_) | Value::Int64(_) => return value.as_i64().map(Decimal::from),
        Value::Float32(v) => Decimal::from_str(&v.to_string()).or_else(|_| Decimal::from_scientific(&format!("{:e}", v))),
        Value::Float64(v) => Decimal::from_str(&v.to_string()).or_else(|_| Decimal::from_scientific(&format!("{:e}", v))),
        Value::BigInt(v) => Decimal::from_str(&v.to_string()),
        _ => return None,
    };
    match parsed {
        Ok(decimal) => Some(decimal),
        Err(e) => {
            context.reject(
                value,
                ConversionError::InvalidNumber {
                    kind: "decimal",
                    input: value.to_string(),
                    detail: e.to_string(),
                },
            );
            None
        }
    }
}

/// Low 64 bits of the two's complement form.
fn wrapping_i64(value: &BigInt) -> i64 {
    let low = value.iter_u64_digits().next().unwrap_or(0) as i64;
    match value.sign() {
        Sign::Minus => low.wrapping_neg(),
        _ => low,
    }
}

/// Big-endian image of an integer, float or character.
fn number_to_bytes(_: &ConversionService, value: &Value, _: TypeHash, _: &ConversionContext) -> Option<Value> {
    let bytes = match value {
        Value::Int8(v) => v.to_be_bytes().to_vec(),
        Value::Int16(v) => v.to_be_bytes().to_vec(),
        Value::Int32(v) => v.to_be_bytes().to_vec(),
        Value::Int64(v) => v.to_be_bytes().to_vec(),
        Value::Float32(v) => v.to_be_bytes().to_vec(),
        Value::Float64(v) => v.to_be_bytes().to_vec(),
        Value::BigInt(v) => v.to_signed_bytes_be(),
        Value::Char(c) => u32::from(*c).to_be_bytes().to_vec(),
        _ => return None,
    };
    Some(Value::Bytes(bytes))
}

const KB: i64 = 1024;
const MB: i64 = KB * 1024;
const GB: i64 = MB * 1024;

/// `512`, `10KB`, `4mb`, `1GB` as a byte count, then converted to the target.
fn readable_bytes(service: &ConversionService, value: &Value, target: TypeHash, context: &ConversionContext) -> Option<Value> {
    let text = value.to_text().trim().to_ascii_uppercase();
    let (digits, scale) = [("KB", KB), ("MB", MB), ("GB", GB)]
        .into_iter()
        .find_map(|(suffix, scale)| text.strip_suffix(suffix).map(|digits| (digits, scale)))
        .unwrap_or((text.as_str(), 1));

    let count = match digits.trim().parse::<i64>() {
        Ok(n) => n.checked_mul(scale),
        Err(e) => {
            context.reject(
                value,
                ConversionError::InvalidNumber {
                    kind: "readable bytes",
                    input: text.clone(),
                    detail: e.to_string(),
                },
            );
            return None;
        }
    };
    match count {
        Some(count) => service.convert(&Value::Int64(count), target, context),
        None => {
            context.reject(
                value,
                ConversionError::InvalidNumber {
                    kind: "readable bytes",
                    input: text.clone(),
                    detail: "byte count overflows int64".into(),
                },
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Annotation;

    fn convert(value: impl Into<Value>, target: TypeHash) -> Option<Value> {
        ConversionService::new().convert_to(&value.into(), target)
    }

    #[test]
    fn test_widening() {
        assert_eq!(convert(7i8, types::INT64), Some(Value::Int64(7)));
        assert_eq!(convert(7i32, types::FLOAT64), Some(Value::Float64(7.0)));
        assert_eq!(convert(1.5f32, types::FLOAT64), Some(Value::Float64(1.5)));
        assert_eq!(convert(7i64, types::BIGINT), Some(Value::BigInt(BigInt::from(7))));
        assert_eq!(convert(7i16, types::DECIMAL), Some(Value::Decimal(Decimal::from(7))));
    }

    #[test]
    fn test_narrowing_wraps_integers() {
        assert_eq!(convert(300i32, types::INT8), Some(Value::Int8(44)));
        assert_eq!(convert(-1i64, types::INT16), Some(Value::Int16(-1)));
        assert_eq!(convert(0x1_0000_0001i64, types::INT32), Some(Value::Int32(1)));
    }

    #[test]
    fn test_floats_truncate_and_saturate() {
        assert_eq!(convert(3.9f64, types::INT32), Some(Value::Int32(3)));
        assert_eq!(convert(-3.9f64, types::INT64), Some(Value::Int64(-3)));
        assert_eq!(convert(1e10f64, types::INT32), Some(Value::Int32(i32::MAX)));
        assert_eq!(convert(f64::NAN, types::INT32), Some(Value::Int32(0)));
    }

    #[test]
    fn test_bigint_low_bits() {
        let big = BigInt::from(u64::MAX) + 6;
        assert_eq!(convert(Value::BigInt(big), types::INT64), Some(Value::Int64(5)));
        assert_eq!(convert(Value::BigInt(BigInt::from(-42)), types::INT32), Some(Value::Int32(-42)));
    }

    #[test]
    fn test_decimal_conversions() {
        let d = Decimal::from_str("12.75").unwrap();
        assert_eq!(convert(Value::Decimal(d), types::INT32), Some(Value::Int32(12)));
        assert_eq!(convert(Value::Decimal(d), types::FLOAT64), Some(Value::Float64(12.75)));
        assert_eq!(convert(Value::Decimal(d), types::BIGINT), Some(Value::BigInt(BigInt::from(12))));
        assert_eq!(
            convert(0.1f64, types::DECIMAL),
            Some(Value::Decimal(Decimal::from_str("0.1").unwrap()))
        );
    }

    #[test]
    fn test_unrepresentable_decimal_rejects() {
        let service = ConversionService::new();
        let ctx = service.context();
        assert_eq!(service.convert(&Value::Float64(f64::NAN), types::DECIMAL, &ctx), None);
        assert!(matches!(ctx.errors()[0].error, ConversionError::InvalidNumber { kind: "decimal", .. }));
    }

    #[test]
    fn test_same_type_is_unchanged() {
        assert_eq!(convert(5i32, types::NUMBER), Some(Value::Int32(5)));
        assert_eq!(convert(5i32, types::INT32), Some(Value::Int32(5)));
    }

    #[test]
    fn test_byte_images_are_big_endian() {
        assert_eq!(convert(1i32, types::BYTES), Some(Value::Bytes(vec![0, 0, 0, 1])));
        assert_eq!(convert(0x0102i16, types::BYTES), Some(Value::Bytes(vec![1, 2])));
        assert_eq!(convert(-1i8, types::BYTES), Some(Value::Bytes(vec![0xff])));
        assert_eq!(convert('A', types::BYTES), Some(Value::Bytes(vec![0, 0, 0, 65])));
        assert_eq!(convert(Value::Decimal(Decimal::ONE), types::BYTES), None);
    }

    #[test]
    fn test_readable_bytes() {
        let service = ConversionService::new();
        let ctx = service
            .context()
            .with_annotation(Annotation::marker(qualifiers::READABLE_BYTES));

        let cases = [("512", 512), ("10KB", 10 * 1024), ("4mb", 4 * 1024 * 1024), ("1GB", 1 << 30)];
        for (input, expected) in cases {
            assert_eq!(
                service.convert(&Value::from(input), types::INT64, &ctx),
                Some(Value::Int64(expected)),
                "{input}"
            );
        }
        assert_eq!(service.convert(&Value::from("2KB"), types::INT32, &ctx), Some(Value::Int32(2048)));
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_readable_bytes_rejects_garbage() {
        let service = ConversionService::new();
        let ctx = service
            .context()
            .with_annotation(Annotation::marker(qualifiers::READABLE_BYTES));
        assert_eq!(service.convert(&Value::from("lots"), types::INT64, &ctx), None);
        assert_eq!(service.convert(&Value::from("9999999999GB"), types::INT64, &ctx), None);
        assert_eq!(ctx.errors().len(), 2);
    }

    #[test]
    fn test_without_qualifier_suffix_is_not_understood() {
        assert_eq!(convert("10KB", types::INT64), None);
    }
}
