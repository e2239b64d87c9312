//! Wrapping values into optionals.
//!
//! These rules always produce a value: a failed inner conversion yields an
//! empty optional rather than no result.

use typeconv_core::{TypeHash, Value, types};

use crate::{ConversionContext, ConversionService};

pub(crate) fn register(service: &ConversionService) {
    service
        .add_converter(types::ANY, types::OPTIONAL, any_to_optional)
        .add_converter(types::ANY, types::OPTIONAL_INT, any_to_optional_int)
        .add_converter(types::ANY, types::OPTIONAL_LONG, any_to_optional_long);
}

/// Converted to the first type variable when one is present.
fn any_to_optional(service: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    let inner = match context.first_type_variable() {
        Some(argument) if argument.ty() != types::ANY => service.convert_argument(value, argument, context),
        _ => Some(value.clone()),
    };
    Some(Value::optional(inner))
}

fn any_to_optional_int(service: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    Some(Value::OptionalInt(service.convert_into::<i32>(value, context)))
}

fn any_to_optional_long(service: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    Some(Value::OptionalLong(service.convert_into::<i64>(value, context)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeconv_core::Argument;

    #[test]
    fn test_untyped_optional_wraps_value() {
        let service = ConversionService::new();
        assert_eq!(
            service.convert_to(&Value::from("x"), types::OPTIONAL),
            Some(Value::optional(Some(Value::from("x"))))
        );
    }

    #[test]
    fn test_typed_optional_converts_inner() {
        let service = ConversionService::new();
        let ctx = service.context();
        let argument = Argument::optional_of(types::INT32);
        assert_eq!(
            service.convert_argument(&Value::from("12"), &argument, &ctx),
            Some(Value::optional(Some(Value::Int32(12))))
        );
        assert_eq!(
            service.convert_argument(&Value::from("twelve"), &argument, &ctx),
            Some(Value::optional(None))
        );
        assert!(ctx.has_errors());
    }

    #[test]
    fn test_optional_int_and_long() {
        let service = ConversionService::new();
        assert_eq!(
            service.convert_to(&Value::from("7"), types::OPTIONAL_INT),
            Some(Value::OptionalInt(Some(7)))
        );
        assert_eq!(
            service.convert_to(&Value::Float64(9.9), types::OPTIONAL_LONG),
            Some(Value::OptionalLong(Some(9)))
        );
        assert_eq!(
            service.convert_to(&Value::Bool(true), types::OPTIONAL_INT),
            Some(Value::OptionalInt(None))
        );
    }

    #[test]
    fn test_existing_optional_is_unchanged() {
        let service = ConversionService::new();
        let empty = Value::optional(None);
        assert_eq!(service.convert_to(&empty, types::OPTIONAL), Some(empty));
    }
}
