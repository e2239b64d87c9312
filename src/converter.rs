//! The rule interface.

use typeconv_core::{TypeHash, Value};

use crate::{ConversionContext, ConversionService};

/// A conversion rule.
///
/// Returns `None` when the value cannot be converted; a rule that knows why
/// should also [`reject`](ConversionContext::reject) on the context. Rules
/// that convert nested values call back into `service`.
///
/// Any `Fn(&ConversionService, &Value, TypeHash, &ConversionContext) -> Option<Value>`
/// is a rule, so plain functions and closures register directly.
pub trait TypeConverter: Send + Sync {
    fn convert(
        &self,
        service: &ConversionService,
        value: &Value,
        target: TypeHash,
        context: &ConversionContext,
    ) -> Option<Value>;
}

impl<F> TypeConverter for F
where
    F: Fn(&ConversionService, &Value, TypeHash, &ConversionContext) -> Option<Value> + Send + Sync,
{
    fn convert(
        &self,
        service: &ConversionService,
        value: &Value,
        target: TypeHash,
        context: &ConversionContext,
    ) -> Option<Value> {
        self(service, value, target, context)
    }
}

/// Adapts a total `Fn(&Value) -> Value` into a rule that always succeeds.
pub struct FunctionConverter<F>(pub F);

impl<F> TypeConverter for FunctionConverter<F>
where
    F: Fn(&Value) -> Value + Send + Sync,
{
    fn convert(&self, _: &ConversionService, value: &Value, _: TypeHash, _: &ConversionContext) -> Option<Value> {
        Some((self.0)(value))
    }
}
