//! Per-request conversion context.
//!
//! A [`ConversionContext`] carries what a rule may need beyond the value and
//! target descriptor:
//!
//! - the locale and charset in effect
//! - annotations on the conversion site, e.g. a date pattern
//! - generic type variables, e.g. the element type of a target list
//! - an error sink that collects rejections instead of raising them
//!
//! Container rules narrow the context per element with
//! [`ConversionContext::with_argument`]; the narrowed context shares the
//! parent's error sink, so rejections from nested conversions surface at the
//! top level.
//!
//! # Example
//!
//! ```
//! use typeconv::{ConversionContext, ConversionService, Value, types};
//!
//! let service = ConversionService::new();
//! let ctx = ConversionContext::default();
//! assert_eq!(service.convert(&Value::from("abc"), types::INT32, &ctx), None);
//! assert_eq!(ctx.errors().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use typeconv_core::types::{Charset, Locale};
use typeconv_core::{Argument, ConversionError, Rejection, TypeHash, Value};

/// Metadata attached to a conversion site.
///
/// `kind` names the annotation; formatting-qualifier kinds such as
/// [`qualifiers::FORMAT`](typeconv_core::qualifiers::FORMAT) also select rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    pub kind: TypeHash,
    pub value: Option<String>,
}

impl Annotation {
    /// An annotation with no value.
    pub fn marker(kind: TypeHash) -> Self {
        Self { kind, value: None }
    }

    pub fn with_value(kind: TypeHash, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(value.into()),
        }
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Shared collector of rejections.
///
/// Clones append to the same list.
#[derive(Clone, Default)]
pub struct ErrorSink(Arc<Mutex<Vec<Rejection>>>);

impl ErrorSink {
    pub fn push(&self, rejection: Rejection) {
        self.0.lock().push(rejection);
    }

    /// Snapshot of the recorded rejections, oldest first.
    pub fn snapshot(&self) -> Vec<Rejection> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Remove and return everything recorded so far.
    pub fn drain(&self) -> Vec<Rejection> {
        std::mem::take(&mut *self.0.lock())
    }
}

impl fmt::Debug for ErrorSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.lock().iter()).finish()
    }
}

/// Everything a rule may consult besides the value and target.
///
/// Cloning shares the error sink. Build a fresh context per top-level request.
#[derive(Debug, Clone, Default)]
pub struct ConversionContext {
    locale: Locale,
    charset: Charset,
    annotations: Vec<Annotation>,
    type_variables: Vec<Argument>,
    errors: ErrorSink,
}

impl ConversionContext {
    /// A context with the given locale and charset and nothing else.
    pub fn new(locale: Locale, charset: Charset) -> Self {
        Self {
            locale,
            charset,
            ..Self::default()
        }
    }

    // === Builder Methods ===

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    /// Attach an annotation.
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Declare a type variable, e.g. `E` for the element type of a list target.
    pub fn with_type_variable(mut self, variable: Argument) -> Self {
        self.type_variables.push(variable);
        self
    }

    /// A context narrowed to `argument`: its type parameters become the type
    /// variables. Locale, charset, annotations and the error sink carry over.
    pub fn with_argument(&self, argument: &Argument) -> Self {
        Self {
            locale: self.locale.clone(),
            charset: self.charset,
            annotations: self.annotations.clone(),
            type_variables: argument.type_parameters().to_vec(),
            errors: self.errors.clone(),
        }
    }

    // === Accessors ===

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// First annotation of the given kind.
    pub fn annotation(&self, kind: TypeHash) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.kind == kind)
    }

    pub fn type_variables(&self) -> &[Argument] {
        &self.type_variables
    }

    pub fn first_type_variable(&self) -> Option<&Argument> {
        self.type_variables.first()
    }

    /// Type variable by name (`"K"`, `"V"`, ...).
    pub fn type_variable(&self, name: &str) -> Option<&Argument> {
        self.type_variables.iter().find(|v| v.name() == name)
    }

    // === Error Reporting ===

    /// Record that `value` could not be converted.
    pub fn reject(&self, value: &Value, error: ConversionError) {
        tracing::trace!(value = %value, %error, "conversion rejected");
        self.errors.push(Rejection::new(Some(value.clone()), error));
    }

    /// Record a failure not tied to a particular value.
    pub fn reject_cause(&self, error: ConversionError) {
        tracing::trace!(%error, "conversion rejected");
        self.errors.push(Rejection::new(None, error));
    }

    /// Snapshot of recorded rejections.
    pub fn errors(&self) -> Vec<Rejection> {
        self.errors.snapshot()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The shared sink, for callers that want to drain it between requests.
    pub fn error_sink(&self) -> &ErrorSink {
        &self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typeconv_core::{qualifiers, types};

    #[test]
    fn default_context() {
        let ctx = ConversionContext::default();
        assert_eq!(ctx.locale().to_string(), "en-US");
        assert_eq!(ctx.charset(), Charset::Utf8);
        assert!(ctx.annotations().is_empty());
        assert!(ctx.first_type_variable().is_none());
        assert!(!ctx.has_errors());
    }

    #[test]
    fn annotation_lookup_returns_first_of_kind() {
        let ctx = ConversionContext::default()
            .with_annotation(Annotation::with_value(qualifiers::FORMAT, "%Y"))
            .with_annotation(Annotation::with_value(qualifiers::FORMAT, "%d"));
        assert_eq!(ctx.annotation(qualifiers::FORMAT).and_then(Annotation::value), Some("%Y"));
        assert!(ctx.annotation(qualifiers::READABLE_BYTES).is_none());
    }

    #[test]
    fn type_variables_by_name() {
        let ctx = ConversionContext::default()
            .with_type_variable(Argument::named("K", types::STRING))
            .with_type_variable(Argument::named("V", types::INT32));
        assert_eq!(ctx.first_type_variable().map(Argument::ty), Some(types::STRING));
        assert_eq!(ctx.type_variable("V").map(Argument::ty), Some(types::INT32));
        assert!(ctx.type_variable("E").is_none());
    }

    #[test]
    fn narrowing_replaces_type_variables_and_keeps_the_rest() {
        let ctx = ConversionContext::default()
            .with_charset(Charset::Iso8859_1)
            .with_annotation(Annotation::marker(qualifiers::READABLE_BYTES))
            .with_type_variable(Argument::named("E", types::LIST));

        let inner = Argument::list_of(types::INT32);
        let narrowed = ctx.with_argument(&inner);

        assert_eq!(narrowed.charset(), Charset::Iso8859_1);
        assert_eq!(narrowed.annotations().len(), 1);
        assert_eq!(narrowed.first_type_variable().map(Argument::ty), Some(types::INT32));
    }

    #[test]
    fn narrowed_context_shares_error_sink() {
        let ctx = ConversionContext::default();
        let narrowed = ctx.with_argument(&Argument::any());
        narrowed.reject(&Value::from("x"), ConversionError::Other("nope".into()));
        ctx.reject_cause(ConversionError::Io("closed".into()));

        let errors = ctx.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].value, Some(Value::from("x")));
        assert_eq!(errors[1].value, None);
    }

    #[test]
    fn drain_empties_sink() {
        let ctx = ConversionContext::default();
        ctx.reject_cause(ConversionError::Other("a".into()));
        assert_eq!(ctx.error_sink().drain().len(), 1);
        assert!(!ctx.has_errors());
    }
}
