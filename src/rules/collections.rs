//! Iterables and arrays.
//!
//! The element type of an iterable target comes from the context's first
//! type variable (see [`ConversionService::convert_argument`]); an array
//! target carries its own component type. Elements that fail to convert are
//! dropped, and their rejections stay on the shared context.

use typeconv_core::{Argument, TypeHash, Value, types};

use crate::{ConversionContext, ConversionService};

pub(crate) fn register(service: &ConversionService) {
    service
        .add_converter(types::TEXT, types::ITERABLE, text_to_iterable)
        .add_converter(types::TEXT, types::ANY_ARRAY, text_to_array)
        .add_converter(types::ITERABLE, types::ITERABLE, iterable_to_iterable)
        .add_converter(types::ANY_ARRAY, types::ITERABLE, iterable_to_iterable)
        .add_converter(types::ITERABLE, types::ANY_ARRAY, iterable_to_array)
        .add_converter(types::ANY_ARRAY, types::ANY_ARRAY, iterable_to_array);
}

/// Comma separated fragments, without trimming.
///
/// Text without a comma is a single fragment (even when empty); otherwise
/// trailing empty fragments are dropped.
fn split_fragments(text: &str) -> Vec<&str> {
    if !text.contains(',') {
        return vec![text];
    }
    let mut fragments: Vec<&str> = text.split(',').collect();
    while fragments.last().is_some_and(|f| f.is_empty()) {
        fragments.pop();
    }
    fragments
}

fn element_argument(context: &ConversionContext) -> Argument {
    context.first_type_variable().cloned().unwrap_or_else(Argument::any)
}

/// Convert each item to `element`, dropping failures. `any` keeps items as they are.
fn convert_items<'a>(
    service: &ConversionService,
    items: impl IntoIterator<Item = &'a Value>,
    element: &Argument,
    context: &ConversionContext,
) -> Vec<Value> {
    if element.ty() == types::ANY {
        return items.into_iter().cloned().collect();
    }
    items
        .into_iter()
        .filter_map(|item| service.convert_argument(item, element, context))
        .collect()
}

/// A set for set targets, otherwise a list.
fn rebuild(service: &ConversionService, target: TypeHash, items: Vec<Value>) -> Value {
    if service.types().is_instance(target, types::SET) {
        Value::set(items)
    } else {
        Value::list(items)
    }
}

fn text_to_iterable(service: &ConversionService, value: &Value, target: TypeHash, context: &ConversionContext) -> Option<Value> {
    let text = value.to_text();
    let fragments: Vec<Value> = split_fragments(&text).into_iter().map(Value::text).collect();
    let items = convert_items(service, &fragments, &element_argument(context), context);
    Some(rebuild(service, target, items))
}

fn text_to_array(service: &ConversionService, value: &Value, target: TypeHash, context: &ConversionContext) -> Option<Value> {
    let component = service.types().component_of(target)?;
    let text = value.to_text();
    let fragments: Vec<Value> = split_fragments(&text).into_iter().map(Value::text).collect();
    let items = convert_items(service, &fragments, &Argument::of(component), context);
    Some(Value::array(component, items))
}

/// Already an instance with untyped elements: returned as is. Otherwise
/// rebuilt with each element converted.
fn iterable_to_iterable(service: &ConversionService, value: &Value, target: TypeHash, context: &ConversionContext) -> Option<Value> {
    let items = value.elements()?;
    let element = element_argument(context);
    if element.ty() == types::ANY && service.types().is_instance(value.type_hash(), target) {
        return Some(value.clone());
    }
    let converted = convert_items(service, items, &element, context);
    Some(rebuild(service, target, converted))
}

fn iterable_to_array(service: &ConversionService, value: &Value, target: TypeHash, context: &ConversionContext) -> Option<Value> {
    let items = value.elements()?;
    if service.types().is_instance(value.type_hash(), target) {
        return Some(value.clone());
    }
    let component = service.types().component_of(target)?;
    let converted = convert_items(service, items, &Argument::of(component), context);
    Some(Value::array(component, converted))
}
