//! Map to map conversion.

use typeconv_core::{Argument, TypeHash, Value, ValueMap, types};

use crate::{ConversionContext, ConversionService};

pub(crate) fn register(service: &ConversionService) {
    service.add_converter(types::MAP, types::MAP, map_to_map);
}

/// Rebuild a map with keys converted to the `K` type variable (default
/// `string`) and values to `V` (default `any`, or `string` for properties).
///
/// Entries whose key or value fails to convert are dropped.
fn map_to_map(service: &ConversionService, value: &Value, target: TypeHash, context: &ConversionContext) -> Option<Value> {
    let entries = value.entries()?;
    let properties = service.types().is_instance(target, types::PROPERTIES);

    let key_type = context
        .type_variable("K")
        .cloned()
        .unwrap_or_else(|| Argument::of(types::STRING));
    let value_type = context
        .type_variable("V")
        .cloned()
        .unwrap_or_else(|| Argument::of(if properties { types::STRING } else { types::ANY }));

    let mut converted = ValueMap::with_capacity(entries.len());
    for (k, v) in entries.iter() {
        let Some(k) = convert_entry_part(service, k, &key_type, context) else {
            continue;
        };
        let Some(v) = convert_entry_part(service, v, &value_type, context) else {
            continue;
        };
        converted.insert(k, v);
    }

    Some(if properties {
        Value::Properties(converted)
    } else {
        Value::Map(converted)
    })
}

fn convert_entry_part(
    service: &ConversionService,
    part: &Value,
    argument: &Argument,
    context: &ConversionContext,
) -> Option<Value> {
    if service.types().is_instance(part.type_hash(), argument.ty()) {
        return Some(part.clone());
    }
    service.convert_argument(part, argument, context)
}
