//! Draining input streams.

use typeconv_core::{ConversionError, TypeHash, Value, types};

use crate::{ConversionContext, ConversionService};

pub(crate) fn register(service: &ConversionService) {
    service
        .add_converter(types::INPUT_STREAM, types::TEXT, stream_to_text)
        .add_converter(types::INPUT_STREAM, types::NUMBER, stream_to_number);
}

/// Read the rest of the stream and decode it with the context charset.
fn read_text(value: &Value, context: &ConversionContext) -> Option<String> {
    let Value::Stream(stream) = value else {
        return None;
    };
    let decoded = stream
        .read_all()
        .map_err(ConversionError::from)
        .and_then(|bytes| context.charset().decode(&bytes));
    match decoded {
        Ok(text) => Some(text),
        Err(error) => {
            context.reject(value, error);
            None
        }
    }
}

fn stream_to_text(_: &ConversionService, value: &Value, _: TypeHash, context: &ConversionContext) -> Option<Value> {
    read_text(value, context).map(Value::Text)
}

/// The stream's text, parsed as the target number.
fn stream_to_number(service: &ConversionService, value: &Value, target: TypeHash, context: &ConversionContext) -> Option<Value> {
    let text = read_text(value, context)?;
    service.convert(&Value::Text(text), target, context)
}
