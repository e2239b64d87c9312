//! The built-in rule library.
//!
//! Every rule is a plain function registered against the broadest key it
//! serves (`text -> int32`, `number -> number`, `iterable -> iterable`);
//! hierarchy resolution routes concrete requests to it.
//!
//! | Module          | Covers                                                      |
//! |-----------------|-------------------------------------------------------------|
//! | [`text`]        | parsing text into scalars and leaf types, the text fallback |
//! | [`numeric`]     | number narrowing and widening, byte images, readable sizes  |
//! | [`time`]        | date and time parsing and formatting                        |
//! | [`collections`] | text, iterables and arrays into iterables and arrays        |
//! | [`maps`]        | map to map with key and value conversion                    |
//! | [`optional`]    | wrapping into optionals                                     |
//! | [`io`]          | draining streams                                            |

mod collections;
mod io;
mod maps;
mod numeric;
mod optional;
mod text;
mod time;

use crate::ConversionService;

/// Install every built-in rule.
pub(crate) fn register_defaults(service: &ConversionService) {
    text::register(service);
    numeric::register(service);
    time::register(service);
    collections::register(service);
    maps::register(service);
    optional::register(service);
    io::register(service);
}
