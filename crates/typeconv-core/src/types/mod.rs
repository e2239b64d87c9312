//! Built-in descriptors and the leaf value types behind them.
//!
//! The descriptor constants (`types::INT32`, `types::LOCALE`, ...) and the
//! value types with no direct counterpart in the standard library or the
//! crates this engine builds on (`types::Locale`, `types::Charset`, ...) share
//! this module so one import covers both.

mod charset;
mod currency;
mod locale;
mod time_zone;
mod uri;

pub use charset::Charset;
pub use currency::Currency;
pub use locale::Locale;
pub use time_zone::TimeZone;
pub use uri::Uri;

pub use crate::type_hash::types::*;
