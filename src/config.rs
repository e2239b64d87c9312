//! Service configuration.

use typeconv_core::types::{Charset, Locale};

/// Default number of resolved keys the cache remembers.
pub const DEFAULT_CACHE_CAPACITY: usize = 60;

/// Settings fixed when a [`ConversionService`](crate::ConversionService) is built.
///
/// # Example
///
/// ```
/// use typeconv::{ConversionService, ServiceConfig};
/// use typeconv::types::Charset;
///
/// let config = ServiceConfig::default()
///     .with_cache_capacity(256)
///     .with_charset(Charset::Iso8859_1);
/// let service = ConversionService::with_config(config);
/// assert_eq!(service.context().charset(), Charset::Iso8859_1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Resolution cache size. Zero disables the cache.
    pub cache_capacity: usize,
    /// Locale of contexts created by the service.
    pub locale: Locale,
    /// Charset of contexts created by the service.
    pub charset: Charset,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            locale: Locale::en_us(),
            charset: Charset::Utf8,
        }
    }
}

impl ServiceConfig {
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }
}
