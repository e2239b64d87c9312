//! Language tags.

use std::fmt;

use crate::ConversionError;

/// A BCP 47 style language tag such as `en-US` or `de`.
///
/// Only the language, region and variant subtags are kept. Underscores are
/// accepted as separators so `en_US` parses to the same locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locale {
    language: String,
    region: Option<String>,
    variant: Option<String>,
}

impl Locale {
    /// Build a locale from already-validated parts.
    pub fn new(language: &str, region: Option<&str>) -> Self {
        Self {
            language: language.to_ascii_lowercase(),
            region: region.map(str::to_ascii_uppercase),
            variant: None,
        }
    }

    /// `en-US`.
    pub fn en_us() -> Self {
        Self::new("en", Some("US"))
    }

    /// Parse a language tag.
    pub fn parse(tag: &str) -> Result<Self, ConversionError> {
        let tag = tag.trim();
        let mut parts = tag.split(['-', '_']);

        let language = parts.next().unwrap_or_default();
        if !(2..=8).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConversionError::malformed("locale", tag, "language subtag must be 2-8 letters"));
        }

        let mut locale = Locale::new(language, None);
        if let Some(region) = parts.next() {
            let alpha = region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic());
            let numeric = region.len() == 3 && region.chars().all(|c| c.is_ascii_digit());
            if !alpha && !numeric {
                return Err(ConversionError::malformed("locale", tag, format!("bad region subtag '{}'", region)));
            }
            locale.region = Some(region.to_ascii_uppercase());
        }
        if let Some(variant) = parts.next() {
            if variant.is_empty() || !variant.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ConversionError::malformed("locale", tag, format!("bad variant subtag '{}'", variant)));
            }
            locale.variant = Some(variant.to_owned());
        }
        if parts.next().is_some() {
            return Err(ConversionError::malformed("locale", tag, "too many subtags"));
        }
        Ok(locale)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn variant(&self) -> Option<&str> {
        self.variant.as_deref()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::en_us()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.language)?;
        if let Some(region) = &self.region {
            write!(f, "-{}", region)?;
        }
        if let Some(variant) = &self.variant {
            write!(f, "-{}", variant)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_language_and_region() {
        let locale = Locale::parse("en-GB").unwrap();
        assert_eq!(locale.language(), "en");
        assert_eq!(locale.region(), Some("GB"));
        assert_eq!(locale.to_string(), "en-GB");
    }

    #[test]
    fn parse_accepts_underscores_and_normalizes_case() {
        let locale = Locale::parse("PT_br").unwrap();
        assert_eq!(locale.to_string(), "pt-BR");
    }

    #[test]
    fn parse_language_only() {
        let locale = Locale::parse("de").unwrap();
        assert_eq!(locale.region(), None);
        assert_eq!(locale.to_string(), "de");
    }

    #[test]
    fn parse_variant() {
        let locale = Locale::parse("es-ES-valencia").unwrap();
        assert_eq!(locale.variant(), Some("valencia"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(Locale::parse("").is_err());
        assert!(Locale::parse("e").is_err());
        assert!(Locale::parse("en-U").is_err());
        assert!(Locale::parse("12-US").is_err());
        assert!(Locale::parse("en-US-x-y").is_err());
    }

    #[test]
    fn default_is_en_us() {
        assert_eq!(Locale::default(), Locale::en_us());
    }
}
