//! Generic URI references.
//!
//! Unlike [`url::Url`], a [`Uri`] may be relative (`../a?b`) or opaque
//! (`mailto:x@y`). Parsing only validates the syntax.

use std::fmt;

use crate::ConversionError;

/// A syntactically valid URI reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri(String);

impl Uri {
    pub fn parse(text: &str) -> Result<Self, ConversionError> {
        let malformed = |detail: String| ConversionError::malformed("uri", text, detail);

        let bytes = text.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b == b'%' {
                let valid = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                    && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
                if !valid {
                    return Err(malformed(format!("bad escape at index {}", i)));
                }
                i += 3;
                continue;
            }
            if !is_uri_char(b) {
                return Err(malformed(format!("illegal character at index {}", i)));
            }
            i += 1;
        }

        if let Some(scheme) = scheme_of(text) {
            let mut chars = scheme.chars();
            let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
            if !valid {
                return Err(malformed(format!("illegal scheme '{}'", scheme)));
            }
        }
        Ok(Uri(text.to_owned()))
    }

    pub fn scheme(&self) -> Option<&str> {
        scheme_of(&self.0)
    }

    pub fn is_absolute(&self) -> bool {
        self.scheme().is_some()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The text before the first `:`, if that colon precedes any `/`, `?` or `#`.
fn scheme_of(text: &str) -> Option<&str> {
    let end = text.find([':', '/', '?', '#'])?;
    (text.as_bytes()[end] == b':').then(|| &text[..end])
}

fn is_uri_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'-' | b'.' | b'_' | b'~' | b':' | b'/' | b'?' | b'#' | b'[' | b']' | b'@' | b'!' | b'$' | b'&'
                | b'\'' | b'(' | b')' | b'*' | b'+' | b',' | b';' | b'='
        )
}
