//! Identifier case conversion.

/// Rewrite an identifier in `UPPER_SNAKE_CASE`.
///
/// Word boundaries are lower-to-upper case transitions, digit-to-upper
/// transitions, and any of `-`, `_`, `.` or whitespace. Runs of separators
/// collapse to one underscore.
///
/// ```
/// use typeconv::naming::to_constant_case;
///
/// assert_eq!(to_constant_case("greenApple"), "GREEN_APPLE");
/// assert_eq!(to_constant_case("green-apple"), "GREEN_APPLE");
/// assert_eq!(to_constant_case("RED"), "RED");
/// ```
pub fn to_constant_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous: Option<char> = None;
    for c in name.trim().chars() {
        if c == '-' || c == '_' || c == '.' || c.is_whitespace() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            previous = None;
            continue;
        }
        if c.is_uppercase()
            && previous.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit())
            && !out.ends_with('_')
        {
            out.push('_');
        }
        out.extend(c.to_uppercase());
        previous = Some(c);
    }
    if out.ends_with('_') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camel_case() {
        assert_eq!(to_constant_case("fooBar"), "FOO_BAR");
        assert_eq!(to_constant_case("fooBarBaz"), "FOO_BAR_BAZ");
        assert_eq!(to_constant_case("FooBar"), "FOO_BAR");
    }

    #[test]
    fn acronyms_stay_together() {
        assert_eq!(to_constant_case("HTTPServer"), "HTTPSERVER");
        assert_eq!(to_constant_case("utf8Encoding"), "UTF8_ENCODING");
    }

    #[test]
    fn separators() {
        assert_eq!(to_constant_case("foo-bar"), "FOO_BAR");
        assert_eq!(to_constant_case("foo bar"), "FOO_BAR");
        assert_eq!(to_constant_case("foo__bar"), "FOO_BAR");
        assert_eq!(to_constant_case(" foo-"), "FOO");
    }

    #[test]
    fn already_constant_case() {
        assert_eq!(to_constant_case("FOO_BAR"), "FOO_BAR");
        assert_eq!(to_constant_case(""), "");
    }
}
