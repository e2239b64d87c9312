//! Time zone identifiers.

use std::fmt;

use chrono::FixedOffset;

/// A time zone identifier.
///
/// Lookup is permissive: an id that is neither a recognizable offset nor a
/// region name resolves to `GMT` instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimeZone {
    id: String,
    offset: Option<FixedOffset>,
}

impl TimeZone {
    pub fn gmt() -> Self {
        Self {
            id: "GMT".into(),
            offset: FixedOffset::east_opt(0),
        }
    }

    /// Resolve an id such as `UTC`, `GMT+2`, `+05:30` or `Europe/Paris`.
    pub fn get(id: &str) -> Self {
        let id = id.trim();
        match id {
            "UTC" | "Z" => {
                return Self {
                    id: "UTC".into(),
                    offset: FixedOffset::east_opt(0),
                };
            }
            "GMT" => return Self::gmt(),
            _ => {}
        }

        let offset_part = id
            .strip_prefix("GMT")
            .or_else(|| id.strip_prefix("UTC"))
            .unwrap_or(id);
        if let Some(offset) = parse_offset(offset_part) {
            let seconds = offset.local_minus_utc();
            let sign = if seconds < 0 { '-' } else { '+' };
            let minutes = seconds.abs() / 60;
            return Self {
                id: format!("GMT{}{:02}:{:02}", sign, minutes / 60, minutes % 60),
                offset: Some(offset),
            };
        }

        if is_region_id(id) {
            return Self {
                id: id.to_owned(),
                offset: None,
            };
        }
        Self::gmt()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The fixed offset, if the zone is offset-based.
    pub fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }
}

impl fmt::Display for TimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// `+H`, `+HH`, `+HHMM` or `+HH:MM`, with either sign.
fn parse_offset(text: &str) -> Option<FixedOffset> {
    let (sign, rest) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        1 | 2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 18 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// `Area/Location` style names.
fn is_region_id(id: &str) -> bool {
    let mut segments = id.split('/');
    let area = segments.next().unwrap_or_default();
    let has_location = segments.next().is_some();
    has_location
        && area.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '+'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_and_gmt() {
        assert_eq!(TimeZone::get("UTC").id(), "UTC");
        assert_eq!(TimeZone::get("GMT"), TimeZone::gmt());
        assert_eq!(TimeZone::get("Z").offset(), FixedOffset::east_opt(0));
    }

    #[test]
    fn offsets_are_normalized() {
        let tz = TimeZone::get("GMT+2");
        assert_eq!(tz.id(), "GMT+02:00");
        assert_eq!(tz.offset(), FixedOffset::east_opt(7200));

        assert_eq!(TimeZone::get("-05:30").id(), "GMT-05:30");
        assert_eq!(TimeZone::get("UTC+0100").id(), "GMT+01:00");
    }

    #[test]
    fn region_ids_are_kept() {
        let tz = TimeZone::get("Europe/Paris");
        assert_eq!(tz.id(), "Europe/Paris");
        assert_eq!(tz.offset(), None);
        assert_eq!(TimeZone::get("America/Argentina/Buenos_Aires").id(), "America/Argentina/Buenos_Aires");
    }

    #[test]
    fn unknown_ids_fall_back_to_gmt() {
        assert_eq!(TimeZone::get("Mars/Olympus Mons"), TimeZone::gmt());
        assert_eq!(TimeZone::get("nonsense"), TimeZone::gmt());
        assert_eq!(TimeZone::get("GMT+99"), TimeZone::gmt());
        assert_eq!(TimeZone::get(""), TimeZone::gmt());
    }
}
