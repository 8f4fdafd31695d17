use std::sync::OnceLock;

use chrono::{DateTime, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;

use super::Violation;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const DIRECCION_MAX_CHARS: usize = 200;
pub const PHONE_DIGITS: usize = 8;
pub const MAX_AGE_YEARS: u32 = 120;

const EMAIL_MAX_CHARS: usize = 254;
const EMAIL_LOCAL_MAX_CHARS: usize = 64;

/// Spanish letters accepted in names on top of ASCII letters
const SPANISH_LETTERS: &str = "áéíóúÁÉÍÓÚñÑüÜ";

pub(crate) fn is_name_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c.is_whitespace() || SPANISH_LETTERS.contains(c)
}

/// Shared rule for nombre and apellido.
pub fn validate_name(value: &str) -> Result<(), Violation> {
    if value.is_empty() {
        return Err(Violation::Required);
    }
    if value.trim().is_empty() {
        return Err(Violation::OnlyWhitespace);
    }
    if !value.chars().all(is_name_char) {
        return Err(Violation::InvalidCharacters);
    }

    let chars = value.chars().count();
    if chars < NAME_MIN_CHARS {
        return Err(Violation::MinLength(NAME_MIN_CHARS));
    }
    if chars > NAME_MAX_CHARS {
        return Err(Violation::MaxLength(NAME_MAX_CHARS));
    }
    Ok(())
}

pub fn validate_nombre(value: &str) -> Result<(), Violation> {
    validate_name(value)
}

pub fn validate_apellido(value: &str) -> Result<(), Violation> {
    validate_name(value)
}

/// Accepts `YYYY-MM-DD` (midnight UTC), a local timestamp without offset (read as UTC), or
/// RFC 3339.
pub fn parse_birth_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|date| date.with_timezone(&Utc))
}

/// Earliest accepted birth instant, `MAX_AGE_YEARS` calendar years before `now`.
pub fn earliest_birth_date(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Date-picker bounds as (earliest, latest) calendar days.
pub fn birth_date_bounds(now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    (earliest_birth_date(now).date_naive(), now.date_naive())
}

pub fn validate_birth_date(value: &str, now: DateTime<Utc>) -> Result<(), Violation> {
    if value.trim().is_empty() {
        return Err(Violation::Required);
    }

    // A bare calendar day is judged against the picker's day bounds, timestamps against `now`.
    if let Ok(day) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        let (earliest, latest) = birth_date_bounds(now);
        return if day > latest {
            Err(Violation::FutureDate)
        } else if day < earliest {
            Err(Violation::TooOld)
        } else {
            Ok(())
        };
    }

    let born = parse_birth_date(value).ok_or(Violation::InvalidDate)?;
    if born > now {
        return Err(Violation::FutureDate);
    }
    if born < earliest_birth_date(now) {
        return Err(Violation::TooOld);
    }
    Ok(())
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-zA-Z0-9!#$%&'*+/=?^_`{|}~-]+)*@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
        )
        .expect("email pattern is valid")
    })
}

pub fn validate_email(value: &str) -> Result<(), Violation> {
    if value.is_empty() {
        return Err(Violation::Required);
    }

    let local_len = value.split('@').next().map_or(0, str::len);
    if value.len() > EMAIL_MAX_CHARS
        || local_len > EMAIL_LOCAL_MAX_CHARS
        || !email_pattern().is_match(value)
    {
        return Err(Violation::InvalidEmail);
    }
    Ok(())
}

/// Optional; when present exactly eight ASCII digits.
pub fn validate_telefono(value: &str) -> Result<(), Violation> {
    if value.is_empty() {
        return Ok(());
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(Violation::NonNumeric);
    }
    if value.len() != PHONE_DIGITS {
        return Err(Violation::WrongLength(value.len()));
    }
    Ok(())
}

pub fn validate_direccion(value: &str) -> Result<(), Violation> {
    if value.chars().count() > DIRECCION_MAX_CHARS {
        return Err(Violation::MaxLength(DIRECCION_MAX_CHARS));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap()
    }

    #[test]
    fn name_rule_order() {
        assert_eq!(validate_name(""), Err(Violation::Required));
        assert_eq!(validate_name("   "), Err(Violation::OnlyWhitespace));
        assert_eq!(validate_name("Ana3"), Err(Violation::InvalidCharacters));
        assert_eq!(validate_name("A"), Err(Violation::MinLength(2)));
        assert_eq!(validate_name(&"a".repeat(51)), Err(Violation::MaxLength(50)));
        assert_eq!(validate_name(&"a".repeat(50)), Ok(()));
    }

    #[test]
    fn names_accept_spanish_letters() {
        assert_eq!(validate_nombre("José María"), Ok(()));
        assert_eq!(validate_apellido("Núñez Güemes"), Ok(()));
        assert_eq!(validate_apellido("O'Brien"), Err(Violation::InvalidCharacters));
    }

    #[test]
    fn name_length_counts_characters() {
        assert_eq!(validate_name(&"ñ".repeat(50)), Ok(()));
    }

    #[test]
    fn birth_date_today_is_valid() {
        assert_eq!(validate_birth_date("2024-06-15", now()), Ok(()));
        assert_eq!(validate_birth_date("2024-06-15T00:00:00Z", now()), Ok(()));
    }

    #[test]
    fn birth_date_one_millisecond_ahead_is_future() {
        let ahead = (now() + Duration::milliseconds(1)).to_rfc3339();
        assert_eq!(validate_birth_date(&ahead, now()), Err(Violation::FutureDate));
        assert_eq!(validate_birth_date("2024-06-16", now()), Err(Violation::FutureDate));
    }

    #[test]
    fn birth_date_age_limit() {
        assert_eq!(validate_birth_date("1904-06-15", now()), Ok(()));
        assert_eq!(validate_birth_date("1904-06-14", now()), Err(Violation::TooOld));
    }

    #[test]
    fn picker_days_stay_valid_after_midnight() {
        let afternoon = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let (earliest, latest) = birth_date_bounds(afternoon);

        assert_eq!(validate_birth_date(&earliest.to_string(), afternoon), Ok(()));
        assert_eq!(validate_birth_date(&latest.to_string(), afternoon), Ok(()));
        assert_eq!(validate_birth_date("1904-06-14", afternoon), Err(Violation::TooOld));
        assert_eq!(validate_birth_date("2024-06-16", afternoon), Err(Violation::FutureDate));
        assert_eq!(
            validate_birth_date("1904-06-15T00:00:00Z", afternoon),
            Err(Violation::TooOld)
        );
    }

    #[test]
    fn birth_date_formats() {
        assert_eq!(validate_birth_date("", now()), Err(Violation::Required));
        assert_eq!(validate_birth_date("15/06/1990", now()), Err(Violation::InvalidDate));
        assert_eq!(validate_birth_date("1990-02-30", now()), Err(Violation::InvalidDate));
        assert_eq!(validate_birth_date("1990-05-01T00:00:00", now()), Ok(()));
        assert_eq!(validate_birth_date("1990-05-01T10:30:00-05:00", now()), Ok(()));
    }

    #[test]
    fn bounds_span_the_accepted_range() {
        let (earliest, latest) = birth_date_bounds(now());
        assert_eq!(earliest, NaiveDate::from_ymd_opt(1904, 6, 15).unwrap());
        assert_eq!(latest, NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
    }

    #[test]
    fn email_shapes() {
        assert_eq!(validate_email(""), Err(Violation::Required));
        assert_eq!(validate_email("ana@correo.com"), Ok(()));
        assert_eq!(validate_email("ana.garcia+personas@sub.correo.es"), Ok(()));
        assert_eq!(validate_email("ana"), Err(Violation::InvalidEmail));
        assert_eq!(validate_email("ana@"), Err(Violation::InvalidEmail));
        assert_eq!(validate_email("ana @correo.com"), Err(Violation::InvalidEmail));
        assert_eq!(validate_email("ana@-correo.com"), Err(Violation::InvalidEmail));

        let long_local = format!("{}@correo.com", "a".repeat(65));
        assert_eq!(validate_email(&long_local), Err(Violation::InvalidEmail));
    }

    #[test]
    fn phone_boundaries() {
        assert_eq!(validate_telefono(""), Ok(()));
        assert_eq!(validate_telefono("12345678"), Ok(()));
        assert_eq!(validate_telefono("1234567"), Err(Violation::WrongLength(7)));
        assert_eq!(validate_telefono("123456789"), Err(Violation::WrongLength(9)));
        assert_eq!(validate_telefono("1234567a"), Err(Violation::NonNumeric));
        assert_eq!(validate_telefono("1234 5678"), Err(Violation::NonNumeric));
    }

    #[test]
    fn direccion_is_optional_and_bounded() {
        assert_eq!(validate_direccion(""), Ok(()));
        assert_eq!(validate_direccion(&"x".repeat(200)), Ok(()));
        assert_eq!(validate_direccion(&"x".repeat(201)), Err(Violation::MaxLength(200)));
    }
}
