use std::fmt;

use super::domain::{Profile, RawProfile, RawValue};

/// Profile inputs the matcher cannot proceed without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Field,
    Province,
    Year,
    Gpa,
    Income,
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProfileField::Field => "field",
            ProfileField::Province => "province",
            ProfileField::Year => "year",
            ProfileField::Gpa => "gpa",
            ProfileField::Income => "income",
        };
        f.write_str(name)
    }
}

/// Input errors surfaced to the caller; never defaulted away.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("profile field `{0}` is required")]
    Missing(ProfileField),
    #[error("profile field `{field}` must be numeric (received {raw:?})")]
    NotNumeric { field: ProfileField, raw: String },
    #[error("profile field `year` must be a whole number between 0 and 255 (received {raw:?})")]
    InvalidYear { raw: String },
}

/// Strip everything except digits, `-` and `.` and parse what remains.
///
/// Tolerates currency symbols and thousands separators (`"R 300,000"` -> `300000.0`).
pub(crate) fn coerce_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '-' || *ch == '.')
        .collect();

    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub(crate) fn parse_interests(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn required_text(value: &str, field: ProfileField) -> Result<String, ProfileError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::Missing(field));
    }
    Ok(trimmed.to_string())
}

fn required_number(value: Option<&RawValue>, field: ProfileField) -> Result<f64, ProfileError> {
    match value {
        None => Err(ProfileError::Missing(field)),
        Some(RawValue::Number(number)) if number.is_finite() => Ok(*number),
        Some(RawValue::Number(number)) => Err(ProfileError::NotNumeric {
            field,
            raw: number.to_string(),
        }),
        Some(RawValue::Text(text)) if text.trim().is_empty() => Err(ProfileError::Missing(field)),
        Some(RawValue::Text(text)) => {
            coerce_number(text).ok_or_else(|| ProfileError::NotNumeric {
                field,
                raw: text.clone(),
            })
        }
    }
}

fn required_year(value: Option<&RawValue>) -> Result<u8, ProfileError> {
    let year = required_number(value, ProfileField::Year)?;
    if year.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&year) {
        return Err(ProfileError::InvalidYear {
            raw: year.to_string(),
        });
    }
    Ok(year as u8)
}

/// Coerce a submitted profile into its canonical form.
///
/// Only types are checked here; ranges belong to the eligibility rules.
pub fn normalize(raw: &RawProfile) -> Result<Profile, ProfileError> {
    Ok(Profile {
        field: required_text(&raw.field, ProfileField::Field)?,
        province: required_text(&raw.province, ProfileField::Province)?,
        year: required_year(raw.year.as_ref())?,
        gpa: required_number(raw.gpa.as_ref(), ProfileField::Gpa)?,
        income: required_number(raw.income.as_ref(), ProfileField::Income)?,
        interests: parse_interests(&raw.interests),
    })
}
