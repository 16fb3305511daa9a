use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Stable identifier derived from an opportunity title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpportunityId(pub String);

impl OpportunityId {
    /// Lowercase slug: every run of characters outside `[a-z0-9]` becomes a single `-`,
    /// with no leading or trailing dash.
    pub fn from_title(title: &str) -> Self {
        let mut slug = String::with_capacity(title.len());
        let mut pending_dash = false;

        for ch in title.chars().flat_map(char::to_lowercase) {
            if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch);
            } else {
                pending_dash = true;
            }
        }

        Self(slug)
    }
}

impl fmt::Display for OpportunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A profile value as typed into the intake form: free text or an already numeric value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Student profile exactly as submitted, before any coercion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub year: Option<RawValue>,
    #[serde(default)]
    pub gpa: Option<RawValue>,
    #[serde(default)]
    pub income: Option<RawValue>,
    #[serde(default)]
    pub interests: String,
}

/// Canonical profile consumed by the eligibility and scoring rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub field: String,
    pub province: String,
    pub year: u8,
    pub gpa: f64,
    pub income: f64,
    pub interests: Vec<String>,
}

/// Provinces an opportunity is open to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum ProvinceScope {
    Unrestricted,
    RestrictedTo(BTreeSet<String>),
}

const UNRESTRICTED_SENTINEL: &str = "All";

impl ProvinceScope {
    pub fn admits(&self, province: &str) -> bool {
        match self {
            ProvinceScope::Unrestricted => true,
            ProvinceScope::RestrictedTo(_) => self.names(province),
        }
    }

    /// True only when the scope explicitly lists `province`.
    pub fn names(&self, province: &str) -> bool {
        match self {
            ProvinceScope::Unrestricted => false,
            ProvinceScope::RestrictedTo(provinces) => {
                let wanted = province.trim();
                provinces
                    .iter()
                    .any(|candidate| candidate.trim().eq_ignore_ascii_case(wanted))
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            ProvinceScope::Unrestricted => UNRESTRICTED_SENTINEL.to_string(),
            ProvinceScope::RestrictedTo(provinces) => {
                provinces.iter().cloned().collect::<Vec<_>>().join(", ")
            }
        }
    }
}

impl From<Vec<String>> for ProvinceScope {
    fn from(values: Vec<String>) -> Self {
        if values
            .iter()
            .any(|value| value.trim().eq_ignore_ascii_case(UNRESTRICTED_SENTINEL))
        {
            return ProvinceScope::Unrestricted;
        }

        ProvinceScope::RestrictedTo(
            values
                .into_iter()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .collect(),
        )
    }
}

impl From<ProvinceScope> for Vec<String> {
    fn from(scope: ProvinceScope) -> Self {
        match scope {
            ProvinceScope::Unrestricted => vec![UNRESTRICTED_SENTINEL.to_string()],
            ProvinceScope::RestrictedTo(provinces) => provinces.into_iter().collect(),
        }
    }
}

/// Opportunity as supplied by a catalog or API caller. The id is always derived from the title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityDraft {
    pub title: String,
    #[serde(default, alias = "org")]
    pub organisation: Option<String>,
    #[serde(default)]
    pub fields: BTreeSet<String>,
    #[serde(default)]
    pub eligible_years: BTreeSet<u8>,
    pub provinces: ProvinceScope,
    #[serde(default)]
    pub min_average: Option<f64>,
    #[serde(default)]
    pub income_cap: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_deadline")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

/// Funding opportunity record held by an `OpportunityStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opportunity {
    pub id: OpportunityId,
    pub title: String,
    #[serde(default)]
    pub organisation: Option<String>,
    pub fields: BTreeSet<String>,
    pub eligible_years: BTreeSet<u8>,
    pub provinces: ProvinceScope,
    #[serde(default)]
    pub min_average: Option<f64>,
    #[serde(default)]
    pub income_cap: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_deadline")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Vec<String>,
}

impl From<OpportunityDraft> for Opportunity {
    fn from(draft: OpportunityDraft) -> Self {
        Self {
            id: OpportunityId::from_title(&draft.title),
            title: draft.title,
            organisation: draft.organisation,
            fields: draft.fields,
            eligible_years: draft.eligible_years,
            provinces: draft.provinces,
            min_average: draft.min_average,
            income_cap: draft.income_cap,
            deadline: draft.deadline,
            url: draft.url,
            description: draft.description,
            requirements: draft.requirements,
        }
    }
}

/// Parse a deadline given as RFC 3339 or as a bare `YYYY-MM-DD` date (midnight UTC).
pub(crate) fn parse_deadline(raw: &str) -> Result<DateTime<Utc>, String> {
    let trimmed = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("failed to parse '{raw}' as an RFC 3339 instant or YYYY-MM-DD"))
}

fn deserialize_optional_deadline<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_deadline(&value).map_err(serde::de::Error::custom))
        .transpose()
}

/// One failed hard-eligibility rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum IneligibilityReason {
    YearOfStudy { year: u8, eligible: Vec<u8> },
    Province { province: String },
    MinimumAverage { required: f64, actual: f64 },
    IncomeCap { cap: f64, actual: f64 },
    DeadlinePassed { deadline: DateTime<Utc> },
}

impl fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IneligibilityReason::YearOfStudy { year, eligible } => {
                let years = eligible
                    .iter()
                    .map(u8::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "year of study {year} not in eligible years [{years}]")
            }
            IneligibilityReason::Province { province } => {
                write!(f, "province {province} is not eligible")
            }
            IneligibilityReason::MinimumAverage { required, actual } => {
                write!(f, "average {actual} below required minimum {required}")
            }
            IneligibilityReason::IncomeCap { cap, actual } => {
                write!(f, "household income {actual} exceeds cap {cap}")
            }
            IneligibilityReason::DeadlinePassed { deadline } => {
                write!(f, "deadline {} has passed", deadline.format("%Y-%m-%d"))
            }
        }
    }
}

/// Result of the hard-eligibility rules for one profile/opportunity pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityCheck {
    pub passed: bool,
    pub reasons: Vec<IneligibilityReason>,
}

impl EligibilityCheck {
    pub fn from_reasons(reasons: Vec<IneligibilityReason>) -> Self {
        Self {
            passed: reasons.is_empty(),
            reasons,
        }
    }
}

/// Soft compatibility score with the rationale fragments that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    pub score: i32,
    pub notes: Vec<String>,
}

/// Recommendation handed to callers for display or persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub title: String,
    pub reason: String,
    pub eligibility: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Which path produced the final recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    RuleBased,
    AiAdjusted,
}

impl Provenance {
    pub const fn label(self) -> &'static str {
        match self {
            Provenance::RuleBased => "rule_based",
            Provenance::AiAdjusted => "ai_adjusted",
        }
    }
}

/// Final ordered recommendations plus provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub results: Vec<MatchResult>,
    pub provenance: Provenance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_matches_catalog_convention() {
        assert_eq!(
            OpportunityId::from_title("Sasol STEM Undergraduate Bursary").0,
            "sasol-stem-undergraduate-bursary"
        );
        assert_eq!(
            OpportunityId::from_title("Funza Lushaka Bursary (Teaching)").0,
            "funza-lushaka-bursary-teaching"
        );
        assert_eq!(
            OpportunityId::from_title("  Masakh’iSizwe Bursary Programme! ").0,
            "masakh-isizwe-bursary-programme"
        );
    }

    #[test]
    fn all_sentinel_becomes_unrestricted() {
        let scope = ProvinceScope::from(vec!["Gauteng".to_string(), "All".to_string()]);
        assert_eq!(scope, ProvinceScope::Unrestricted);
        assert!(scope.admits("Limpopo"));
        assert!(!scope.names("Gauteng"));
    }

    #[test]
    fn restricted_scope_matches_case_insensitively() {
        let scope = ProvinceScope::from(vec!["Western Cape".to_string()]);
        assert!(scope.admits(" western cape "));
        assert!(!scope.admits("Gauteng"));
        assert_eq!(scope.label(), "Western Cape");
    }

    #[test]
    fn draft_deserializes_catalog_shape() {
        let draft: OpportunityDraft = serde_json::from_str(
            r#"{
                "title": "CPUT Financial Aid Bursary Opportunities",
                "org": "Cape Peninsula University of Technology",
                "deadline": "2025-12-01",
                "fields": ["Engineering", "Health Sciences"],
                "eligibleYears": [1, 2, 3],
                "provinces": ["Western Cape"],
                "minAverage": 60,
                "incomeCap": null
            }"#,
        )
        .expect("draft parses");

        let opportunity = Opportunity::from(draft);
        assert_eq!(
            opportunity.id.0,
            "cput-financial-aid-bursary-opportunities"
        );
        assert_eq!(opportunity.min_average, Some(60.0));
        assert!(opportunity.income_cap.is_none());
        assert_eq!(
            opportunity.deadline.map(|d| d.to_rfc3339()),
            Some("2025-12-01T00:00:00+00:00".to_string())
        );
    }

    #[test]
    fn eligibility_check_passes_only_without_reasons() {
        assert!(EligibilityCheck::from_reasons(Vec::new()).passed);
        let failed = EligibilityCheck::from_reasons(vec![IneligibilityReason::Province {
            province: "Gauteng".to_string(),
        }]);
        assert!(!failed.passed);
        assert_eq!(failed.reasons[0].to_string(), "province Gauteng is not eligible");
    }
}
