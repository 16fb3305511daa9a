use chrono::{DateTime, Utc};

use super::domain::{EligibilityCheck, IneligibilityReason, Opportunity, Profile};

/// Apply the hard pass/fail rules in their fixed order.
///
/// Every rule is evaluated; each failure contributes exactly one reason.
pub fn check(profile: &Profile, opportunity: &Opportunity, now: DateTime<Utc>) -> EligibilityCheck {
    let mut reasons = Vec::new();

    if !opportunity.eligible_years.contains(&profile.year) {
        reasons.push(IneligibilityReason::YearOfStudy {
            year: profile.year,
            eligible: opportunity.eligible_years.iter().copied().collect(),
        });
    }

    if !opportunity.provinces.admits(&profile.province) {
        reasons.push(IneligibilityReason::Province {
            province: profile.province.clone(),
        });
    }

    if let Some(required) = opportunity.min_average {
        if profile.gpa < required {
            reasons.push(IneligibilityReason::MinimumAverage {
                required,
                actual: profile.gpa,
            });
        }
    }

    if let Some(cap) = opportunity.income_cap {
        if profile.income > cap {
            reasons.push(IneligibilityReason::IncomeCap {
                cap,
                actual: profile.income,
            });
        }
    }

    if let Some(deadline) = opportunity.deadline {
        if deadline < now {
            reasons.push(IneligibilityReason::DeadlinePassed { deadline });
        }
    }

    EligibilityCheck::from_reasons(reasons)
}
