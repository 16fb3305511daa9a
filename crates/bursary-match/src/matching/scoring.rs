use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Opportunity, Profile, ScoreResult};

/// Point weights for the soft-match rubric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub field_match_points: i32,
    pub related_field_points: i32,
    pub interest_overlap_points: i32,
    pub max_average_cushion_points: i32,
    pub income_cap_points: i32,
    pub province_points: i32,
    pub urgency_points: i32,
    pub urgency_window_days: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            field_match_points: 40,
            related_field_points: 20,
            interest_overlap_points: 10,
            max_average_cushion_points: 10,
            income_cap_points: 10,
            province_points: 5,
            urgency_points: 5,
            urgency_window_days: 45,
        }
    }
}

fn fold(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Stateless scorer applying the rubric to a profile/opportunity pair.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Additive score; every applicable bonus stacks and no rule short-circuits another.
    pub fn score(
        &self,
        profile: &Profile,
        opportunity: &Opportunity,
        now: DateTime<Utc>,
    ) -> ScoreResult {
        let config = &self.config;
        let mut score = 0;
        let mut notes = Vec::new();

        let wanted_field = fold(&profile.field);
        let offered_fields: Vec<String> = opportunity
            .fields
            .iter()
            .map(|field| fold(field))
            .filter(|field| !field.is_empty())
            .collect();

        if offered_fields.iter().any(|field| *field == wanted_field) {
            score += config.field_match_points;
            notes.push("Field matches".to_string());
        } else if offered_fields
            .iter()
            .any(|field| wanted_field.contains(field.as_str()) || field.contains(&wanted_field))
        {
            score += config.related_field_points;
            notes.push("Field roughly related".to_string());
        }

        let overlap: Vec<&str> = profile
            .interests
            .iter()
            .filter(|interest| offered_fields.contains(&fold(interest)))
            .map(String::as_str)
            .collect();
        if !overlap.is_empty() {
            score += config.interest_overlap_points;
            notes.push(format!("Interests overlap: {}", overlap.join(", ")));
        }

        if let Some(minimum) = opportunity.min_average {
            if profile.gpa >= minimum {
                let cushion = ((profile.gpa - minimum) / 2.0).floor();
                let bonus = (cushion as i32).clamp(0, config.max_average_cushion_points);
                score += bonus;
                notes.push(format!("Average {} clears minimum {}", profile.gpa, minimum));
            }
        }

        if let Some(cap) = opportunity.income_cap {
            if profile.income <= cap {
                score += config.income_cap_points;
                notes.push("Household income within cap".to_string());
            }
        }

        if opportunity.provinces.names(&profile.province) {
            score += config.province_points;
            notes.push(format!("Targets {}", profile.province));
        }

        if let Some(deadline) = opportunity.deadline {
            let remaining = deadline - now;
            // An out-of-range window disables the urgency bonus.
            let closes_soon = Duration::try_days(config.urgency_window_days)
                .is_some_and(|window| remaining >= Duration::zero() && remaining <= window);
            if closes_soon {
                score += config.urgency_points;
                notes.push(format!("Closes soon ({})", deadline.format("%Y-%m-%d")));
            }
        }

        ScoreResult { score, notes }
    }
}
