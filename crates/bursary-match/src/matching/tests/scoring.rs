use super::common::*;

use crate::matching::scoring::{ScoringConfig, ScoringEngine};

#[test]
fn scores_engineering_profile_against_open_opportunity() {
    let engine = ScoringEngine::default();
    let sasol = &catalog()[0];

    let result = engine.score(&profile(), sasol, now());

    // 40 field + 3 cushion + 10 income + 5 province
    assert_eq!(result.score, 58);
    assert_eq!(
        result.notes,
        vec![
            "Field matches".to_string(),
            "Average 72 clears minimum 65".to_string(),
            "Household income within cap".to_string(),
            "Targets Gauteng".to_string(),
        ]
    );
}

#[test]
fn scenario_score_clears_field_weight() {
    let engine = ScoringEngine::default();
    let transnet = &catalog()[1];

    let result = engine.score(&profile(), transnet, now());

    assert!(result.score >= 40 + 3);
    assert_eq!(result.score, 48);
    assert!(result
        .notes
        .iter()
        .any(|note| note == "Closes soon (2025-10-06)"));
}

#[test]
fn related_field_earns_partial_credit() {
    let engine = ScoringEngine::default();
    let opportunity = opportunity("Mechanical Studies Award", &["Mechanical Engineering"], &["All"]);

    let result = engine.score(&profile(), &opportunity, now());

    assert_eq!(result.score, 20);
    assert_eq!(result.notes, vec!["Field roughly related".to_string()]);
}

#[test]
fn interests_overlap_is_case_insensitive() {
    let engine = ScoringEngine::default();
    let opportunity = opportunity("Robotics Fellowship", &["robotics"], &["All"]);

    let result = engine.score(&profile(), &opportunity, now());

    assert_eq!(result.score, 10);
    assert_eq!(result.notes, vec!["Interests overlap: Robotics".to_string()]);
}

#[test]
fn cushion_bonus_is_monotone_and_capped() {
    let engine = ScoringEngine::default();
    let mut opportunity = opportunity("Merit Award", &["Law"], &["All"]);
    opportunity.min_average = Some(60.0);

    let mut previous = i32::MIN;
    for gpa in (60..=100).map(f64::from) {
        let mut applicant = profile();
        applicant.gpa = gpa;
        let score = engine.score(&applicant, &opportunity, now()).score;
        assert!(score >= previous, "score dropped at gpa {gpa}");
        assert!(score <= 10);
        previous = score;
    }
    assert_eq!(previous, 10);
}

#[test]
fn unrestricted_scope_earns_no_province_bonus() {
    let engine = ScoringEngine::default();
    let opportunity = opportunity("National Bursary", &["Law"], &["All"]);

    assert_eq!(engine.score(&profile(), &opportunity, now()).score, 0);
}

#[test]
fn custom_weights_are_applied() {
    let engine = ScoringEngine::new(ScoringConfig {
        field_match_points: 100,
        ..ScoringConfig::default()
    });
    let opportunity = opportunity("Engineering Trust", &["engineering"], &["All"]);

    assert_eq!(engine.score(&profile(), &opportunity, now()).score, 100);
    assert_eq!(engine.config().province_points, 5);
}

#[test]
fn out_of_range_urgency_window_awards_no_urgency() {
    let engine = ScoringEngine::new(ScoringConfig {
        urgency_window_days: i64::MAX,
        ..ScoringConfig::default()
    });
    let transnet = &catalog()[1];

    let result = engine.score(&profile(), transnet, now());

    assert_eq!(result.score, 48 - ScoringConfig::default().urgency_points);
    assert!(result.notes.iter().all(|note| !note.starts_with("Closes soon")));
}
