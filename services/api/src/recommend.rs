use crate::infra::{build_orchestrator, frozen_clock, load_store};
use bursary_match::config::AppConfig;
use bursary_match::error::AppError;
use bursary_match::matching::{BursaryMatchService, MatchOutcome, RawProfile, RawValue};
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct MatchArgs {
    /// Field of study, e.g. "Engineering"
    #[arg(long)]
    pub(crate) field: String,
    /// Home province, e.g. "Gauteng"
    #[arg(long)]
    pub(crate) province: String,
    /// Year of study (1 for first year)
    #[arg(long)]
    pub(crate) year: String,
    /// Academic average as a percentage
    #[arg(long)]
    pub(crate) gpa: String,
    /// Annual household income; currency symbols and separators are ignored
    #[arg(long)]
    pub(crate) income: String,
    /// Comma-separated interests
    #[arg(long, default_value = "")]
    pub(crate) interests: String,
    /// JSON or CSV catalog (overrides APP_CATALOG_PATH)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Ask the configured advisory endpoint to rerank the shortlist
    #[arg(long)]
    pub(crate) use_ai: bool,
    /// Evaluate deadlines as of this date (YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the outcome as JSON instead of a readable listing
    #[arg(long)]
    pub(crate) json: bool,
}

impl MatchArgs {
    fn raw_profile(&self) -> RawProfile {
        RawProfile {
            field: self.field.clone(),
            province: self.province.clone(),
            year: Some(RawValue::from(self.year.as_str())),
            gpa: Some(RawValue::from(self.gpa.as_str())),
            income: Some(RawValue::from(self.income.as_str())),
            interests: self.interests.clone(),
        }
    }
}

pub(crate) async fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let catalog = args.catalog.clone().or_else(|| config.catalog_path.clone());
    let store = Arc::new(load_store(catalog.as_deref())?);

    let mut orchestrator = build_orchestrator(&config)?;
    if let Some(today) = args.today {
        orchestrator = orchestrator.with_clock(frozen_clock(today));
    }

    let service = BursaryMatchService::new(store, orchestrator);
    let outcome = service.recommend(&args.raw_profile(), args.use_ai).await?;

    if args.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Outcome unavailable as JSON: {err}"),
        }
    } else {
        render_outcome(&outcome);
    }

    Ok(())
}

pub(crate) fn render_outcome(outcome: &MatchOutcome) {
    println!("Bursary recommendations ({})", outcome.provenance.label());

    if outcome.results.is_empty() {
        println!("No open opportunities matched this profile.");
        return;
    }

    for (rank, result) in outcome.results.iter().enumerate() {
        println!("\n{}. {}", rank + 1, result.title);
        println!("   {}", result.reason);
        println!("   {}", result.eligibility);
        if let Some(url) = &result.url {
            println!("   Apply: {url}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_values_become_text_profile_fields() {
        let args = MatchArgs {
            field: "Engineering".to_string(),
            province: "Gauteng".to_string(),
            year: "1".to_string(),
            gpa: "72".to_string(),
            income: "R300 000".to_string(),
            interests: "Robotics, AI".to_string(),
            catalog: None,
            use_ai: false,
            today: None,
            json: false,
        };

        let raw = args.raw_profile();
        assert_eq!(raw.income, Some(RawValue::Text("R300 000".to_string())));
        assert_eq!(raw.interests, "Robotics, AI");
    }
}
