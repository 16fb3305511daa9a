use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::matching::advisory::{AdvisoryError, AdvisoryRerankService, AiRerankAdapter};
use crate::matching::domain::{
    MatchResult, Opportunity, OpportunityDraft, Profile, ProvinceScope, RawProfile,
};
use crate::matching::store::{InMemoryOpportunityStore, OpportunityStore, StoreError};
use crate::matching::{FixedClock, MatchOrchestrator, MatchSettings, ShortlistSelector};

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid instant")
}

pub(super) fn profile() -> Profile {
    Profile {
        field: "Engineering".to_string(),
        province: "Gauteng".to_string(),
        year: 1,
        gpa: 72.0,
        income: 300_000.0,
        interests: vec!["Robotics".to_string()],
    }
}

pub(super) fn raw_profile() -> RawProfile {
    RawProfile {
        field: "Engineering".to_string(),
        province: "Gauteng".to_string(),
        year: Some("1".into()),
        gpa: Some("72".into()),
        income: Some("R300 000".into()),
        interests: "Robotics".to_string(),
    }
}

pub(super) fn draft(title: &str, fields: &[&str], provinces: &[&str]) -> OpportunityDraft {
    OpportunityDraft {
        title: title.to_string(),
        organisation: None,
        fields: fields.iter().map(|field| field.to_string()).collect(),
        eligible_years: (1..=4).collect(),
        provinces: ProvinceScope::from(
            provinces
                .iter()
                .map(|province| province.to_string())
                .collect::<Vec<_>>(),
        ),
        min_average: None,
        income_cap: None,
        deadline: None,
        url: None,
        description: None,
        requirements: Vec::new(),
    }
}

pub(super) fn opportunity(title: &str, fields: &[&str], provinces: &[&str]) -> Opportunity {
    Opportunity::from(draft(title, fields, provinces))
}

/// Sasol 58, Transnet 48, Funza Lushaka 0 (eligible); Western Cape 46 (province);
/// the mining bursary closed before `now()`.
pub(super) fn catalog_drafts() -> Vec<OpportunityDraft> {
    let mut sasol = draft(
        "Sasol STEM Undergraduate Bursary",
        &["Engineering", "Information Technology"],
        &["Mpumalanga", "Gauteng"],
    );
    sasol.min_average = Some(65.0);
    sasol.income_cap = Some(600_000.0);
    sasol.deadline = Some(date(2025, 11, 30));
    sasol.url = Some("https://www.sasolbursaries.com/stem-undergraduate".to_string());

    let mut transnet = draft("Transnet Bursary", &["Engineering", "Accounting"], &["All"]);
    transnet.min_average = Some(65.0);
    transnet.deadline = Some(date(2025, 10, 6));
    transnet.url = Some("https://www.transnet.net/careers/bursaries".to_string());

    let mut western_cape = draft(
        "Western Cape Engineering Bursary",
        &["Engineering"],
        &["Western Cape"],
    );
    western_cape.min_average = Some(60.0);
    western_cape.deadline = Some(date(2025, 12, 31));

    let mut funza = draft("Funza Lushaka Bursary", &["Education"], &["All"]);
    funza.deadline = Some(date(2025, 12, 15));

    let mut expired = draft("Expired Mining Bursary", &["Engineering", "Mining"], &["All"]);
    expired.deadline = Some(date(2025, 8, 1));

    vec![sasol, transnet, western_cape, funza, expired]
}

pub(super) fn catalog() -> Vec<Opportunity> {
    catalog_drafts().into_iter().map(Opportunity::from).collect()
}

pub(super) fn shortlist(len: usize) -> Vec<MatchResult> {
    (1..=len)
        .map(|index| MatchResult {
            title: format!("Bursary {index}"),
            reason: format!("Score {}. Field matches", 60 - index),
            eligibility: "Min avg: n/a | Years: 1 | Provinces: All | Deadline: n/a".to_string(),
            url: Some(format!("https://bursaries.example/{index}")),
        })
        .collect()
}

pub(super) fn orchestrator() -> MatchOrchestrator {
    MatchOrchestrator::new(ShortlistSelector::default(), MatchSettings::default())
        .with_clock(Arc::new(FixedClock(now())))
}

pub(super) fn orchestrator_with(advisor: Arc<dyn AdvisoryRerankService>) -> MatchOrchestrator {
    orchestrator().with_advisor(AiRerankAdapter::new(advisor, Duration::from_millis(200)))
}

/// Advisory fake answering with a fixed payload and counting calls.
pub(super) struct CannedAdvisor {
    reply: Result<String, u16>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl CannedAdvisor {
    pub(super) fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn failing_with(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompt mutex poisoned").clone()
    }
}

#[async_trait]
impl AdvisoryRerankService for CannedAdvisor {
    async fn generate(&self, prompt: &str) -> Result<String, AdvisoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .expect("prompt mutex poisoned")
            .push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(AdvisoryError::Status { status: *status }),
        }
    }
}

/// Advisory fake that never answers within any reasonable deadline.
pub(super) struct StalledAdvisor;

#[async_trait]
impl AdvisoryRerankService for StalledAdvisor {
    async fn generate(&self, _prompt: &str) -> Result<String, AdvisoryError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("[]".to_string())
    }
}

pub(super) fn seeded_store() -> Arc<InMemoryOpportunityStore> {
    Arc::new(InMemoryOpportunityStore::with_drafts(catalog_drafts()).expect("seed upsert succeeds"))
}

pub(super) struct OfflineStore;

impl OpportunityStore for OfflineStore {
    fn fetch_all(&self) -> Result<Vec<Opportunity>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn upsert(&self, _draft: OpportunityDraft) -> Result<Opportunity, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn titles(results: &[MatchResult]) -> Vec<&str> {
    results.iter().map(|result| result.title.as_str()).collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
