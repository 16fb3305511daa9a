use serde::Deserialize;

/// One recommendation as returned by the advisory service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdvisoryPick {
    pub title: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub eligibility: String,
}

/// Remove a surrounding markdown code fence (```` ```json ... ``` ````) if present.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = rest.trim_start_matches(|ch: char| ch.is_ascii_alphanumeric());
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// First JSON array of picks starting at any `[`, ignoring prose before and after it.
fn first_json_array(body: &str) -> Option<Vec<AdvisoryPick>> {
    body.match_indices('[').find_map(|(start, _)| {
        serde_json::Deserializer::from_str(&body[start..])
            .into_iter::<Vec<AdvisoryPick>>()
            .next()?
            .ok()
    })
}

/// Parse the advisory text into picks, or `None` when no JSON array can be recovered.
pub(crate) fn parse_picks(raw: &str) -> Option<Vec<AdvisoryPick>> {
    let body = strip_code_fences(raw);
    if let Ok(picks) = serde_json::from_str::<Vec<AdvisoryPick>>(body) {
        return Some(picks);
    }

    first_json_array(body)
}
