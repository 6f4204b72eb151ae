use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub country_code: Option<String>,
    pub referred_by: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UsageSubmitRequest {
    pub device: Option<String>,
    pub entries: Vec<UsageEntryRequest>,
}

#[derive(Debug, Deserialize)]
pub struct UsageEntryRequest {
    pub date: String,
    pub total_tokens: Option<i64>,
    pub cost_usd: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SummaryRequest {
    pub days: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LeaderboardRequest {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsPutRequest {
    pub streak_anchor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BadgeCheckRequest {
    pub user_id: String,
}
