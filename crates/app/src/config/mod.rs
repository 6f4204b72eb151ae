use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LeaderboardParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub country: Option<String>,
}
