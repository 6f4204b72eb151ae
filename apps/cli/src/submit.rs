use std::error::Error;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::args::SubmitArgs;

#[derive(Serialize)]
struct SubmitBody {
    device: String,
    entries: Vec<EntryBody>,
}

#[derive(Serialize)]
struct EntryBody {
    date: String,
    total_tokens: i64,
    cost_usd: f64,
}

pub async fn run(args: SubmitArgs) -> Result<(), Box<dyn Error>> {
    let server = args.server.ok_or("missing required --server <url>")?;
    let user = args.user.ok_or("missing required --user <id>")?;

    let date = match args.date {
        Some(date) => date,
        None => gather_app::today_utc().format("%Y-%m-%d").to_string(),
    };
    let device_name = match args.device {
        Some(name) => name,
        None => std::env::var("HOSTNAME").unwrap_or_else(|_| "unknown-host".to_string()),
    };

    let tokens = args.token_count.unwrap_or(0);
    let cost = args.cost.unwrap_or(0.0);
    let body = SubmitBody {
        device: device_id(&device_name),
        entries: vec![EntryBody {
            date: date.clone(),
            total_tokens: tokens,
            cost_usd: cost,
        }],
    };

    let url = format!("{}/api/usage", server.trim_end_matches('/'));
    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .header(http_api::USER_HEADER, &user)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let payload: serde_json::Value = response.json().await?;
    if !status.is_success() {
        let message = payload["message"].as_str().unwrap_or("request failed");
        return Err(format!("server rejected submission ({status}): {message}").into());
    }

    println!("Submitted {tokens} tokens (${cost:.2}) for {date} as device {device_name}.");
    if let Some(new_badges) = payload["newBadges"].as_array() {
        for badge in new_badges {
            if let Some(name) = badge["name"].as_str() {
                println!("New badge earned: {name}");
            }
        }
    }

    Ok(())
}

/// The device id must be stable across runs so a resubmitted day overwrites
/// the same row.
fn device_id(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    digest.iter().map(|byte| format!("{byte:02x}")).collect()
}
