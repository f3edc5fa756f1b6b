//! Daily cron trigger for the news-monitoring pipeline: one task queue per
//! app runs its news monitor daily at an app-specific hour. Dispatches over
//! the Restate HTTP ingress the same way an external gateway would, rather
//! than calling into the workflow engine in-process.

use std::time::Duration;

use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_secs(3600);

/// One app's daily news-monitor trigger, keyed by UTC hour so different apps
/// don't all fire at once.
#[derive(Debug, Clone)]
pub struct ScheduledApp {
    pub app: String,
    pub keywords: Vec<String>,
    pub min_relevance: f64,
    pub top_k: usize,
    pub trigger_hour_utc: u32,
}

/// Polls hourly and fires each app's `NewsMonitorWorkflow` once per UTC day
/// at its configured hour. Runs for the lifetime of the process.
pub async fn run(ingress_url: String, apps: Vec<ScheduledApp>) {
    if apps.is_empty() {
        info!("no scheduled apps configured, news-monitor cron disabled");
        return;
    }

    let http = reqwest::Client::new();
    let mut last_fired_day: Vec<Option<i64>> = vec![None; apps.len()];

    loop {
        let now = chrono_utc_now();
        for (i, scheduled) in apps.iter().enumerate() {
            if now.hour != scheduled.trigger_hour_utc {
                continue;
            }
            if last_fired_day[i] == Some(now.day_number) {
                continue;
            }
            if let Err(e) = fire(&http, &ingress_url, scheduled).await {
                warn!(app = %scheduled.app, error = %e, "failed to dispatch scheduled news monitor");
                continue;
            }
            last_fired_day[i] = Some(now.day_number);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn fire(http: &reqwest::Client, ingress_url: &str, scheduled: &ScheduledApp) -> anyhow::Result<()> {
    let key = format!("{}-daily", scheduled.app);
    let url = format!("{ingress_url}/NewsMonitorWorkflow/{key}/run");
    let body = serde_json::json!({
        "app": scheduled.app,
        "keywords": scheduled.keywords,
        "min_relevance": scheduled.min_relevance,
        "top_k": scheduled.top_k,
    });
    info!(app = %scheduled.app, url = %url, "dispatching scheduled news monitor");
    let resp = http.post(&url).json(&body).send().await?;
    if !resp.status().is_success() {
        anyhow::bail!("ingress returned {}", resp.status());
    }
    Ok(())
}

/// A minimal UTC clock read, isolated here so the rest of the worker never
/// reads the system clock directly outside this scheduling loop.
struct UtcNow {
    hour: u32,
    day_number: i64,
}

fn chrono_utc_now() -> UtcNow {
    let now = chrono::Utc::now();
    UtcNow { hour: now.format("%H").to_string().parse().unwrap_or(0), day_number: now.timestamp() / 86_400 }
}
