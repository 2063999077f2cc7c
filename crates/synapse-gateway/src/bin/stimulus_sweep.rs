//! Stimulus sweep — fires every quick stimulus at a running gateway and reports how many
//! traces came back valid, plus average latency.
//! Run with gateway up: cargo run --bin stimulus_sweep [base_url]

use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;
use synapse_core::QUICK_STIMULI;
use tokio::sync::RwLock;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[tokio::main]
async fn main() {
    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    println!(
        "[SWEEP] Tracing {} stimuli against {} (ensure gateway is running)",
        QUICK_STIMULI.len(),
        base_url
    );

    let valid = Arc::new(AtomicU32::new(0));
    let rejected = Arc::new(AtomicU32::new(0));
    let failed = Arc::new(AtomicU32::new(0));
    let latencies: Arc<RwLock<Vec<u64>>> = Arc::new(RwLock::new(Vec::new()));

    let client = Client::new();

    let mut handles = Vec::new();
    for stimulus in QUICK_STIMULI {
        let client = client.clone();
        let url = format!("{}/api/v1/trace", base_url);
        let valid = Arc::clone(&valid);
        let rejected = Arc::clone(&rejected);
        let failed = Arc::clone(&failed);
        let latencies = Arc::clone(&latencies);

        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            let res = client
                .post(&url)
                .json(&json!({ "stimulus": stimulus }))
                .send()
                .await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            let body = match res {
                Ok(resp) if resp.status().is_success() => match resp.json::<Value>().await {
                    Ok(v) => Some(v),
                    Err(e) => {
                        println!("[SWEEP] {:<28} undecodable body: {}", stimulus, e);
                        None
                    }
                },
                Ok(resp) => {
                    println!("[SWEEP] {:<28} HTTP {}", stimulus, resp.status());
                    None
                }
                Err(e) => {
                    println!("[SWEEP] {:<28} request error: {}", stimulus, e);
                    None
                }
            };

            match body {
                Some(outcome) => {
                    latencies.write().await.push(elapsed_ms);
                    if outcome["validation"]["valid"].as_bool().unwrap_or(false) {
                        valid.fetch_add(1, Ordering::Relaxed);
                        println!("[SWEEP] {:<28} valid ({}ms)", stimulus, elapsed_ms);
                    } else {
                        rejected.fetch_add(1, Ordering::Relaxed);
                        println!(
                            "[SWEEP] {:<28} rejected: {}",
                            stimulus, outcome["validation"]["errors"]
                        );
                    }
                }
                None => {
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }

    for h in handles {
        let _ = h.await;
    }

    let latencies = latencies.read().await;
    println!(
        "{}",
        summary_line(
            valid.load(Ordering::Relaxed),
            rejected.load(Ordering::Relaxed),
            failed.load(Ordering::Relaxed),
            &latencies,
        )
    );
}

/// Valid share of all stimuli, and mean latency over the traces that returned a body.
fn summary_line(valid: u32, rejected: u32, failed: u32, latencies_ms: &[u64]) -> String {
    let total = valid + rejected + failed;
    let valid_pct = match total {
        0 => 0.0,
        n => f64::from(valid) * 100.0 / f64::from(n),
    };
    let mean_ms = match latencies_ms.len() {
        0 => 0.0,
        n => latencies_ms.iter().sum::<u64>() as f64 / n as f64,
    };
    format!(
        "[SWEEP] {}/{} valid ({:.1}%), {} rejected, {} failed, mean latency {:.0}ms",
        valid, total, valid_pct, rejected, failed, mean_ms
    )
}
