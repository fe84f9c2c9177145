//! Live API smoke tests. Ignored by default; run manually with
//! `cargo test -- --ignored` and a valid `OPENAI_API_KEY`.

use irlbench::config::Config;
use irlbench::logging;
use irlbench::retry::{with_retry, RetryPolicy};
use irlbench::services::{ModelAdapter, ResponseMode};

#[tokio::test]
#[ignore]
async fn free_text_generation_returns_content() {
    logging::init();

    let config = Config::from_env();
    let adapter = ModelAdapter::new(&config, "gpt-4o-mini", ResponseMode::FreeText);

    let response = adapter
        .generate("Reply with the single word: ready", &[])
        .await
        .expect("live call should succeed");

    println!("model said: {}", response);
    assert!(!response.is_empty());
}

#[tokio::test]
#[ignore]
async fn retry_wrapper_completes_against_live_endpoint() {
    logging::init();

    let config = Config::from_env();
    let adapter = ModelAdapter::new(&config, "gpt-4o-mini", ResponseMode::FreeText);
    let policy = RetryPolicy::from_config(&config);

    let outcome = with_retry(&policy, || {
        adapter.generate("What is 2 + 2? Answer with one digit.", &[])
    })
    .await;

    assert!(!outcome.is_failed());
}
