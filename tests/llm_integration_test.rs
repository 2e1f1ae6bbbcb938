//! Integration test for completion-service connectivity.

use tictactoe_arena::{LlmClient, LlmConfig, LlmProvider};

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_openai_connectivity() {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");

    let config = LlmConfig::new(
        LlmProvider::OpenAI,
        api_key,
        "gpt-4o-mini".to_string(),
        0.0,
        50,
    );

    let client = LlmClient::new(config);

    let response = client
        .generate(
            "You are a helpful assistant.",
            "Say 'Hello, world!' and nothing else.",
        )
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_mistral_connectivity() {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("MISTRAL_API_KEY").expect("MISTRAL_API_KEY not set");

    let config = LlmConfig::new(
        LlmProvider::Mistral,
        api_key,
        "mistral-small-latest".to_string(),
        0.0,
        50,
    );

    let client = LlmClient::new(config);

    let response = client
        .generate(
            "You are a helpful assistant.",
            "Say 'Hello, world!' and nothing else.",
        )
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}
