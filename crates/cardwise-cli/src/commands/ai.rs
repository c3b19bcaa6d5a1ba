//! AI backend command implementations

use anyhow::Result;
use cardwise_core::ai::{parsing::find_json_object, AIBackend, AIClient};

use super::truncate;

const PROBE_PROMPT: &str = r#"Reply with this JSON object and nothing else: {"ok": true}"#;

/// Health-check the backend selected by AI_BACKEND and send one test prompt
pub async fn cmd_ai_test() -> Result<()> {
    let backend = std::env::var("AI_BACKEND").unwrap_or_else(|_| "ollama".to_string());
    println!("Testing AI backend ({})...\n", backend);

    let Some(client) = AIClient::from_env() else {
        println!("  No backend configured.");
        println!();
        println!("Set one of:");
        println!("  export OLLAMA_HOST=http://localhost:11434");
        println!("  export AI_BACKEND=openai_compatible OPENAI_COMPATIBLE_HOST=http://localhost:8080");
        return Ok(());
    };

    println!("  Host:  {}", client.host());
    println!("  Model: {}", client.model());
    println!();

    print!("Checking availability... ");
    if !client.health_check().await {
        println!("failed");
        println!("\nCould not reach {}. Insights will fall back to the baseline.", client.host());
        return Ok(());
    }
    println!("ok");

    print!("Sending test prompt... ");
    match client.generate(PROBE_PROMPT).await {
        Ok(reply) => {
            let verdict = if find_json_object(&reply).is_some() {
                "JSON reply"
            } else {
                "reply without JSON (insights would use the fallback)"
            };
            println!("{}", verdict);
            println!("  {}", truncate(reply.trim(), 120));
        }
        Err(e) => println!("error: {}", e),
    }

    Ok(())
}
