//! Send one prompt to an Ollama server and print the reply as it streams.
//!
//! Configuration comes from the environment (or a `.env` file):
//! `OLLAMA_BASE_URL`, `OLLAMA_MODEL` and the `OLLAMA_*_SECS` timeouts.
//!
//! ```sh
//! RUST_LOG=roottensor_llm=debug cargo run --example chat -- "Why is the sky blue?"
//! ```

use futures_util::StreamExt;
use roottensor_llm::{CallOptions, CancellationToken, OllamaProvider, Prompt, ProviderConfig};
use std::io::Write;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Say hello in five words.".to_string());

    let provider = OllamaProvider::with_config(ProviderConfig::from_env()?);
    println!("Using {} at {}", provider.model(), provider.base_url());

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let prompt = Prompt::system("You are a concise assistant.").with_user(question);
    let mut fragments = provider
        .stream_chat(&cancel, prompt.messages(), &CallOptions::default())
        .await?;

    let mut stdout = std::io::stdout();
    while let Some(fragment) = fragments.next().await {
        write!(stdout, "{}", fragment?)?;
        stdout.flush()?;
    }
    println!();

    Ok(())
}
