//! Basic usage of the Ollama client: one streamed answer, one cleaned answer.
//!
//! Make sure Ollama is running locally with the default model pulled and run:
//!   cargo run --example basic
//!
//! Set `RUST_LOG=coursekit_ollama=debug` to see request logging.

use std::io::Write;

use coursekit_ollama::{Ollama, OllamaConfig, StreamOptions};
use coursekit_types::{GenerateRequest, Generator, StreamCallbacks};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = Ollama::from_config(OllamaConfig::from_env());

    let mut printed = 0;
    let callbacks = StreamCallbacks::new()
        .on_fragment(move |text| {
            // Callbacks get the accumulated text; print only what is new.
            print!("{}", &text[printed..]);
            let _ = std::io::stdout().flush();
            printed = text.len();
        })
        .on_complete(|text| println!("\n[{} chars]", text.chars().count()))
        .on_failure(|err| eprintln!("\nstream failed: {err}"));

    let request = GenerateRequest::new("In one sentence, what makes a good course outline?");
    client
        .generate_stream(&request, StreamOptions::new(), callbacks)
        .await?;

    let completion = client
        .generate(GenerateRequest::new("Reply with a one-word course title."))
        .await?;
    println!("Cleaned: {}", completion.text);
    if let Some(usage) = completion.usage {
        println!(
            "Tokens: {} in / {} out",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    Ok(())
}
