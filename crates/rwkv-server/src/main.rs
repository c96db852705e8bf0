use clap::Parser;
use rwkv_chat::ChatConfig;
use rwkv_engine::{MockEngine, RwkvEngine};
use rwkv_server::{run_server, AppState, ServerConfig, SessionManager};
use rwkv_tokenizer::{ByteTokenizer, Tokenizer};
use std::net::SocketAddr;
use std::sync::Arc;

/// rwkv-server — hard-coded Q&A chat over an RWKV-style backend.
///
/// Ships with the deterministic mock backend and byte tokenizer; a real
/// model plugs in through the `RwkvEngine`/`Tokenizer` traits.
#[derive(Parser)]
#[command(name = "rwkv-server")]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Maximum concurrent chat sessions (1 serializes backend access).
    #[arg(long, default_value_t = 1)]
    max_concurrent: usize,

    /// Default cap on generated tokens per turn.
    #[arg(long, default_value_t = 500)]
    max_length: usize,

    /// Default sampling temperature.
    #[arg(long, default_value_t = 0.8)]
    temperature: f32,

    /// Default nucleus (top-p) cutoff.
    #[arg(long, default_value_t = 0.5)]
    top_p: f32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Backend and tokenizer live for the whole process.
    let engine: Arc<dyn RwkvEngine> = Arc::new(MockEngine::new());
    let tokenizer: Arc<dyn Tokenizer> = Arc::new(ByteTokenizer::new());
    tracing::info!("System info: {}", engine.system_info());

    let chat = ChatConfig {
        max_generation_length: cli.max_length,
        temperature: cli.temperature,
        top_p: cli.top_p,
        ..ChatConfig::default()
    };
    let config = ServerConfig {
        chat,
        max_concurrent_sessions: cli.max_concurrent,
    };

    let sessions = SessionManager::new(config.max_concurrent_sessions);
    tracing::info!("Session limit: {}", sessions.max_concurrent());

    let state = AppState {
        engine,
        tokenizer,
        config,
        sessions,
    };

    tracing::info!("Starting server on {}", cli.addr);
    run_server(state, cli.addr).await?;
    Ok(())
}
