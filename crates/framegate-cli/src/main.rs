//! Framegate CLI — command-line entry point for the generative-media
//! gateway. The gateway itself lives in `framegate-server`; this binary
//! loads configuration from the environment and boots it.

use clap::{Parser, Subcommand};

use framegate_core::config::GatewayConfig;

/// Framegate — generative-media gateway for workflow orchestrators
#[derive(Parser)]
#[command(name = "framegate", version, about = "Framegate — generative-media gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Framegate HTTP gateway
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1", env = "FRAMEGATE_HOST")]
        host: String,
        /// Port to listen on
        #[arg(long, default_value_t = 8080, env = "FRAMEGATE_PORT")]
        port: u16,
    },

    /// Verify that the environment carries a complete gateway configuration
    CheckConfig,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framegate_core=info,framegate_server=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { host, port } => serve(host, port).await,
        Commands::CheckConfig => check_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn serve(host: String, port: u16) -> Result<(), String> {
    let gateway = GatewayConfig::from_env().map_err(|e| e.to_string())?;

    let config = framegate_server::ServerConfig {
        host: host.clone(),
        port,
    };

    println!("Starting Framegate gateway on {}:{}...", host, port);

    let addr = framegate_server::start_server(config, gateway).await?;
    println!("Framegate gateway listening on http://{}", addr);

    // Keep the process running until interrupted
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("Failed to listen for Ctrl+C: {}", e))?;

    println!("\nShutting down...");
    Ok(())
}

fn check_config() -> Result<(), String> {
    let gateway = GatewayConfig::from_env().map_err(|e| e.to_string())?;

    println!("Configuration OK");
    println!("  provider base:    {}", gateway.gemini_api_base);
    println!("  video model:      {}", gateway.video_model);
    println!("  image model:      {}", gateway.image_model);
    println!("  translate model:  {}", gateway.translate_model);
    println!("  voice id:         {}", gateway.elevenlabs_voice_id);
    println!(
        "  speech synthesis: {}",
        if gateway.elevenlabs_api_key.is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
    Ok(())
}
