use ephemera::cli::run_cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if it exists (optional - won't fail if missing)
    // This must happen before any config is read from environment
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Warning: Error loading .env file: {}", e);
        }
    }

    run_cli().await
}
