use anyhow::{Context, Result};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use pdf_translate_client::{ApiClient, AppConfig, PdfFile, TranslationSession};

const USAGE: &str = "usage: pdf-translate-client <file.pdf> [page ...]";

#[tokio::main]
async fn main() -> Result<()> {
    // Config comes first: it carries the default log filter
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!(
        "Loaded configuration: base_url={}, timeout={}ms, upload_timeout={}ms",
        config.api.base_url, config.api.timeout_ms, config.api.upload_timeout_ms
    );

    let mut args = std::env::args().skip(1);
    let path = args.next().context(USAGE)?;
    let pages = args
        .map(|arg| {
            arg.parse::<u32>()
                .with_context(|| format!("Invalid page number: {}", arg))
        })
        .collect::<Result<Vec<u32>>>()?;

    let file = PdfFile::from_path(&path)
        .await
        .with_context(|| format!("Failed to read {}", path))?;

    let api = ApiClient::from_config(&config.api)?;
    let mut session = TranslationSession::new(api);

    let page_numbers = if pages.is_empty() { None } else { Some(pages.as_slice()) };
    let outcome = match session.upload(&file).await {
        Ok(()) => session.translate(page_numbers).await,
        Err(e) => Err(e),
    };

    match &outcome {
        Ok(()) => info!(
            "Done: {}/{} pages ({}%)",
            session.store().translate_progress(),
            session.store().total_pages(),
            session.store().translate_progress_percent()
        ),
        Err(e) => error!("Translation failed: {}", e),
    }

    println!("{}", serde_json::to_string_pretty(&session.store().snapshot())?);
    outcome?;

    Ok(())
}
