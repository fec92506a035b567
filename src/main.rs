use std::io::{IsTerminal, Write};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::task::JoinSet;

use coverhue::cli::Args;
use coverhue::config::Config;
use coverhue::{debug, logger, output, tui, Extraction, Extractor};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logger::set_verbose(args.verbose);

    let config = Config::resolve(&args)?;
    debug!("config"; "{config:?}");

    let extractions = extract_all(Extractor::new(config), &args.images).await?;
    let rendered = output::render(&extractions, args.format)?;

    match &args.output {
        Some(path) => {
            output::write_to(&rendered, path)?;
            debug!("output"; "wrote {}", path.display());
        }
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(rendered.as_bytes())?;
            out.flush()?;
        }
    }

    if args.preview {
        if std::io::stdout().is_terminal() {
            tui::print_preview(&extractions)?;
        } else {
            debug!("preview"; "stdout is not a terminal, skipping preview");
        }
    }

    Ok(())
}

/// Extract every image concurrently, returning results in input order.
async fn extract_all(extractor: Extractor, images: &[String]) -> Result<Vec<Extraction>> {
    let extractor = Arc::new(extractor);
    let mut tasks = JoinSet::new();
    for (index, source) in images.iter().cloned().enumerate() {
        let extractor = Arc::clone(&extractor);
        tasks.spawn(async move { (index, extractor.extract(&source).await) });
    }

    let mut results = Vec::with_capacity(images.len());
    while let Some(joined) = tasks.join_next().await {
        results.push(joined?);
    }
    results.sort_by_key(|(index, _)| *index);
    Ok(results.into_iter().map(|(_, extraction)| extraction).collect())
}
