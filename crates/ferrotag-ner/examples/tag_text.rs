//! Tag a sentence with the dictionary from ferrotag.toml.
//!
//! ```sh
//! FERROTAG_CONFIG=ferrotag.example.toml cargo run --example tag_text -- "1,4-dichlorobenzene and aspirin"
//! ```

use anyhow::Result;
use tracing::info;

use ferrotag_ner::{ChemicalTagger, TaggerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let text = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        anyhow::bail!("usage: tag_text <text>");
    }

    let config = TaggerConfig::load()?;
    let tagger = ChemicalTagger::from_config(&config)?;

    let spans = tagger.extract_chem_entities(&text).await;
    info!("{} entities", spans.len());
    for span in spans {
        println!(
            "{:>4}..{:<4} {:<30} {:<9} {}",
            span.start,
            span.end,
            span.slice(&text),
            span.entity.kind.as_str(),
            span.entity.entity_id
        );
    }
    Ok(())
}
