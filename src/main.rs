use anyhow::Result;
use flashcard_gen::config::Config;
use flashcard_gen::definitions::{DictionaryClient, DEFINITION_NOT_FOUND};
use flashcard_gen::generator::{generate, Outcome};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    let (config, problems) = Config::from_env();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("flashcard-gen v{}", env!("CARGO_PKG_VERSION"));
    for problem in &problems {
        warn!("{problem:#}; using the default");
    }

    // failures are reported, never turned into a non-zero exit
    let outcome = match DictionaryClient::new(&config.dictionary_url, config.timeout) {
        Ok(client) => generate(&config, &client),
        Err(e) => {
            error!("can't set up dictionary lookups, no definitions will be found: {e:#}");
            generate(&config, &|_: &str| DEFINITION_NOT_FOUND.to_string())
        }
    };

    match outcome {
        Ok(Outcome::NoFlashcards) => {
            println!(
                "No flashcards to generate. Check {} file.",
                config.input.display()
            );
        }
        Ok(Outcome::Generated { path, cards, .. }) => {
            println!("PDF saved successfully as {} ({cards} flashcards)", path.display());
        }
        Err(e) => {
            error!("failed to generate flashcards: {e}");
            println!("Could not save {}: {e}", config.output.display());
        }
    }

    Ok(())
}
