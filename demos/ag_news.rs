//! Classify the first five records of an AG News test split and print the
//! full per-class probability distribution for each one.
//!
//! Run with `cargo run --example ag_news`. The model downloads through the
//! hub cache on first use; the corpus sample ships with the repo.

use textclass::pipelines::text_classification::*;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "textclass=info".into()),
        )
        .init();

    let pipeline = TextClassificationPipelineBuilder::bert("textattack/bert-base-uncased-ag-news")
        .labels(["World", "Sports", "Business", "Sci/Tech"])
        .max_length(256)
        .build()?;

    let corpus = Corpus::open(
        &CorpusSource::LocalDir("demos/data/ag_news".into()),
        "test",
        Some(5),
    )?;

    for report in pipeline.classify_corpus(&corpus)? {
        println!("{}", pipeline.render_report(&report));
    }

    Ok(())
}
