// Integration tests for the text classification pipeline
// This is a separate crate that tests the public API

use std::io::Write;
use std::path::PathBuf;
use textclass::pipelines::text_classification::*;

const AG_NEWS_REPO: &str = "textattack/bert-base-uncased-ag-news";
const AG_NEWS_LABELS: [&str; 4] = ["World", "Sports", "Business", "Sci/Tech"];

fn write_corpus(name: &str, lines: &[&str]) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("textclass-it-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let mut file = std::fs::File::create(dir.join("test.jsonl")).unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    dir
}

#[test]
fn corpus_roundtrips_through_the_public_api() -> anyhow::Result<()> {
    let dir = write_corpus(
        "roundtrip",
        &[
            r#"{"text": "Stocks slid on weak earnings.", "label": 2}"#,
            r#"{"text": "The striker scored twice in the final.", "label": 1}"#,
        ],
    );

    let corpus = Corpus::open(&CorpusSource::LocalDir(dir), "test", None)?;
    let records: Vec<CorpusRecord> = corpus.iter()?.collect::<Result<_>>()?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].label, 2);
    assert_eq!(records[1].text, "The striker scored twice in the final.");
    Ok(())
}

#[test]
fn missing_split_fails_before_any_inference() {
    let dir = write_corpus("nosplit", &[]);
    let err = Corpus::open(&CorpusSource::LocalDir(dir), "train", None).unwrap_err();
    assert!(matches!(err, PipelineError::DatasetNotFound { .. }));
}

#[test]
fn finalize_is_usable_without_a_loaded_model() -> anyhow::Result<()> {
    let schema = LabelSchema::new(AG_NEWS_LABELS);
    let prediction = finalize(&[0.5, 2.5, -1.0, 0.0], &schema)?;
    let sum: f32 = prediction.probabilities.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6);
    assert_eq!(prediction.predicted_label, 1);
    assert_eq!(schema.name(prediction.predicted_label), Some("Sports"));
    Ok(())
}

#[test]
#[ignore = "downloads model weights from the hub"]
fn encode_is_deterministic_and_fixed_length() -> anyhow::Result<()> {
    let pipeline = TextClassificationPipelineBuilder::bert(AG_NEWS_REPO)
        .labels(AG_NEWS_LABELS)
        .max_length(128)
        .cpu()
        .build()?;

    let texts = [
        "",
        "Oil prices climbed again on Monday.",
        &"very long input ".repeat(400),
    ];
    for text in texts {
        let first = pipeline.encode(text)?;
        let second = pipeline.encode(text)?;
        assert_eq!(first, second);
        assert_eq!(first.len(), 128);
        assert_eq!(first.attention_mask.len(), 128);
    }
    Ok(())
}

#[test]
#[ignore = "downloads model weights from the hub"]
fn ag_news_predictions_are_valid_distributions() -> anyhow::Result<()> {
    let pipeline = TextClassificationPipelineBuilder::bert(AG_NEWS_REPO)
        .labels(AG_NEWS_LABELS)
        .max_length(128)
        .cpu()
        .build()?;

    let prediction =
        pipeline.predict("The home team clinched the championship with a late goal.")?;
    assert_eq!(prediction.probabilities.len(), 4);
    let sum: f32 = prediction.probabilities.iter().sum();
    assert!((sum - 1.0).abs() < 1e-6);
    assert_eq!(prediction.predicted_label, argmax(&prediction.probabilities));

    // Empty input is valid and still yields a length-C distribution.
    let empty = pipeline.predict("")?;
    assert_eq!(empty.probabilities.len(), 4);
    Ok(())
}

#[test]
#[ignore = "downloads model weights from the hub"]
fn batch_runs_are_idempotent_and_keep_input_order() -> anyhow::Result<()> {
    let dir = write_corpus(
        "idempotent",
        &[
            r#"{"text": "Peace talks resumed in the capital on Tuesday.", "label": 0}"#,
            r#"{"text": "The quarterback threw for three touchdowns.", "label": 1}"#,
            r#"{"text": "Shares of the retailer fell after the earnings call.", "label": 2}"#,
            r#"{"text": "Researchers unveiled a faster chip fabrication process.", "label": 3}"#,
            r#"{"text": "", "label": 0}"#,
        ],
    );

    let pipeline = TextClassificationPipelineBuilder::bert(AG_NEWS_REPO)
        .labels(AG_NEWS_LABELS)
        .max_length(128)
        .cpu()
        .build()?;
    let corpus = Corpus::open(&CorpusSource::LocalDir(dir), "test", Some(5))?;

    let first = pipeline.classify_corpus(&corpus)?;
    let second = pipeline.classify_corpus(&corpus)?;
    assert_eq!(first.len(), 5);
    assert_eq!(second.len(), 5);

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.record, b.record);
        let pa = a.outcome.as_ref().unwrap();
        let pb = b.outcome.as_ref().unwrap();
        assert_eq!(pa.predicted_label, pb.predicted_label);
        // Bit-for-bit: no randomness at inference time.
        assert_eq!(pa.probabilities, pb.probabilities);

        let report = pipeline.render_report(a);
        assert!(report.contains("truth:"));
        assert!(report.contains("Sports"));
    }
    Ok(())
}
