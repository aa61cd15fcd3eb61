pub mod bert;

pub use bert::{BertClassifierOptions, BertTextClassifier};
