pub mod text_classification;
pub mod utils;
