use serde::{Deserialize, Serialize};

use crate::services::suggestions::SuggestionSource;

#[derive(Debug, Deserialize)]
pub struct SuggestSessionIn {
    pub product_name: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestSessionOut {
    pub suggestion: Option<String>,
    pub source: SuggestionSource,
}

/// Raw text recognized by the OCR provider.
#[derive(Debug, Deserialize)]
pub struct ScanTextIn {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ScanDateOut {
    pub expiry_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CorrectSpellingIn {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CorrectSpellingOut {
    pub corrected: String,
}
