// Spelling normalization for free-text product names: phrase substitution
// from a fixed correction table, per-token Levenshtein nearest-match against
// a grocery dictionary, then title-casing. Pure and deterministic; applying
// it twice yields the same string.

use std::sync::OnceLock;

use regex::Regex;

/// Known misspellings and variants, applied as whole-word/phrase replacements
/// before tokenization.
const PHRASE_CORRECTIONS: &[(&str, &str)] = &[
    ("coca cola", "Coca-Cola"),
    ("cocacola", "Coca-Cola"),
    ("coca", "Coca-Cola"),
    ("coa cola", "Coca-Cola"),
    ("coca-cola", "Coca-Cola"),
    ("coka cola", "Coca-Cola"),
    ("coca kola", "Coca-Cola"),
    ("pepsi cola", "Pepsi"),
    ("pepsi", "Pepsi"),
    ("pepsicola", "Pepsi"),
    ("guarana", "Guaraná"),
    ("guarana antarctica", "Guaraná Antarctica"),
    ("guaraná", "Guaraná"),
    ("fanta", "Fanta"),
    ("sprite", "Sprite"),
    ("iorgute", "Iogurte"),
    ("iogute", "Iogurte"),
    ("yogurt", "Iogurte"),
    ("yogurte", "Iogurte"),
    ("iogurte", "Iogurte"),
    ("requeijao", "Requeijão"),
    ("requeijão", "Requeijão"),
    ("rekejao", "Requeijão"),
    ("manteiga", "Manteiga"),
    ("mantega", "Manteiga"),
    ("leite", "Leite"),
    ("lete", "Leite"),
    ("queijo", "Queijo"),
    ("kejo", "Queijo"),
    ("macarrao", "Macarrão"),
    ("macarrão", "Macarrão"),
    ("makarao", "Macarrão"),
    ("feijao", "Feijão"),
    ("feijão", "Feijão"),
    ("fejao", "Feijão"),
    ("feijaum", "Feijão"),
    ("acucar", "Açúcar"),
    ("açucar", "Açúcar"),
    ("acúcar", "Açúcar"),
    ("asucar", "Açúcar"),
    ("arroz", "Arroz"),
    ("arros", "Arroz"),
    ("farinha", "Farinha"),
    ("detergente", "Detergente"),
    ("deterjente", "Detergente"),
    ("deterrente", "Detergente"),
    ("sabao", "Sabão"),
    ("sabão", "Sabão"),
    ("sabaum", "Sabão"),
    ("agua sanitaria", "Água Sanitária"),
    ("água sanitária", "Água Sanitária"),
    ("amaciante", "Amaciante"),
    ("amasiante", "Amaciante"),
    ("desinfetante", "Desinfetante"),
    ("shampoo", "Shampoo"),
    ("xampu", "Shampoo"),
    ("shampo", "Shampoo"),
    ("xampoo", "Shampoo"),
    ("condicionador", "Condicionador"),
    ("condiscionador", "Condicionador"),
    ("sabonete", "Sabonete"),
    ("saboneti", "Sabonete"),
    ("creme dental", "Creme Dental"),
    ("pasta de dente", "Pasta de Dente"),
    ("desodorante", "Desodorante"),
    ("desodoranti", "Desodorante"),
];

/// Dictionary for the per-token nearest-match pass.
const COMMON_PRODUCTS: &[&str] = &[
    "Coca-Cola",
    "Pepsi",
    "Guaraná",
    "Fanta",
    "Sprite",
    "Iogurte",
    "Leite",
    "Queijo",
    "Requeijão",
    "Manteiga",
    "Arroz",
    "Feijão",
    "Macarrão",
    "Açúcar",
    "Farinha",
    "Detergente",
    "Sabão",
    "Amaciante",
    "Desinfetante",
    "Shampoo",
    "Condicionador",
    "Sabonete",
    "Desodorante",
    "Biscoito",
    "Bolacha",
    "Chocolate",
    "Sorvete",
    "Cerveja",
    "Vinho",
    "Suco",
    "Água",
    "Pizza",
    "Lasanha",
    "Hambúrguer",
    "Nugget",
];

/// Prepositions and articles that stay lowercase when title-casing.
const LOWERCASE_WORDS: &[&str] = &["de", "da", "do", "e", "a", "o", "em", "com"];

const MAX_CORRECTION_DISTANCE: usize = 2;

/// Standard dynamic-programming edit distance (insert/delete/substitute, unit
/// costs), over characters.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost)
                .min(prev[j + 1] + 1)
                .min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest dictionary entry within the correction distance, if any. Ties keep
/// the first minimal-distance entry in dictionary order.
pub fn closest_match(word: &str) -> Option<&'static str> {
    let lower = word.to_lowercase();
    let mut best: Option<(&'static str, usize)> = None;

    for candidate in COMMON_PRODUCTS {
        let distance = levenshtein(&lower, &candidate.to_lowercase());
        if distance <= MAX_CORRECTION_DISTANCE && best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Normalizes a free-text product name. Idempotent: the phrase table runs as
/// a single pass over the input (replacements are never re-scanned, so `coca`
/// cannot cascade into an already-corrected `Coca-Cola`), and both later
/// passes map corrected output to itself.
pub fn correct_spelling(text: &str) -> String {
    let substituted = phrase_regex().replace_all(text, |caps: &regex::Captures<'_>| {
        let matched = &caps[0];
        phrase_replacement(matched)
            .map(str::to_string)
            .unwrap_or_else(|| matched.to_string())
    });

    let tokens: Vec<String> = substituted
        .split(' ')
        .map(|word| {
            // Short tokens and anything starting with a digit (sizes like
            // "2l", "500g") are left alone.
            if word.chars().count() <= 2
                || word.chars().next().is_some_and(|c| c.is_ascii_digit())
            {
                return word.to_string();
            }
            match closest_match(word) {
                Some(entry) => entry.to_string(),
                None => word.to_string(),
            }
        })
        .collect();

    title_case(&tokens.join(" "))
}

fn phrase_replacement(matched: &str) -> Option<&'static str> {
    let lower = matched.to_lowercase();
    PHRASE_CORRECTIONS
        .iter()
        .find(|(wrong, _)| *wrong == lower)
        .map(|(_, right)| *right)
}

fn phrase_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let mut phrases: Vec<&str> = PHRASE_CORRECTIONS.iter().map(|(wrong, _)| *wrong).collect();
        // Longest alternative first so "coca cola" wins over "coca".
        phrases.sort_by(|a, b| b.len().cmp(&a.len()));
        let pattern = phrases
            .iter()
            .map(|p| regex::escape(p))
            .collect::<Vec<_>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{pattern})\b")).expect("phrase table regex")
    })
}

fn title_case(text: &str) -> String {
    static WORD: OnceLock<Regex> = OnceLock::new();
    let word = WORD.get_or_init(|| Regex::new(r"\b\w+\b").expect("word regex"));

    word.replace_all(text, |caps: &regex::Captures<'_>| {
        let lower = caps[0].to_lowercase();
        if LOWERCASE_WORDS.contains(&lower.as_str()) {
            return lower;
        }
        let mut chars = lower.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => lower,
        }
    })
    .into_owned()
}
