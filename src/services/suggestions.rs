// Session (department) suggestion for a product name: tries the
// `suggest-session` edge function first, then falls back to the local
// keyword ruleset. No suggestion is an empty result, not an error.

use log::warn;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::SupabaseConfig;

/// The unified department list offered in the product form.
pub const SESSIONS: &[&str] = &[
    "Farináceos & Leites",
    "Molho & Temperos",
    "Biscoito & Matinais",
    "Laticínios & Danones",
    "Bebidas Alcoólicas",
    "Perfumaria",
    "Limpeza",
    "Bebidas Não Alcoólicas",
];

/// Keyword rules for the local fallback. First category reaching the highest
/// match count wins, in rule order.
const SESSION_RULES: &[(&str, &[&str])] = &[
    (
        "Farináceos & Leites",
        &["arroz", "feijão", "macarrão", "massa", "farinha", "trigo", "aveia", "cereal", "grão", "leite"],
    ),
    (
        "Molho & Temperos",
        &["molho", "ketchup", "mostarda", "maionese", "tempero", "sal", "pimenta", "vinagre", "azeite", "óleo"],
    ),
    (
        "Biscoito & Matinais",
        &["biscoito", "bolacha", "pão", "torrada", "cereal matinal", "granola", "barra de cereal"],
    ),
    (
        "Laticínios & Danones",
        &["iogurte", "queijo", "requeijão", "manteiga", "margarina", "creme de leite", "nata", "danone"],
    ),
    (
        "Ilha",
        &["chocolate", "bala", "chiclete", "doce", "bombom", "pirulito", "snack", "salgadinho"],
    ),
    (
        "Congelados",
        &["congelado", "sorvete", "pizza", "lasanha", "nugget", "hambúrguer", "batata frita"],
    ),
    (
        "Bebidas",
        &["refrigerante", "suco", "água", "cerveja", "vinho", "energético", "chá", "café", "coca", "pepsi", "guaraná", "fanta"],
    ),
    (
        "Perfumaria",
        &["shampoo", "condicionador", "sabonete", "creme", "desodorante", "perfume", "pasta de dente", "escova"],
    ),
    (
        "Limpeza",
        &["detergente", "sabão", "amaciante", "desinfetante", "água sanitária", "limpa", "esponja", "pano"],
    ),
];

/// Where a suggestion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Ai,
    Local,
}

/// Local keyword matcher: the category with the most keyword hits in the
/// product name. Ties keep the first category in rule order.
pub fn suggest_session_local(product_name: &str) -> Option<&'static str> {
    let name = product_name.to_lowercase();

    let mut suggestion = None;
    let mut max_matches = 0;

    for (category, keywords) in SESSION_RULES {
        let matches = keywords.iter().filter(|k| name.contains(*k)).count();
        if matches > max_matches {
            max_matches = matches;
            suggestion = Some(*category);
        }
    }

    suggestion
}

#[derive(Clone)]
pub struct SuggestionService {
    client: Client,
    supabase_url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    suggestion: Option<String>,
}

impl SuggestionService {
    pub fn new(config: &SupabaseConfig, client: Client) -> Self {
        Self {
            client,
            supabase_url: config.url.clone(),
            anon_key: config.anon_key.clone(),
        }
    }

    /// Asks the edge function for a suggestion, falling back to the keyword
    /// rules when it is unavailable or returns nothing.
    pub async fn suggest(&self, product_name: &str) -> (Option<String>, SuggestionSource) {
        match self.suggest_remote(product_name).await {
            Some(suggestion) => (Some(suggestion), SuggestionSource::Ai),
            None => (
                suggest_session_local(product_name).map(str::to_string),
                SuggestionSource::Local,
            ),
        }
    }

    async fn suggest_remote(&self, product_name: &str) -> Option<String> {
        let url = format!("{}/functions/v1/suggest-session", self.supabase_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", &self.anon_key))
            .json(&json!({ "productName": product_name }))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) => {
                warn!("suggest-session unavailable, using local rules: {e}");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!("suggest-session returned {}, using local rules", response.status());
            return None;
        }

        match response.json::<SuggestionResponse>().await {
            Ok(body) => body.suggestion.filter(|s| !s.trim().is_empty()),
            Err(e) => {
                warn!("suggest-session body unreadable, using local rules: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_rules_pick_the_best_category() {
        assert_eq!(suggest_session_local("Arroz Branco 5kg"), Some("Farináceos & Leites"));
        assert_eq!(suggest_session_local("Detergente Neutro"), Some("Limpeza"));
        assert_eq!(suggest_session_local("Shampoo Anticaspa"), Some("Perfumaria"));
        assert_eq!(suggest_session_local("Pizza Congelada"), Some("Congelados"));
    }

    #[test]
    fn more_hits_beat_fewer() {
        // "creme de leite" hits Laticínios harder than "leite" alone hits
        // Farináceos.
        assert_eq!(
            suggest_session_local("Creme de Leite Nata"),
            Some("Laticínios & Danones")
        );
    }

    #[test]
    fn unknown_names_yield_nothing() {
        assert_eq!(suggest_session_local("Parafuso Phillips"), None);
        assert_eq!(suggest_session_local(""), None);
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(suggest_session_local("GUARANÁ 2L"), Some("Bebidas"));
    }
}
