use actix_web::{get, post, web, HttpResponse};

use crate::dtos::lookup_dtos::{
    CorrectSpellingIn, CorrectSpellingOut, ScanDateOut, ScanTextIn, SuggestSessionIn,
    SuggestSessionOut,
};
use crate::dtos::ApiResponse;
use crate::middleware::auth_extractor::AuthenticatedUser;
use crate::services::lookup::LookupService;
use crate::services::scan::extract_expiry_date;
use crate::services::spelling::correct_spelling;
use crate::services::suggestions::{SuggestionService, SESSIONS};

/// GET /api/lookup/barcode/{barcode} — Open Food Facts proxy. A miss is a
/// normal response with `found: false`, not an error.
#[get("/lookup/barcode/{barcode}")]
pub async fn lookup_barcode(
    _user: AuthenticatedUser,
    lookup: web::Data<LookupService>,
    path: web::Path<String>,
) -> HttpResponse {
    let barcode = path.into_inner();
    let info = lookup.barcode_info(&barcode).await;
    let message = if info.found {
        "Produto encontrado"
    } else {
        "Produto não encontrado"
    };
    HttpResponse::Ok().json(ApiResponse::success(message, info))
}

/// GET /api/sessions — the department list offered in the product form.
#[get("/sessions")]
pub async fn list_sessions(_user: AuthenticatedUser) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::success("Sessões carregadas", SESSIONS))
}

/// POST /api/suggest-session — edge-function suggestion with local keyword
/// fallback.
#[post("/suggest-session")]
pub async fn suggest_session(
    _user: AuthenticatedUser,
    suggestions: web::Data<SuggestionService>,
    body: web::Json<SuggestSessionIn>,
) -> HttpResponse {
    if body.product_name.trim().is_empty() {
        return HttpResponse::BadRequest()
            .json(ApiResponse::error("Digite o nome do produto primeiro"));
    }

    let (suggestion, source) = suggestions.suggest(body.product_name.trim()).await;
    let message = if suggestion.is_some() {
        "Sugestão encontrada"
    } else {
        "Não foi possível sugerir. Selecione manualmente."
    };
    HttpResponse::Ok().json(ApiResponse::success(
        message,
        SuggestSessionOut { suggestion, source },
    ))
}

/// POST /api/scan/expiry-date — pulls an expiry date out of OCR'd text.
#[post("/scan/expiry-date")]
pub async fn scan_expiry_date(
    _user: AuthenticatedUser,
    body: web::Json<ScanTextIn>,
) -> HttpResponse {
    let expiry_date = extract_expiry_date(&body.text);
    let message = if expiry_date.is_some() {
        "Data encontrada"
    } else {
        "Nenhuma data reconhecida"
    };
    HttpResponse::Ok().json(ApiResponse::success(message, ScanDateOut { expiry_date }))
}

/// POST /api/spelling/correct — product-name normalization.
#[post("/spelling/correct")]
pub async fn correct_product_name(
    _user: AuthenticatedUser,
    body: web::Json<CorrectSpellingIn>,
) -> HttpResponse {
    let corrected = correct_spelling(body.text.trim());
    HttpResponse::Ok().json(ApiResponse::success(
        "Nome corrigido",
        CorrectSpellingOut { corrected },
    ))
}
