//! User-facing strings for chat failures, keyed by locale.

use super::provider::FailureCategory;

/// Message shown when chat ultimately fails, by failure bucket.
///
/// Unknown locales fall back to English.
pub fn chat_failure_message(locale: &str, category: FailureCategory) -> &'static str {
    let lang = locale.split(['-', '_']).next().unwrap_or("en");
    match lang {
        "es" => match category {
            FailureCategory::RateLimit => {
                "El asistente está recibiendo demasiadas consultas. Espera un momento e inténtalo de nuevo."
            }
            FailureCategory::Timeout => {
                "El asistente tardó demasiado en responder. Inténtalo de nuevo."
            }
            FailureCategory::Auth => {
                "No se pudo verificar el acceso al asistente. Contacta con tu administrador."
            }
            FailureCategory::Other => {
                "El asistente no está disponible ahora mismo. Inténtalo más tarde."
            }
        },
        _ => match category {
            FailureCategory::RateLimit => {
                "The assistant is handling too many requests right now. Give it a moment and try again."
            }
            FailureCategory::Timeout => {
                "The assistant took too long to respond. Please try again."
            }
            FailureCategory::Auth => {
                "Could not verify access to the assistant. Please contact your administrator."
            }
            FailureCategory::Other => {
                "The assistant is unavailable right now. Please try again later."
            }
        },
    }
}
