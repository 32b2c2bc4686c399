pub mod health;
pub mod ocr;
#[cfg(test)]
pub(crate) mod testing;

use axum::Router;

use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new().merge(health::router()).merge(ocr::router())
}
