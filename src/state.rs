use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::database::DrinkRepository;

/// Shared context handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub drinks: Arc<dyn DrinkRepository>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(drinks: Arc<dyn DrinkRepository>, verifier: TokenVerifier) -> Self {
        Self {
            drinks,
            verifier: Arc::new(verifier),
        }
    }
}
