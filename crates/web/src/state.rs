use axum::extract::FromRef;
use storage::{Database, services::ranking_engine::TieBreak};

/// Shared router state. Handlers pull out the part they need through
/// `State<Database>` or `State<TieBreak>`.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tie_break: TieBreak,
}

impl FromRef<AppState> for Database {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}

impl FromRef<AppState> for TieBreak {
    fn from_ref(state: &AppState) -> Self {
        state.tie_break
    }
}
