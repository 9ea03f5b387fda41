use anyhow::Result;
use shared::{domain::Exercise, machine_code};
use storage::GymStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Exercise),
    NotFound { code: String },
}

/// Resolves a canonical machine code against the store. An unknown code is
/// a regular [`Lookup::NotFound`]; only store failures are errors.
pub async fn find_by_code(store: &dyn GymStore, code: &str) -> Result<Lookup> {
    let code = machine_code::canonical(code);
    if code.is_empty() {
        return Ok(Lookup::NotFound { code });
    }
    Ok(match store.get_exercise_by_code(&code).await? {
        Some(exercise) => Lookup::Found(exercise),
        None => Lookup::NotFound { code },
    })
}

/// Normalizes a raw scan payload or manual entry, then looks it up.
pub async fn lookup_payload(store: &dyn GymStore, raw_payload: &str) -> Result<Lookup> {
    find_by_code(store, &machine_code::normalize(raw_payload)).await
}
