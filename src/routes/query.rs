use serde::Deserialize;

/// Query parameters of the destructive clear route.
#[derive(Debug, Deserialize)]
pub struct ClearQuery {
    /// Must be the literal word `DELETE`.
    pub(crate) confirm: Option<String>,
}
