use thiserror::Error;

/// Errors raised while interpreting item identifiers and smelting definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The identifier does not name a known item.
    #[error("unknown item identifier `{0}`")]
    UnknownItem(String),
    /// A recipe or fuel declared a zero duration.
    #[error("{what} for `{item}` must be at least one tick")]
    ZeroDuration {
        /// Which duration was zero ("cook time" or "burn duration").
        what: &'static str,
        /// Item the definition belongs to.
        item: String,
    },
    /// Two definitions claim the same key item.
    #[error("duplicate {what} definition for `{item}`")]
    Duplicate {
        /// Kind of definition ("recipe" or "fuel").
        what: &'static str,
        /// Item the definitions share.
        item: String,
    },
}
