use {
    std::fmt,
    thiserror::Error,
};

/// A single field that failed validation when building an auction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldViolation {
    pub field:  &'static str,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Wrapper to display a list of violations on a single line.
pub struct FieldViolations<'a>(pub &'a [FieldViolation]);

impl fmt::Display for FieldViolations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuctionError {
    /// The auction fields were malformed
    #[error("Invalid auction: {}", FieldViolations(.0))]
    Validation(Vec<FieldViolation>),
    /// The underlying store failed to read or write the auction
    #[error("Auction store failure: {0}")]
    Store(String),
    /// No auction exists with the requested id
    #[error("Auction with the specified id was not found")]
    AuctionNotFound,
}

impl AuctionError {
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            AuctionError::Validation(violations) => violations,
            _ => &[],
        }
    }
}
