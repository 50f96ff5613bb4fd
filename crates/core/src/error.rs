use thiserror::Error;

/// Rejection reasons for a price report submission.
///
/// The `Display` text is returned verbatim to the caller in the 400 body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: medicationId, source, price")]
    MissingFields,

    #[error("Invalid price value")]
    InvalidPrice,

    #[error("Invalid date value")]
    InvalidDate,

    #[error("Field too long: {0}")]
    FieldTooLong(&'static str),

    #[error("Invalid JSON body")]
    MalformedBody,
}
