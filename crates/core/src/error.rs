use thiserror::Error;

use crate::models::ActionName;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown service category `{0}`")]
    UnknownCategory(String),
    #[error("unknown action `{0}`")]
    UnknownAction(String),
    #[error("action `{}` requires a service id payload", .0.as_code())]
    MissingPayload(ActionName),
    #[error("unknown budget range `{0}`")]
    UnknownBudget(String),
    #[error("unknown timeline `{0}`")]
    UnknownTimeline(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("full name is required")]
    MissingName,
    #[error("`{0}` is not a valid email address")]
    InvalidEmail(String),
    #[error("a service of interest is required")]
    MissingService,
    #[error("service `{0}` is not in the catalog")]
    UnknownService(String),
}
