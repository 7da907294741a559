pub mod booking;
pub mod catalog;
pub mod error;
pub mod intent;
pub mod models;
pub mod responder;

pub use booking::{BookingRequest, BudgetRange, Timeline};
pub use catalog::{get_service_by_id, list_services, services_by_category};
pub use error::{BookingError, ParseError};
pub use intent::{analyze_message, classify_intent, extract_entities};
pub use models::*;
pub use responder::{
    compose_reply, generate_customization_response, generate_detailed_service_response,
    generate_response, AssistantReply,
};
