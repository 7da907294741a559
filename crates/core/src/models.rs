use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ParseError;
use crate::responder::{welcome_actions, welcome_message};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    Development,
    Ai,
    Consulting,
    Infrastructure,
}

impl ServiceCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "ai" | "ml" | "ai-ml" => Some(Self::Ai),
            "consulting" => Some(Self::Consulting),
            "infrastructure" | "infra" | "cloud" => Some(Self::Infrastructure),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Ai => "ai",
            Self::Consulting => "consulting",
            Self::Infrastructure => "infrastructure",
        }
    }
}

impl std::str::FromStr for ServiceCategory {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| ParseError::UnknownCategory(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingKind {
    Hourly,
    Fixed,
    Project,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub kind: PricingKind,
    pub amount: u32,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: ServiceCategory,
    pub pricing: Pricing,
    pub duration: String,
    pub features: Vec<String>,
}

/// Declaration order matters: the classifier breaks score ties in favour of the
/// variant listed first in [`Intent::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ServiceInquiry,
    Pricing,
    Booking,
    Contact,
    General,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::ServiceInquiry,
        Intent::Pricing,
        Intent::Booking,
        Intent::Contact,
        Intent::General,
    ];

    pub fn as_code(self) -> &'static str {
        match self {
            Self::ServiceInquiry => "service_inquiry",
            Self::Pricing => "pricing",
            Self::Booking => "booking",
            Self::Contact => "contact",
            Self::General => "general",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedEntities {
    pub matched_service_ids: Vec<String>,
    pub has_urgency: bool,
    pub has_budget_mention: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub intent: Intent,
    pub confidence: f64,
    #[serde(flatten)]
    pub entities: ExtractedEntities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Primary,
    Secondary,
}

/// Every action name the conversation manager knows how to dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    ShowServices,
    BookConsultation,
    SelectService,
    CustomizeQuote,
}

impl ActionName {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "show_services" => Some(Self::ShowServices),
            "book_consultation" => Some(Self::BookConsultation),
            "select_service" => Some(Self::SelectService),
            "customize_quote" => Some(Self::CustomizeQuote),
            _ => None,
        }
    }

    pub fn as_code(self) -> &'static str {
        match self {
            Self::ShowServices => "show_services",
            Self::BookConsultation => "book_consultation",
            Self::SelectService => "select_service",
            Self::CustomizeQuote => "customize_quote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOption {
    pub id: String,
    pub label: String,
    pub kind: ActionKind,
    pub action: ActionName,
    pub payload: Option<String>,
}

impl ActionOption {
    pub fn new(id: &str, label: &str, kind: ActionKind, action: ActionName) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            kind,
            action,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn to_user_action(&self) -> Result<UserAction, ParseError> {
        UserAction::from_parts(self.action.as_code(), self.payload.as_deref())
    }
}

/// A click event with its payload already resolved into the variant that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "snake_case")]
pub enum UserAction {
    ShowServices,
    BookConsultation,
    SelectService(String),
    CustomizeQuote(String),
}

impl UserAction {
    pub fn from_parts(action: &str, payload: Option<&str>) -> Result<Self, ParseError> {
        let name =
            ActionName::parse(action).ok_or_else(|| ParseError::UnknownAction(action.to_string()))?;
        let payload = payload.map(str::trim).filter(|value| !value.is_empty());

        match name {
            ActionName::ShowServices => Ok(Self::ShowServices),
            ActionName::BookConsultation => Ok(Self::BookConsultation),
            ActionName::SelectService => payload
                .map(|id| Self::SelectService(id.to_string()))
                .ok_or(ParseError::MissingPayload(name)),
            ActionName::CustomizeQuote => payload
                .map(|id| Self::CustomizeQuote(id.to_string()))
                .ok_or(ParseError::MissingPayload(name)),
        }
    }

    pub fn name(&self) -> ActionName {
        match self {
            Self::ShowServices => ActionName::ShowServices,
            Self::BookConsultation => ActionName::BookConsultation,
            Self::SelectService(_) => ActionName::SelectService,
            Self::CustomizeQuote(_) => ActionName::CustomizeQuote,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: u64,
    pub role: TurnRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub actions: Vec<ActionOption>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    Idle,
    AwaitingResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub session_id: Uuid,
    pub turns: Vec<ConversationTurn>,
    pub is_awaiting_response: bool,
    pub is_service_panel_visible: bool,
    pub is_booking_modal_open: bool,
    pub selected_service_id: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        let mut state = Self {
            session_id: Uuid::new_v4(),
            turns: Vec::new(),
            is_awaiting_response: false,
            is_service_panel_visible: false,
            is_booking_modal_open: false,
            selected_service_id: None,
        };
        state.push_assistant(welcome_message(), welcome_actions());
        state
    }

    pub fn push_user(&mut self, text: impl Into<String>) -> &ConversationTurn {
        self.push(TurnRole::User, text.into(), Vec::new())
    }

    pub fn push_assistant(
        &mut self,
        text: impl Into<String>,
        actions: Vec<ActionOption>,
    ) -> &ConversationTurn {
        self.push(TurnRole::Assistant, text.into(), actions)
    }

    pub fn phase(&self) -> ConversationPhase {
        if self.is_awaiting_response {
            ConversationPhase::AwaitingResponse
        } else {
            ConversationPhase::Idle
        }
    }

    pub fn last_turn(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    fn push(
        &mut self,
        role: TurnRole,
        text: String,
        actions: Vec<ActionOption>,
    ) -> &ConversationTurn {
        // History is append-only, so the next length is always a fresh id.
        let id = self.turns.len() as u64 + 1;
        self.turns.push(ConversationTurn {
            id,
            role,
            text,
            created_at: Utc::now(),
            actions,
        });
        &self.turns[self.turns.len() - 1]
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
