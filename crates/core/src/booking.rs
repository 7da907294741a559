use serde::{Deserialize, Serialize};

use crate::catalog::get_service_by_id;
use crate::error::{BookingError, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetRange {
    #[serde(rename = "under-10k")]
    Under10k,
    #[serde(rename = "10k-25k")]
    From10kTo25k,
    #[serde(rename = "25k-50k")]
    From25kTo50k,
    #[serde(rename = "50k-100k")]
    From50kTo100k,
    #[serde(rename = "over-100k")]
    Over100k,
}

impl BudgetRange {
    pub const ALL: [BudgetRange; 5] = [
        Self::Under10k,
        Self::From10kTo25k,
        Self::From25kTo50k,
        Self::From50kTo100k,
        Self::Over100k,
    ];

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Under10k => "under-10k",
            Self::From10kTo25k => "10k-25k",
            Self::From25kTo50k => "25k-50k",
            Self::From50kTo100k => "50k-100k",
            Self::Over100k => "over-100k",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Under10k => "Under $10,000",
            Self::From10kTo25k => "$10,000 - $25,000",
            Self::From25kTo50k => "$25,000 - $50,000",
            Self::From50kTo100k => "$50,000 - $100,000",
            Self::Over100k => "Over $100,000",
        }
    }
}

impl std::str::FromStr for BudgetRange {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let code = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|range| range.as_code() == code)
            .ok_or_else(|| ParseError::UnknownBudget(value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeline {
    #[serde(rename = "asap")]
    Asap,
    #[serde(rename = "1-month")]
    WithinOneMonth,
    #[serde(rename = "3-months")]
    WithinThreeMonths,
    #[serde(rename = "6-months")]
    WithinSixMonths,
    #[serde(rename = "flexible")]
    Flexible,
}

impl Timeline {
    pub const ALL: [Timeline; 5] = [
        Self::Asap,
        Self::WithinOneMonth,
        Self::WithinThreeMonths,
        Self::WithinSixMonths,
        Self::Flexible,
    ];

    pub fn as_code(self) -> &'static str {
        match self {
            Self::Asap => "asap",
            Self::WithinOneMonth => "1-month",
            Self::WithinThreeMonths => "3-months",
            Self::WithinSixMonths => "6-months",
            Self::Flexible => "flexible",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Asap => "ASAP",
            Self::WithinOneMonth => "Within 1 month",
            Self::WithinThreeMonths => "Within 3 months",
            Self::WithinSixMonths => "Within 6 months",
            Self::Flexible => "Flexible",
        }
    }
}

impl std::str::FromStr for Timeline {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let code = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|timeline| timeline.as_code() == code)
            .ok_or_else(|| ParseError::UnknownTimeline(value.to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub service_id: String,
    pub message: String,
    pub budget: Option<BudgetRange>,
    pub timeline: Option<Timeline>,
}

impl BookingRequest {
    /// Blank form with the service pre-selected, as opened from a service card.
    pub fn for_service(service_id: Option<&str>) -> Self {
        Self {
            service_id: service_id.unwrap_or_default().to_string(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), BookingError> {
        if self.name.trim().is_empty() {
            return Err(BookingError::MissingName);
        }

        if !looks_like_email(self.email.trim()) {
            return Err(BookingError::InvalidEmail(self.email.clone()));
        }

        let service_id = self.service_id.trim();
        if service_id.is_empty() {
            return Err(BookingError::MissingService);
        }
        if get_service_by_id(service_id).is_none() {
            return Err(BookingError::UnknownService(service_id.to_string()));
        }

        Ok(())
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}
