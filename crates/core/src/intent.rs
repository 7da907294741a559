use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::list_services;
use crate::models::{ClassificationResult, ExtractedEntities, Intent};

const INTENT_PHRASES: [(Intent, &[&str]); 5] = [
    (
        Intent::ServiceInquiry,
        &[
            "what services",
            "what do you offer",
            "capabilities",
            "solutions",
            "development",
        ],
    ),
    (
        Intent::Pricing,
        &[
            "price", "cost", "budget", "how much", "pricing", "quote", "estimate",
        ],
    ),
    (
        Intent::Booking,
        &[
            "book",
            "schedule",
            "appointment",
            "meeting",
            "consultation",
            "hire",
            "start project",
        ],
    ),
    (
        Intent::Contact,
        &[
            "contact",
            "reach out",
            "get in touch",
            "speak to",
            "call",
            "email",
        ],
    ),
    (
        Intent::General,
        &[
            "about",
            "company",
            "team",
            "experience",
            "portfolio",
            "clients",
        ],
    ),
];

const SERVICE_PHRASES: [(&str, &[&str]); 6] = [
    (
        "custom-software",
        &[
            "custom software",
            "bespoke",
            "tailored solution",
            "enterprise software",
        ],
    ),
    (
        "ai-solutions",
        &[
            "ai",
            "artificial intelligence",
            "machine learning",
            "ml",
            "chatbot",
            "nlp",
            "computer vision",
        ],
    ),
    (
        "web-development",
        &[
            "website",
            "web app",
            "web development",
            "frontend",
            "backend",
            "full stack",
        ],
    ),
    (
        "mobile-development",
        &[
            "mobile app",
            "ios",
            "android",
            "react native",
            "flutter",
            "mobile development",
        ],
    ),
    (
        "cloud-infrastructure",
        &[
            "cloud",
            "aws",
            "azure",
            "gcp",
            "devops",
            "infrastructure",
            "deployment",
        ],
    ),
    (
        "tech-consulting",
        &[
            "consulting",
            "strategy",
            "architecture",
            "technical advice",
            "code review",
        ],
    ),
];

static URGENCY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)urgent|asap|quickly|soon").expect("valid urgency regex"));
static BUDGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)budget|cost|price").expect("valid budget regex"));

const CONFIDENCE_FLOOR: f64 = 0.3;
const CONFIDENCE_CAP: f64 = 0.9;
const CONFIDENCE_STEP: f64 = 0.2;

/// Picks the intent whose trigger phrases appear most often. Confidence grows with
/// every matched phrase, including service mentions, and is not a probability.
pub fn classify_intent(text: &str) -> (Intent, f64) {
    let lower = text.to_lowercase();
    let (intent, max_score) = score_intents(&lower);
    let service_matches = matched_services(&lower).len();
    (intent, confidence(max_score + service_matches))
}

pub fn extract_entities(text: &str) -> ExtractedEntities {
    let lower = text.to_lowercase();

    ExtractedEntities {
        matched_service_ids: matched_services(&lower)
            .into_iter()
            .map(ToString::to_string)
            .collect(),
        has_urgency: URGENCY.is_match(&lower),
        has_budget_mention: BUDGET.is_match(&lower),
    }
}

pub fn analyze_message(text: &str) -> ClassificationResult {
    let (intent, confidence) = classify_intent(text);
    ClassificationResult {
        intent,
        confidence,
        entities: extract_entities(text),
    }
}

/// Phrases checked for `service_id`, or an empty slice for ids without any.
pub fn service_trigger_phrases(service_id: &str) -> &'static [&'static str] {
    SERVICE_PHRASES
        .iter()
        .find(|(id, _)| *id == service_id)
        .map(|(_, phrases)| *phrases)
        .unwrap_or(&[])
}

fn score_intents(lower: &str) -> (Intent, usize) {
    let mut best = (Intent::General, 0usize);

    for (intent, phrases) in INTENT_PHRASES {
        let score = phrases.iter().filter(|phrase| lower.contains(*phrase)).count();
        // strict comparison: earlier declarations keep ties
        if score > best.1 {
            best = (intent, score);
        }
    }

    best
}

fn matched_services(lower: &str) -> Vec<&'static str> {
    list_services()
        .iter()
        .filter(|service| contains_any(lower, service_trigger_phrases(&service.id)))
        .map(|service| service.id.as_str())
        .collect()
}

fn confidence(total_matches: usize) -> f64 {
    (total_matches as f64 * CONFIDENCE_STEP + CONFIDENCE_FLOOR).min(CONFIDENCE_CAP)
}

fn contains_any(input: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| input.contains(needle))
}
