use std::sync::Arc;
use std::time::Duration;

use leaddev_agents::{ActionOutcome, BookingDesk, ConversationConfig, ConversationManager};
use leaddev_core::{
    analyze_message, ActionName, BookingRequest, BudgetRange, ConversationState, Intent,
    Timeline, TurnRole,
};
use leaddev_observability::AppMetrics;
use leaddev_storage::Store;

fn last_actions(state: &ConversationState) -> Vec<ActionName> {
    state
        .last_turn()
        .map(|turn| turn.actions.iter().map(|action| action.action).collect())
        .unwrap_or_default()
}

#[tokio::test(start_paused = true)]
async fn inquiry_to_booking_journey() {
    let metrics = AppMetrics::shared();
    let manager = ConversationManager::new(ConversationConfig::default(), metrics.clone());

    assert!(manager.submit_text("What do you offer?"));
    manager.flush().await;

    let state = manager.snapshot();
    assert_eq!(
        last_actions(&state),
        vec![ActionName::ShowServices, ActionName::BookConsultation]
    );

    let show = state.last_turn().unwrap().actions[0].clone();
    assert_eq!(manager.click(&show), ActionOutcome::Applied);
    assert!(manager.snapshot().is_service_panel_visible);

    assert_eq!(
        manager.click_action("select_service", Some("mobile-development")),
        ActionOutcome::ReplyScheduled
    );
    manager.flush().await;

    let state = manager.snapshot();
    let detail = state.last_turn().unwrap();
    assert_eq!(detail.role, TurnRole::Assistant);
    assert!(detail.text.starts_with("## Mobile App Development"));
    assert!(detail.text.contains("starting at $20,000"));

    let customize = detail.actions[1].clone();
    assert_eq!(customize.payload.as_deref(), Some("mobile-development"));
    assert_eq!(manager.click(&customize), ActionOutcome::ReplyScheduled);
    manager.flush().await;

    let state = manager.snapshot();
    assert!(state
        .last_turn()
        .unwrap()
        .text
        .starts_with("Excellent! Let me help you customize the Mobile App Development package"));
    assert_eq!(last_actions(&state), vec![ActionName::BookConsultation]);

    let book = state.last_turn().unwrap().actions[0].clone();
    assert_eq!(manager.click(&book), ActionOutcome::Applied);
    assert!(manager.snapshot().is_booking_modal_open);

    let mut request = manager.booking_draft();
    assert_eq!(request.service_id, "mobile-development");
    request.name = "Ada Lovelace".to_string();
    request.email = "ada@example.com".to_string();
    request.budget = Some(BudgetRange::From10kTo25k);
    request.timeline = Some(Timeline::Asap);

    let desk = BookingDesk::new(Arc::new(Store::memory()), metrics.clone());
    let confirmation = desk.submit(request).await.unwrap();
    assert!(confirmation.message.contains("ada@example.com"));
    manager.close_booking_modal();

    let state = manager.snapshot();
    assert!(!state.is_booking_modal_open);
    assert_eq!(state.turns.len(), 8);

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.user_turns_total, 1);
    assert_eq!(snapshot.assistant_turns_total, 4);
    assert_eq!(snapshot.replies_observed_total, 3);
    assert_eq!(snapshot.action_clicks_total, 4);
    assert_eq!(snapshot.bookings_total, 1);
}

#[tokio::test(start_paused = true)]
async fn booking_intent_reply_opens_form_from_its_button() {
    let manager = ConversationManager::new(ConversationConfig::default(), AppMetrics::shared());
    manager.submit_text("Can we book a meeting?");
    manager.flush().await;

    let state = manager.snapshot();
    let reply = state.last_turn().unwrap();
    assert!(reply.text.starts_with("I'd be delighted to help you get started!"));
    assert_eq!(reply.actions.len(), 1);
    assert_eq!(reply.actions[0].label, "Start Booking Process");

    manager.click(&reply.actions[0]);
    let state = manager.snapshot();
    assert!(state.is_booking_modal_open);
    assert_eq!(manager.booking_draft().service_id, "");
}

#[tokio::test(start_paused = true)]
async fn custom_delays_are_respected() {
    let config = ConversationConfig {
        reply_delay: Duration::from_millis(50),
        detail_delay: Duration::from_millis(20),
    };
    let manager = ConversationManager::new(config, AppMetrics::shared());

    manager.click_action("select_service", Some("tech-consulting"));
    tokio::time::sleep(Duration::from_millis(21)).await;
    assert_eq!(manager.snapshot().turns.len(), 3);

    manager.submit_text("who is on your team?");
    tokio::time::sleep(Duration::from_millis(49)).await;
    assert!(manager.snapshot().is_awaiting_response);
    tokio::time::sleep(Duration::from_millis(2)).await;

    let state = manager.snapshot();
    assert!(!state.is_awaiting_response);
    assert!(state
        .last_turn()
        .unwrap()
        .text
        .starts_with("LeadDevCorps is a leading AI systems development company"));
}

#[tokio::test(start_paused = true)]
async fn dropping_manager_cancels_replies() {
    let metrics = AppMetrics::shared();
    let mut updates = {
        let manager = ConversationManager::new(ConversationConfig::default(), metrics.clone());
        manager.submit_text("how much does it cost");
        manager.subscribe()
    };

    tokio::time::sleep(Duration::from_secs(3)).await;

    let state = updates.borrow_and_update().clone();
    assert_eq!(state.turns.len(), 2);
    assert_eq!(state.turns[1].role, TurnRole::User);
    assert_eq!(metrics.snapshot().assistant_turns_total, 0);
}

#[test]
fn classification_serializes_flat() {
    let result = analyze_message("I need an urgent mobile app, what's the budget?");
    assert_eq!(result.intent, Intent::Pricing);
    assert!((result.confidence - 0.7).abs() < 1e-9);

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["intent"], "pricing");
    assert_eq!(value["has_urgency"], true);
    assert_eq!(value["has_budget_mention"], true);
    assert_eq!(
        value["matched_service_ids"],
        serde_json::json!(["mobile-development"])
    );
}

#[tokio::test]
async fn sqlite_backed_desk_persists_and_filters() -> anyhow::Result<()> {
    let store = Arc::new(Store::sqlite("sqlite::memory:").await?);
    let desk = BookingDesk::new(store, AppMetrics::shared());

    for (name, service_id) in [
        ("Ken", "cloud-infrastructure"),
        ("Barbara", "ai-solutions"),
        ("Dennis", "cloud-infrastructure"),
    ] {
        desk.submit(BookingRequest {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            service_id: service_id.to_string(),
            ..BookingRequest::default()
        })
        .await?;
    }

    assert_eq!(desk.list().await?.len(), 3);

    let cloud = desk.for_service("cloud-infrastructure").await?;
    let names = cloud
        .iter()
        .map(|record| record.request.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"Ken") && names.contains(&"Dennis"));
    assert!(cloud.iter().all(|record| !record.id.is_nil()));

    let invalid = desk
        .submit(BookingRequest {
            name: "Nobody".to_string(),
            email: "not-an-email".to_string(),
            service_id: "ai-solutions".to_string(),
            ..BookingRequest::default()
        })
        .await;
    assert!(invalid.is_err());
    assert_eq!(desk.list().await?.len(), 3);

    Ok(())
}
