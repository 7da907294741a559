use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use leaddev_core::responder::{
    customization_actions, customize_quote_prompt, select_service_prompt,
    service_detail_actions, SERVICES_PANEL_MESSAGE,
};
use leaddev_core::{
    compose_reply, generate_customization_response, generate_detailed_service_response,
    get_service_by_id, ActionOption, BookingRequest, ConversationState, Intent, UserAction,
};
use leaddev_observability::AppMetrics;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::ConversationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    /// State changed synchronously; nothing further will be appended.
    Applied,
    /// A user turn was appended and an assistant turn will follow after a delay.
    ReplyScheduled,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Admission {
    Accepted,
    Busy,
    Closed,
}

struct Session {
    state: Mutex<ConversationState>,
    alive: AtomicBool,
    updates: watch::Sender<ConversationState>,
    metrics: Arc<AppMetrics>,
}

impl Session {
    /// Runs `apply` against live state and publishes the result. Returns `None` once
    /// the session is closed so late callbacks never touch torn-down state.
    fn mutate<R>(&self, apply: impl FnOnce(&mut ConversationState) -> R) -> Option<R> {
        let mut state = self.state.lock();
        if !self.alive.load(Ordering::Acquire) {
            return None;
        }

        let result = apply(&mut state);
        self.updates.send_replace(state.clone());
        Some(result)
    }
}

/// Owns one conversation: the turn history, the panel flags and every delayed reply
/// still in flight. Delayed replies are spawned onto the ambient tokio runtime, so the
/// manager must be driven from inside one.
pub struct ConversationManager {
    session: Arc<Session>,
    config: ConversationConfig,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl ConversationManager {
    pub fn new(config: ConversationConfig, metrics: Arc<AppMetrics>) -> Self {
        let state = ConversationState::new();
        let (updates, _) = watch::channel(state.clone());

        info!(session_id = %state.session_id, "conversation started");

        Self {
            session: Arc::new(Session {
                state: Mutex::new(state),
                alive: AtomicBool::new(true),
                updates,
                metrics,
            }),
            config,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> ConversationState {
        self.session.state.lock().clone()
    }

    /// Receives a fresh snapshot after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.session.updates.subscribe()
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.session.metrics
    }

    pub fn is_closed(&self) -> bool {
        !self.session.alive.load(Ordering::Acquire)
    }

    /// Appends the user's turn and schedules the classified reply. Blank text and
    /// submissions made while a reply is pending are dropped.
    pub fn submit_text(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            self.ignore("blank submission");
            return false;
        }

        match self.admit_user_turn(text) {
            Admission::Accepted => {}
            Admission::Busy => {
                self.ignore("submission while awaiting response");
                return false;
            }
            Admission::Closed => {
                self.ignore("session closed");
                return false;
            }
        }
        self.session.metrics.inc_user_turn();

        let session = Arc::clone(&self.session);
        let delay = self.config.reply_delay;
        let text = text.to_string();
        let accepted_at = Instant::now();

        self.schedule(async move {
            sleep(delay).await;

            let reply = compose_reply(&text);
            let classification = reply.classification.clone();
            let appended = session.mutate(move |state| {
                state.push_assistant(reply.text, reply.actions);
                state.is_awaiting_response = false;
                state.session_id
            });

            if let Some(session_id) = appended {
                session.metrics.inc_assistant_turn();
                session.metrics.observe_reply_latency(accepted_at.elapsed());
                if classification.intent == Intent::General {
                    session.metrics.inc_general_fallback();
                }
                info!(
                    session_id = %session_id,
                    intent = classification.intent.as_code(),
                    confidence = classification.confidence,
                    services = ?classification.entities.matched_service_ids,
                    urgency = classification.entities.has_urgency,
                    budget = classification.entities.has_budget_mention,
                    "reply appended"
                );
            }
        });

        true
    }

    /// Entry point for button clicks coming from the rendering layer.
    pub fn click_action(&self, action: &str, payload: Option<&str>) -> ActionOutcome {
        match UserAction::from_parts(action, payload) {
            Ok(action) => self.dispatch(action),
            Err(err) => {
                debug!(error = %err, "action rejected");
                self.ignore("unparsable action");
                ActionOutcome::Ignored
            }
        }
    }

    pub fn click(&self, option: &ActionOption) -> ActionOutcome {
        self.click_action(option.action.as_code(), option.payload.as_deref())
    }

    pub fn dispatch(&self, action: UserAction) -> ActionOutcome {
        let name = action.name();
        let outcome = match action {
            UserAction::ShowServices => {
                let outcome = self.applied(|state| {
                    state.is_service_panel_visible = true;
                    state.push_assistant(SERVICES_PANEL_MESSAGE, Vec::new());
                });
                if outcome == ActionOutcome::Applied {
                    self.session.metrics.inc_assistant_turn();
                }
                outcome
            }
            UserAction::BookConsultation => self.applied(|state| {
                state.is_booking_modal_open = true;
            }),
            UserAction::SelectService(service_id) => match get_service_by_id(&service_id) {
                Some(service) => self.user_turn_then_reply(
                    |state| {
                        state.selected_service_id = Some(service.id.clone());
                        state.push_user(select_service_prompt(service));
                    },
                    generate_detailed_service_response(service),
                    service_detail_actions(&service.id),
                ),
                None => ActionOutcome::Ignored,
            },
            UserAction::CustomizeQuote(service_id) => match get_service_by_id(&service_id) {
                Some(service) => self.user_turn_then_reply(
                    |state| {
                        state.push_user(customize_quote_prompt(service));
                    },
                    generate_customization_response(service),
                    customization_actions(),
                ),
                None => ActionOutcome::Ignored,
            },
        };

        if outcome == ActionOutcome::Ignored {
            self.ignore("action not applied");
        } else {
            self.session.metrics.inc_action_click();
            debug!(action = name.as_code(), outcome = ?outcome, "action dispatched");
        }

        outcome
    }

    /// Closing the form leaves `selected_service_id` as it was, so reopening it
    /// resumes with the last service picked.
    pub fn close_booking_modal(&self) {
        self.session.mutate(|state| {
            state.is_booking_modal_open = false;
        });
    }

    /// Blank booking form pre-filled with the currently selected service.
    pub fn booking_draft(&self) -> BookingRequest {
        let state = self.session.state.lock();
        BookingRequest::for_service(state.selected_service_id.as_deref())
    }

    /// Waits until every scheduled reply has either landed or been cancelled.
    pub async fn flush(&self) {
        loop {
            let handles = std::mem::take(&mut *self.pending.lock());
            if handles.is_empty() {
                break;
            }
            for handle in handles {
                // aborted handles resolve to a cancellation error, which is expected here
                let _ = handle.await;
            }
        }
    }

    /// Tears the session down and cancels every pending reply.
    pub fn close(&self) {
        {
            let _state = self.session.state.lock();
            if !self.session.alive.swap(false, Ordering::AcqRel) {
                return;
            }
        }

        let handles = std::mem::take(&mut *self.pending.lock());
        let cancelled = handles.iter().filter(|handle| !handle.is_finished()).count();
        for handle in handles {
            handle.abort();
        }

        info!(cancelled_replies = cancelled, "conversation closed");
    }

    fn applied(&self, apply: impl FnOnce(&mut ConversationState)) -> ActionOutcome {
        match self.session.mutate(apply) {
            Some(()) => ActionOutcome::Applied,
            None => ActionOutcome::Ignored,
        }
    }

    fn user_turn_then_reply(
        &self,
        apply: impl FnOnce(&mut ConversationState),
        reply_text: String,
        reply_actions: Vec<ActionOption>,
    ) -> ActionOutcome {
        if self.session.mutate(apply).is_none() {
            return ActionOutcome::Ignored;
        }

        let session = Arc::clone(&self.session);
        let delay = self.config.detail_delay;
        let accepted_at = Instant::now();

        self.schedule(async move {
            sleep(delay).await;
            if session
                .mutate(move |state| {
                    state.push_assistant(reply_text, reply_actions);
                })
                .is_some()
            {
                session.metrics.inc_assistant_turn();
                session.metrics.observe_reply_latency(accepted_at.elapsed());
            }
        });

        ActionOutcome::ReplyScheduled
    }

    fn admit_user_turn(&self, text: &str) -> Admission {
        self.session
            .mutate(|state| {
                if state.is_awaiting_response {
                    return Admission::Busy;
                }
                state.push_user(text);
                state.is_awaiting_response = true;
                Admission::Accepted
            })
            .unwrap_or(Admission::Closed)
    }

    fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        let mut pending = self.pending.lock();
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }

    fn ignore(&self, reason: &'static str) {
        self.session.metrics.inc_ignored_input();
        debug!(reason, "input ignored");
    }
}

impl Drop for ConversationManager {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use leaddev_core::{ActionName, ConversationPhase, TurnRole};

    use super::*;

    fn manager() -> ConversationManager {
        ConversationManager::new(ConversationConfig::default(), AppMetrics::shared())
    }

    fn action_names(state: &ConversationState) -> Vec<ActionName> {
        state
            .last_turn()
            .map(|turn| turn.actions.iter().map(|action| action.action).collect())
            .unwrap_or_default()
    }

    #[tokio::test(start_paused = true)]
    async fn blank_text_is_ignored() {
        let manager = manager();
        assert!(!manager.submit_text(""));
        assert!(!manager.submit_text("   "));

        let state = manager.snapshot();
        assert_eq!(state.turns.len(), 1);
        assert_eq!(state.phase(), ConversationPhase::Idle);
        assert_eq!(manager.metrics().snapshot().ignored_inputs_total, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn offer_question_gets_service_actions_after_delay() {
        let manager = manager();
        assert!(manager.submit_text("What do you offer?"));

        let pending = manager.snapshot();
        assert_eq!(pending.turns.len(), 2);
        assert_eq!(pending.turns[1].role, TurnRole::User);
        assert_eq!(pending.phase(), ConversationPhase::AwaitingResponse);

        manager.flush().await;

        let state = manager.snapshot();
        assert_eq!(state.turns.len(), 3);
        assert_eq!(state.phase(), ConversationPhase::Idle);
        assert_eq!(
            action_names(&state),
            vec![ActionName::ShowServices, ActionName::BookConsultation]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn reply_waits_for_configured_delay() {
        let manager = manager();
        manager.submit_text("how much does it cost");

        sleep(Duration::from_millis(999)).await;
        assert_eq!(manager.snapshot().turns.len(), 2);

        sleep(Duration::from_millis(2)).await;
        assert_eq!(manager.snapshot().turns.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn submission_while_awaiting_is_dropped() {
        let manager = manager();
        assert!(manager.submit_text("book a meeting"));
        assert!(!manager.submit_text("hello again"));
        assert_eq!(manager.snapshot().turns.len(), 2);

        manager.flush().await;
        assert_eq!(manager.snapshot().turns.len(), 3);
        assert!(manager.submit_text("hello again"));
    }

    #[tokio::test(start_paused = true)]
    async fn select_service_appends_prompt_then_detail() {
        let manager = manager();
        let outcome = manager.click_action("select_service", Some("ai-solutions"));
        assert_eq!(outcome, ActionOutcome::ReplyScheduled);

        let state = manager.snapshot();
        assert_eq!(state.selected_service_id.as_deref(), Some("ai-solutions"));
        assert_eq!(
            state.turns[1].text,
            "Tell me more about AI & Machine Learning Solutions and provide a detailed quote"
        );

        manager.flush().await;
        let state = manager.snapshot();
        let reply = state.last_turn().unwrap();
        assert_eq!(reply.role, TurnRole::Assistant);
        assert!(reply.text.contains("AI & Machine Learning Solutions"));
        assert_eq!(
            action_names(&state),
            vec![ActionName::BookConsultation, ActionName::CustomizeQuote]
        );
        assert_eq!(reply.actions[1].payload.as_deref(), Some("ai-solutions"));
    }

    #[tokio::test(start_paused = true)]
    async fn customize_quote_uses_customization_template() {
        let manager = manager();
        manager.click_action("customize_quote", Some("cloud-infrastructure"));
        manager.flush().await;

        let state = manager.snapshot();
        assert_eq!(
            state.turns[1].text,
            "I'd like to customize the Cloud Infrastructure & DevOps package for my specific needs"
        );
        assert!(state.turns[2].text.contains("**Cloud Provider:**"));
        assert_eq!(action_names(&state), vec![ActionName::BookConsultation]);
        assert!(state.selected_service_id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_service_changes_nothing() {
        let manager = manager();
        let before = manager.snapshot();

        assert_eq!(
            manager.click_action("select_service", Some("not-a-real-id")),
            ActionOutcome::Ignored
        );
        assert_eq!(
            manager.click_action("customize_quote", Some("not-a-real-id")),
            ActionOutcome::Ignored
        );
        manager.flush().await;

        let after = manager.snapshot();
        assert_eq!(after.turns.len(), before.turns.len());
        assert_eq!(after.selected_service_id, before.selected_service_id);
        assert_eq!(after.is_booking_modal_open, before.is_booking_modal_open);
        assert_eq!(after.is_service_panel_visible, before.is_service_panel_visible);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_action_or_missing_payload_is_ignored() {
        let manager = manager();
        assert_eq!(manager.click_action("launch", None), ActionOutcome::Ignored);
        assert_eq!(
            manager.click_action("select_service", None),
            ActionOutcome::Ignored
        );
        assert_eq!(manager.snapshot().turns.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn show_services_and_booking_panels() {
        let manager = manager();

        assert_eq!(manager.click_action("show_services", None), ActionOutcome::Applied);
        let state = manager.snapshot();
        assert!(state.is_service_panel_visible);
        assert_eq!(state.last_turn().unwrap().text, SERVICES_PANEL_MESSAGE);

        assert_eq!(
            manager.click_action("book_consultation", None),
            ActionOutcome::Applied
        );
        let state = manager.snapshot();
        assert!(state.is_booking_modal_open);
        assert_eq!(state.turns.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn closing_booking_modal_keeps_selected_service() {
        let manager = manager();
        manager.click_action("select_service", Some("tech-consulting"));
        manager.click_action("book_consultation", None);
        assert_eq!(manager.booking_draft().service_id, "tech-consulting");

        manager.close_booking_modal();

        // known quirk: the selection survives closing the form
        let state = manager.snapshot();
        assert!(!state.is_booking_modal_open);
        assert_eq!(state.selected_service_id.as_deref(), Some("tech-consulting"));
    }

    #[tokio::test(start_paused = true)]
    async fn close_cancels_pending_replies() {
        let manager = manager();
        manager.submit_text("What do you offer?");
        manager.click_action("select_service", Some("web-development"));
        manager.close();

        sleep(Duration::from_secs(5)).await;
        manager.flush().await;

        let state = manager.snapshot();
        assert_eq!(state.turns.len(), 3);
        assert!(state
            .turns
            .iter()
            .skip(1)
            .all(|turn| turn.role == TurnRole::User));
        assert!(manager.is_closed());
        assert!(!manager.submit_text("anyone there?"));
        assert_eq!(
            manager.click_action("show_services", None),
            ActionOutcome::Ignored
        );
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_every_mutation() {
        let manager = manager();
        let mut updates = manager.subscribe();

        manager.submit_text("contact");
        updates.changed().await.unwrap();
        assert!(updates.borrow_and_update().is_awaiting_response);

        updates.changed().await.unwrap();
        let state = updates.borrow_and_update().clone();
        assert!(!state.is_awaiting_response);
        assert_eq!(state.turns.len(), 3);
        assert!(state.turns[2].text.contains("okekewallace@gmail.com"));
    }

    #[tokio::test(start_paused = true)]
    async fn latency_average_covers_free_text_and_button_replies() {
        let manager = manager();
        manager.submit_text("What do you offer?");
        manager.flush().await;
        manager.click_action("select_service", Some("ai-solutions"));
        manager.flush().await;
        manager.click_action("show_services", None);

        let snapshot = manager.metrics().snapshot();
        assert_eq!(snapshot.assistant_turns_total, 3);
        assert_eq!(snapshot.replies_observed_total, 2);
        assert_eq!(snapshot.avg_reply_latency_millis, 900.0);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_session_rejects_submission_as_closed() {
        let manager = manager();
        assert_eq!(manager.admit_user_turn("first"), Admission::Accepted);
        assert_eq!(manager.admit_user_turn("second"), Admission::Busy);

        manager.close();
        assert_eq!(manager.admit_user_turn("third"), Admission::Closed);
        assert!(!manager.submit_text("fourth"));
        assert_eq!(manager.snapshot().turns.len(), 2);
        assert_eq!(manager.metrics().snapshot().ignored_inputs_total, 1);
    }
}
