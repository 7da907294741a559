use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    user_turns_total: AtomicU64,
    assistant_turns_total: AtomicU64,
    general_fallback_total: AtomicU64,
    action_clicks_total: AtomicU64,
    ignored_inputs_total: AtomicU64,
    bookings_total: AtomicU64,
    replies_observed_total: AtomicU64,
    total_reply_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub user_turns_total: u64,
    pub assistant_turns_total: u64,
    pub general_fallback_total: u64,
    pub action_clicks_total: u64,
    pub ignored_inputs_total: u64,
    pub bookings_total: u64,
    pub replies_observed_total: u64,
    pub avg_reply_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_user_turn(&self) {
        self.user_turns_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_assistant_turn(&self) {
        self.assistant_turns_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_general_fallback(&self) {
        self.general_fallback_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_action_click(&self) {
        self.action_clicks_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ignored_input(&self) {
        self.ignored_inputs_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_booking(&self) {
        self.bookings_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Time from a user turn being accepted to its delayed assistant turn being
    /// appended. Immediate assistant turns are counted but never observed here.
    pub fn observe_reply_latency(&self, duration: Duration) {
        self.replies_observed_total.fetch_add(1, Ordering::Relaxed);
        self.total_reply_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let replies = self.replies_observed_total.load(Ordering::Relaxed);
        let latency = self.total_reply_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            user_turns_total: self.user_turns_total.load(Ordering::Relaxed),
            assistant_turns_total: self.assistant_turns_total.load(Ordering::Relaxed),
            general_fallback_total: self.general_fallback_total.load(Ordering::Relaxed),
            action_clicks_total: self.action_clicks_total.load(Ordering::Relaxed),
            ignored_inputs_total: self.ignored_inputs_total.load(Ordering::Relaxed),
            bookings_total: self.bookings_total.load(Ordering::Relaxed),
            replies_observed_total: replies,
            avg_reply_latency_millis: if replies == 0 {
                0.0
            } else {
                latency as f64 / replies as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,leaddev_agents=info,leaddev_storage=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr)
            .init();
    });
}
