use std::sync::Arc;

use anyhow::{Context, Result};
use leaddev_core::responder::CONTACT_EMAIL;
use leaddev_core::BookingRequest;
use leaddev_observability::AppMetrics;
use leaddev_storage::{BookingRecord, BookingRepository};
use serde::Serialize;
use tracing::{info, instrument};

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub record: BookingRecord,
    pub message: String,
    pub notify: &'static str,
}

/// Validates consultation requests and hands them to the configured sink.
#[derive(Clone)]
pub struct BookingDesk<S>
where
    S: BookingRepository,
{
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
}

impl<S> BookingDesk<S>
where
    S: BookingRepository,
{
    pub fn new(store: Arc<S>, metrics: Arc<AppMetrics>) -> Self {
        Self { store, metrics }
    }

    #[instrument(skip(self, request), fields(service_id = %request.service_id))]
    pub async fn submit(&self, request: BookingRequest) -> Result<BookingConfirmation> {
        request.validate()?;

        let record = BookingRecord::new(request);
        self.store
            .save_booking(&record)
            .await
            .context("failed to store booking request")?;
        self.metrics.inc_booking();

        info!(booking_id = %record.id, notify = CONTACT_EMAIL, "booking request stored");

        let message = format!(
            "Thank you for your interest! Our team will review your request and get back to you within 24 hours at {}.",
            record.request.email.trim()
        );

        Ok(BookingConfirmation {
            record,
            message,
            notify: CONTACT_EMAIL,
        })
    }

    pub async fn list(&self) -> Result<Vec<BookingRecord>> {
        self.store.list_bookings().await
    }

    pub async fn for_service(&self, service_id: &str) -> Result<Vec<BookingRecord>> {
        self.store.bookings_for_service(service_id).await
    }
}
