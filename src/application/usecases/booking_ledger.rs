use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::error::{EngineError, EngineResult};
use crate::application::usecases::invoice_manager::InvoiceManager;
use crate::domain::entities::{
    bookings::InsertBookingEntity, order_items::InsertOrderItemEntity,
};
use crate::domain::repositories::bookings::BookingRepository;
use crate::domain::repositories::event_bus::{BOOKING_EVENTS, DomainEvent, EventPublisher};
use crate::domain::value_objects::bookings::{
    AmountSnapshot, BookingCreateOutcome, BookingDto, CancelBookingOutcome, CreateBookingModel,
    CreatedBookingDto, OrderItemModel, OrderItemOutcome,
};
use crate::domain::value_objects::enums::booking_statuses::BookingStatus;
use crate::domain::value_objects::invoices::{InvoiceDto, InvoiceOwner};
use crate::domain::value_objects::time_ranges::is_valid_range;

/// Creates reservations under the no-overlap invariant and owns booking
/// status transitions.
pub struct BookingLedger {
    bookings: Arc<dyn BookingRepository>,
    invoice_manager: Arc<InvoiceManager>,
    events: Arc<dyn EventPublisher>,
    invoice_ttl: Duration,
}

impl BookingLedger {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        invoice_manager: Arc<InvoiceManager>,
        events: Arc<dyn EventPublisher>,
        invoice_ttl: Duration,
    ) -> Self {
        Self {
            bookings,
            invoice_manager,
            events,
            invoice_ttl,
        }
    }

    pub async fn create_booking(
        &self,
        model: CreateBookingModel,
    ) -> EngineResult<CreatedBookingDto> {
        if !is_valid_range(model.start_time, model.end_time) {
            return Err(EngineError::Validation(
                "start_time must be before end_time".to_string(),
            ));
        }
        if model
            .items
            .iter()
            .any(|item| item.quantity <= 0 || item.subtotal < 0)
        {
            return Err(EngineError::Validation(
                "order items require a positive quantity and a non-negative subtotal".to_string(),
            ));
        }

        let now = Utc::now();
        let booking_id = Uuid::new_v4();
        let total_price: i64 = model.items.iter().map(|item| item.subtotal).sum();

        let booking = InsertBookingEntity {
            id: booking_id,
            user_id: model.user_id,
            venue_id: model.venue_id,
            service_id: model.service_id,
            unit_id: model.unit_id,
            start_time: model.start_time,
            end_time: model.end_time,
            total_price,
            status: BookingStatus::Pending.to_string(),
            created_at: now,
            updated_at: now,
        };
        let items = model
            .items
            .iter()
            .map(|item| InsertOrderItemEntity {
                id: Uuid::new_v4(),
                booking_id,
                menu_id: item.menu_id,
                quantity: item.quantity,
                subtotal: item.subtotal,
            })
            .collect();
        let invoice = InvoiceManager::build_insert(
            InvoiceOwner::Booking(booking_id),
            total_price,
            self.invoice_ttl,
            now,
        );

        match self
            .bookings
            .create_with_invoice(booking, items, invoice)
            .await?
        {
            BookingCreateOutcome::SlotTaken => {
                info!(
                    service_id = %model.service_id,
                    unit_id = ?model.unit_id,
                    start_time = %model.start_time,
                    end_time = %model.end_time,
                    "bookings: slot already taken"
                );
                Err(EngineError::slot_taken())
            }
            BookingCreateOutcome::Created {
                booking, invoice, ..
            } => {
                info!(
                    booking_id = %booking.id,
                    invoice_id = %invoice.id,
                    total_price = booking.total_price,
                    "bookings: created"
                );

                // Post-commit work only; the transaction is already closed.
                self.invoice_manager.arm_expiry(&invoice).await;
                self.publish(DomainEvent::new(
                    "booking-created",
                    json!({ "booking_id": booking.id, "invoice_id": invoice.id }),
                ))
                .await;

                Ok(CreatedBookingDto {
                    booking: BookingDto::from_entity(&booking),
                    invoice: InvoiceDto::from_entity(&invoice),
                })
            }
        }
    }

    /// pending -> paid; a booking that is already paid is a no-op, not an
    /// error (callback replays land here).
    pub async fn mark_paid(&self, booking_id: Uuid) -> EngineResult<()> {
        let applied = self
            .bookings
            .transition(booking_id, vec![BookingStatus::Pending], BookingStatus::Paid)
            .await?;
        if applied {
            info!(booking_id = %booking_id, "bookings: marked paid");
            return Ok(());
        }

        match self.current_status(booking_id).await? {
            BookingStatus::Paid => Ok(()),
            status => Err(EngineError::Conflict(format!(
                "booking {booking_id} is {status}, cannot mark paid"
            ))),
        }
    }

    /// Synchronous charge path: the provider already confirmed the payment,
    /// settle the invoice and flip the booking in one call.
    pub async fn record_payment(&self, booking_id: Uuid) -> EngineResult<InvoiceDto> {
        let invoice = self.invoice_manager.get_by_booking(booking_id).await?;
        self.invoice_manager.mark_paid(invoice.id).await?;
        self.mark_paid(booking_id).await?;

        self.publish(DomainEvent::new(
            "booking-paid",
            json!({ "booking_id": booking_id, "invoice_id": invoice.id }),
        ))
        .await;

        let invoice = self.invoice_manager.get(invoice.id).await?;
        Ok(InvoiceDto::from_entity(&invoice))
    }

    pub async fn cancel(&self, booking_id: Uuid) -> EngineResult<()> {
        match self.bookings.cancel_with_invoice(booking_id).await? {
            CancelBookingOutcome::Cancelled { invoice_id } => {
                info!(booking_id = %booking_id, invoice_id = ?invoice_id, "bookings: cancelled");
                if let Some(invoice_id) = invoice_id {
                    self.invoice_manager.disarm_expiry(invoice_id).await;
                }
                self.publish(DomainEvent::new(
                    "booking-cancelled",
                    json!({ "booking_id": booking_id }),
                ))
                .await;
                Ok(())
            }
            CancelBookingOutcome::AlreadyCancelled => Ok(()),
            CancelBookingOutcome::NotCancellable(status) => Err(EngineError::Conflict(format!(
                "booking {booking_id} is {status}, cannot cancel"
            ))),
            CancelBookingOutcome::NotFound => {
                Err(EngineError::NotFound(format!("booking {booking_id}")))
            }
        }
    }

    /// paid -> completed, only once the reservation window has ended.
    pub async fn complete(&self, booking_id: Uuid) -> EngineResult<()> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("booking {booking_id}")))?;

        match BookingStatus::from_str(&booking.status) {
            Some(BookingStatus::Completed) => return Ok(()),
            Some(BookingStatus::Paid) => {}
            _ => {
                return Err(EngineError::Conflict(format!(
                    "booking {booking_id} is {}, cannot complete",
                    booking.status
                )));
            }
        }
        if Utc::now() < booking.end_time {
            return Err(EngineError::Conflict(format!(
                "booking {booking_id} has not ended yet"
            )));
        }

        let applied = self
            .bookings
            .transition(
                booking_id,
                vec![BookingStatus::Paid],
                BookingStatus::Completed,
            )
            .await?;
        if applied {
            info!(booking_id = %booking_id, "bookings: completed");
        }
        Ok(())
    }

    /// Background pass: every paid booking past its end time becomes
    /// completed.
    pub async fn complete_elapsed(&self) -> EngineResult<Vec<Uuid>> {
        let completed = self.bookings.complete_elapsed(Utc::now()).await?;
        if !completed.is_empty() {
            info!(count = completed.len(), "bookings: completed elapsed bookings");
        }
        Ok(completed)
    }

    pub async fn add_order_item(
        &self,
        booking_id: Uuid,
        item: OrderItemModel,
    ) -> EngineResult<AmountSnapshot> {
        if item.quantity <= 0 || item.subtotal < 0 {
            return Err(EngineError::Validation(
                "order items require a positive quantity and a non-negative subtotal".to_string(),
            ));
        }

        let insert = InsertOrderItemEntity {
            id: Uuid::new_v4(),
            booking_id,
            menu_id: item.menu_id,
            quantity: item.quantity,
            subtotal: item.subtotal,
        };
        let outcome = self.bookings.add_order_item(booking_id, insert).await?;
        self.amounts_from(outcome, booking_id)
    }

    pub async fn update_order_item(
        &self,
        item_id: Uuid,
        quantity: i32,
        subtotal: i64,
    ) -> EngineResult<AmountSnapshot> {
        if quantity <= 0 || subtotal < 0 {
            return Err(EngineError::Validation(
                "order items require a positive quantity and a non-negative subtotal".to_string(),
            ));
        }

        let outcome = self
            .bookings
            .update_order_item(item_id, quantity, subtotal)
            .await?;
        self.amounts_from(outcome, item_id)
    }

    pub async fn remove_order_item(&self, item_id: Uuid) -> EngineResult<AmountSnapshot> {
        let outcome = self.bookings.remove_order_item(item_id).await?;
        self.amounts_from(outcome, item_id)
    }

    pub async fn recalculate_total(&self, booking_id: Uuid) -> EngineResult<AmountSnapshot> {
        let outcome = self.bookings.recalculate_total(booking_id).await?;
        self.amounts_from(outcome, booking_id)
    }

    pub async fn get_invoice(&self, booking_id: Uuid) -> EngineResult<InvoiceDto> {
        let invoice = self.invoice_manager.get_by_booking(booking_id).await?;
        Ok(InvoiceDto::from_entity(&invoice))
    }

    fn amounts_from(&self, outcome: OrderItemOutcome, subject: Uuid) -> EngineResult<AmountSnapshot> {
        match outcome {
            OrderItemOutcome::Applied(snapshot) => Ok(snapshot),
            OrderItemOutcome::InvoiceNotAdjustable => Err(EngineError::Conflict(
                "invoice is no longer pending, amounts are frozen".to_string(),
            )),
            OrderItemOutcome::NotFound => Err(EngineError::NotFound(format!("{subject}"))),
        }
    }

    async fn current_status(&self, booking_id: Uuid) -> EngineResult<BookingStatus> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("booking {booking_id}")))?;
        BookingStatus::from_str(&booking.status).ok_or_else(|| {
            EngineError::Internal(anyhow::anyhow!(
                "booking {booking_id} carries unknown status {}",
                booking.status
            ))
        })
    }

    async fn publish(&self, event: DomainEvent) {
        if let Err(err) = self.events.publish(BOOKING_EVENTS, event).await {
            warn!(error = ?err, "bookings: failed to publish event");
        }
    }
}
