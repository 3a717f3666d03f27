//! Shared in-memory fakes for usecase tests: a single store standing in for
//! the three repositories, plus recording doubles for the scheduler, event
//! bus, and gateway.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::application::usecases::booking_ledger::BookingLedger;
use crate::application::usecases::expiry_sweeper::ExpirySweeper;
use crate::application::usecases::gateway_reconciler::GatewayReconciler;
use crate::application::usecases::invoice_manager::InvoiceManager;
use crate::application::usecases::transaction_ledger::TransactionLedger;
use crate::domain::entities::{
    bookings::{BookingEntity, InsertBookingEntity},
    invoices::{InsertInvoiceEntity, InvoiceEntity},
    order_items::{InsertOrderItemEntity, OrderItemEntity},
    transactions::{InsertTransactionEntity, TransactionEntity},
};
use crate::domain::repositories::bookings::BookingRepository;
use crate::domain::repositories::event_bus::{DomainEvent, EventPublisher};
use crate::domain::repositories::gateway::PaymentGatewayClient;
use crate::domain::repositories::invoices::InvoiceRepository;
use crate::domain::repositories::scheduler::ExpiryScheduler;
use crate::domain::repositories::transactions::TransactionRepository;
use crate::domain::value_objects::bookings::{
    AmountSnapshot, BookingCreateOutcome, CancelBookingOutcome, OrderItemOutcome,
};
use crate::domain::value_objects::enums::{
    booking_statuses::BookingStatus, invoice_statuses::InvoiceStatus,
    transaction_statuses::TransactionStatus, transaction_types::TransactionType,
};
use crate::domain::value_objects::gateway_callback::{GatewayCallbackPayload, expected_signature};
use crate::domain::value_objects::invoices::InvoiceExpireOutcome;
use crate::domain::value_objects::time_ranges::intervals_overlap;
use crate::domain::value_objects::transactions::GatewayCharge;

pub const TEST_SERVER_KEY: &str = "test-server-key";
pub const TEST_TTL_MINUTES: i64 = 15;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap()
}

/// One shared store backing all three repository ports, mirroring the
/// conditional-update semantics of the real database.
#[derive(Default)]
pub struct InMemoryEngine {
    bookings: Mutex<HashMap<Uuid, BookingEntity>>,
    order_items: Mutex<HashMap<Uuid, OrderItemEntity>>,
    invoices: Mutex<HashMap<Uuid, InvoiceEntity>>,
    transactions: Mutex<HashMap<Uuid, TransactionEntity>>,
}

impl InMemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn booking(&self, id: Uuid) -> Option<BookingEntity> {
        lock(&self.bookings).get(&id).cloned()
    }

    pub fn invoice(&self, id: Uuid) -> Option<InvoiceEntity> {
        lock(&self.invoices).get(&id).cloned()
    }

    pub fn transaction(&self, id: Uuid) -> Option<TransactionEntity> {
        lock(&self.transactions).get(&id).cloned()
    }

    pub fn booking_status(&self, id: Uuid) -> Option<String> {
        self.booking(id).map(|booking| booking.status)
    }

    pub fn invoice_status(&self, id: Uuid) -> Option<String> {
        self.invoice(id).map(|invoice| invoice.status)
    }

    pub fn transaction_status(&self, id: Uuid) -> Option<String> {
        self.transaction(id).map(|transaction| transaction.status)
    }

    /// Backdates a pending invoice's deadline so expiry paths see it as due.
    pub fn force_invoice_deadline(&self, id: Uuid, expired_at: DateTime<Utc>) {
        if let Some(invoice) = lock(&self.invoices).get_mut(&id) {
            invoice.expired_at = Some(expired_at);
        }
    }

    pub fn force_transaction_deadline(&self, id: Uuid, expired_at: DateTime<Utc>) {
        if let Some(transaction) = lock(&self.transactions).get_mut(&id) {
            transaction.expired_at = Some(expired_at);
        }
    }

    pub fn force_booking_end_time(&self, id: Uuid, end_time: DateTime<Utc>) {
        if let Some(booking) = lock(&self.bookings).get_mut(&id) {
            booking.end_time = end_time;
        }
    }

    fn apply_totals(&self, booking_id: Uuid, invoice_id: Uuid) -> AmountSnapshot {
        let total: i64 = lock(&self.order_items)
            .values()
            .filter(|item| item.booking_id == booking_id)
            .map(|item| item.subtotal)
            .sum();
        if let Some(booking) = lock(&self.bookings).get_mut(&booking_id) {
            booking.total_price = total;
            booking.updated_at = Utc::now();
        }
        if let Some(invoice) = lock(&self.invoices).get_mut(&invoice_id) {
            invoice.amount = total;
        }
        AmountSnapshot {
            booking_id,
            total_price: total,
            invoice_amount: total,
        }
    }

    fn pending_invoice_for(&self, booking_id: Uuid) -> Option<Result<Uuid, ()>> {
        lock(&self.invoices)
            .values()
            .find(|invoice| invoice.booking_id == Some(booking_id))
            .map(|invoice| {
                if invoice.status == InvoiceStatus::Pending.as_str() {
                    Ok(invoice.id)
                } else {
                    Err(())
                }
            })
    }
}

fn booking_from_insert(insert: InsertBookingEntity) -> BookingEntity {
    BookingEntity {
        id: insert.id,
        user_id: insert.user_id,
        venue_id: insert.venue_id,
        service_id: insert.service_id,
        unit_id: insert.unit_id,
        start_time: insert.start_time,
        end_time: insert.end_time,
        total_price: insert.total_price,
        status: insert.status,
        created_at: insert.created_at,
        updated_at: insert.updated_at,
    }
}

fn invoice_from_insert(insert: InsertInvoiceEntity) -> InvoiceEntity {
    InvoiceEntity {
        id: insert.id,
        booking_id: insert.booking_id,
        event_order_id: insert.event_order_id,
        invoice_number: insert.invoice_number,
        amount: insert.amount,
        status: insert.status,
        issued_at: insert.issued_at,
        paid_at: None,
        cancelled_at: None,
        expired_at: insert.expired_at,
    }
}

fn item_from_insert(insert: InsertOrderItemEntity) -> OrderItemEntity {
    OrderItemEntity {
        id: insert.id,
        booking_id: insert.booking_id,
        menu_id: insert.menu_id,
        quantity: insert.quantity,
        subtotal: insert.subtotal,
    }
}

fn transaction_from_insert(insert: InsertTransactionEntity) -> TransactionEntity {
    TransactionEntity {
        id: insert.id,
        user_id: insert.user_id,
        amount: insert.amount,
        type_: insert.type_,
        status: insert.status,
        order_id: insert.order_id,
        va_number: insert.va_number,
        qris_url: insert.qris_url,
        payment_code: insert.payment_code,
        expired_at: insert.expired_at,
        created_at: insert.created_at,
        updated_at: insert.updated_at,
    }
}

#[async_trait]
impl BookingRepository for InMemoryEngine {
    async fn create_with_invoice(
        &self,
        booking: InsertBookingEntity,
        items: Vec<InsertOrderItemEntity>,
        invoice: InsertInvoiceEntity,
    ) -> Result<BookingCreateOutcome> {
        let mut bookings = lock(&self.bookings);

        let active: Vec<&str> = BookingStatus::active().to_vec();
        let conflict = bookings.values().any(|existing| {
            existing.service_id == booking.service_id
                && existing.unit_id == booking.unit_id
                && active.contains(&existing.status.as_str())
                && intervals_overlap(
                    existing.start_time,
                    existing.end_time,
                    booking.start_time,
                    booking.end_time,
                )
        });
        if conflict {
            return Ok(BookingCreateOutcome::SlotTaken);
        }

        let booking = booking_from_insert(booking);
        bookings.insert(booking.id, booking.clone());

        let mut created_items = Vec::with_capacity(items.len());
        {
            let mut order_items = lock(&self.order_items);
            for item in items {
                let item = item_from_insert(item);
                order_items.insert(item.id, item.clone());
                created_items.push(item);
            }
        }

        let invoice = invoice_from_insert(invoice);
        lock(&self.invoices).insert(invoice.id, invoice.clone());

        Ok(BookingCreateOutcome::Created {
            booking,
            items: created_items,
            invoice,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<BookingEntity>> {
        Ok(self.booking(id))
    }

    async fn transition(
        &self,
        id: Uuid,
        from: Vec<BookingStatus>,
        to: BookingStatus,
    ) -> Result<bool> {
        let mut bookings = lock(&self.bookings);
        let Some(booking) = bookings.get_mut(&id) else {
            return Ok(false);
        };
        let matches_from = from.iter().any(|status| status.as_str() == booking.status);
        if !matches_from {
            return Ok(false);
        }
        booking.status = to.as_str().to_string();
        booking.updated_at = Utc::now();
        Ok(true)
    }

    async fn cancel_with_invoice(&self, id: Uuid) -> Result<CancelBookingOutcome> {
        let now = Utc::now();
        let mut bookings = lock(&self.bookings);
        let Some(booking) = bookings.get_mut(&id) else {
            return Ok(CancelBookingOutcome::NotFound);
        };

        match BookingStatus::from_str(&booking.status) {
            Some(BookingStatus::Cancelled) => Ok(CancelBookingOutcome::AlreadyCancelled),
            Some(BookingStatus::Pending) | Some(BookingStatus::Paid) => {
                booking.status = BookingStatus::Cancelled.as_str().to_string();
                booking.updated_at = now;

                let mut invoice_id = None;
                for invoice in lock(&self.invoices).values_mut() {
                    if invoice.booking_id == Some(id)
                        && invoice.status == InvoiceStatus::Pending.as_str()
                    {
                        invoice.status = InvoiceStatus::Cancelled.as_str().to_string();
                        invoice.cancelled_at = Some(now);
                        invoice_id = Some(invoice.id);
                    }
                }
                Ok(CancelBookingOutcome::Cancelled { invoice_id })
            }
            _ => Ok(CancelBookingOutcome::NotCancellable(booking.status.clone())),
        }
    }

    async fn complete_elapsed(&self, now: DateTime<Utc>) -> Result<Vec<Uuid>> {
        let mut completed = Vec::new();
        for booking in lock(&self.bookings).values_mut() {
            if booking.status == BookingStatus::Paid.as_str() && booking.end_time <= now {
                booking.status = BookingStatus::Completed.as_str().to_string();
                booking.updated_at = now;
                completed.push(booking.id);
            }
        }
        Ok(completed)
    }

    async fn add_order_item(
        &self,
        booking_id: Uuid,
        item: InsertOrderItemEntity,
    ) -> Result<OrderItemOutcome> {
        match self.pending_invoice_for(booking_id) {
            None => Ok(OrderItemOutcome::NotFound),
            Some(Err(())) => Ok(OrderItemOutcome::InvoiceNotAdjustable),
            Some(Ok(invoice_id)) => {
                let item = item_from_insert(item);
                lock(&self.order_items).insert(item.id, item);
                Ok(OrderItemOutcome::Applied(
                    self.apply_totals(booking_id, invoice_id),
                ))
            }
        }
    }

    async fn update_order_item(
        &self,
        item_id: Uuid,
        quantity: i32,
        subtotal: i64,
    ) -> Result<OrderItemOutcome> {
        let booking_id = match lock(&self.order_items).get(&item_id) {
            Some(item) => item.booking_id,
            None => return Ok(OrderItemOutcome::NotFound),
        };
        match self.pending_invoice_for(booking_id) {
            None => Ok(OrderItemOutcome::NotFound),
            Some(Err(())) => Ok(OrderItemOutcome::InvoiceNotAdjustable),
            Some(Ok(invoice_id)) => {
                if let Some(item) = lock(&self.order_items).get_mut(&item_id) {
                    item.quantity = quantity;
                    item.subtotal = subtotal;
                }
                Ok(OrderItemOutcome::Applied(
                    self.apply_totals(booking_id, invoice_id),
                ))
            }
        }
    }

    async fn remove_order_item(&self, item_id: Uuid) -> Result<OrderItemOutcome> {
        let booking_id = match lock(&self.order_items).get(&item_id) {
            Some(item) => item.booking_id,
            None => return Ok(OrderItemOutcome::NotFound),
        };
        match self.pending_invoice_for(booking_id) {
            None => Ok(OrderItemOutcome::NotFound),
            Some(Err(())) => Ok(OrderItemOutcome::InvoiceNotAdjustable),
            Some(Ok(invoice_id)) => {
                lock(&self.order_items).remove(&item_id);
                Ok(OrderItemOutcome::Applied(
                    self.apply_totals(booking_id, invoice_id),
                ))
            }
        }
    }

    async fn recalculate_total(&self, booking_id: Uuid) -> Result<OrderItemOutcome> {
        match self.pending_invoice_for(booking_id) {
            None => Ok(OrderItemOutcome::NotFound),
            Some(Err(())) => Ok(OrderItemOutcome::InvoiceNotAdjustable),
            Some(Ok(invoice_id)) => Ok(OrderItemOutcome::Applied(
                self.apply_totals(booking_id, invoice_id),
            )),
        }
    }
}

#[async_trait]
impl InvoiceRepository for InMemoryEngine {
    async fn insert(&self, invoice: InsertInvoiceEntity) -> Result<InvoiceEntity> {
        let invoice = invoice_from_insert(invoice);
        lock(&self.invoices).insert(invoice.id, invoice.clone());
        Ok(invoice)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<InvoiceEntity>> {
        Ok(self.invoice(id))
    }

    async fn find_by_booking_id(&self, booking_id: Uuid) -> Result<Option<InvoiceEntity>> {
        Ok(lock(&self.invoices)
            .values()
            .find(|invoice| invoice.booking_id == Some(booking_id))
            .cloned())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<InvoiceEntity>> {
        Ok(lock(&self.invoices)
            .values()
            .find(|invoice| invoice.invoice_number == order_id)
            .cloned())
    }

    async fn mark_paid(&self, id: Uuid, paid_at: DateTime<Utc>) -> Result<bool> {
        let mut invoices = lock(&self.invoices);
        match invoices.get_mut(&id) {
            Some(invoice) if invoice.status == InvoiceStatus::Pending.as_str() => {
                invoice.status = InvoiceStatus::Paid.as_str().to_string();
                invoice.paid_at = Some(paid_at);
                invoice.expired_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_cancelled(&self, id: Uuid, cancelled_at: DateTime<Utc>) -> Result<bool> {
        let mut invoices = lock(&self.invoices);
        match invoices.get_mut(&id) {
            Some(invoice) if invoice.status == InvoiceStatus::Pending.as_str() => {
                invoice.status = InvoiceStatus::Cancelled.as_str().to_string();
                invoice.cancelled_at = Some(cancelled_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn expire_due_with_booking_release(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<InvoiceExpireOutcome> {
        let booking_id = {
            let mut invoices = lock(&self.invoices);
            match invoices.get_mut(&id) {
                Some(invoice)
                    if invoice.status == InvoiceStatus::Pending.as_str()
                        && invoice.expired_at.is_some_and(|deadline| deadline <= now) =>
                {
                    invoice.status = InvoiceStatus::Expired.as_str().to_string();
                    invoice.booking_id
                }
                _ => return Ok(InvoiceExpireOutcome::Skipped),
            }
        };

        let released_booking_id = match booking_id {
            Some(booking_id) => {
                let mut bookings = lock(&self.bookings);
                match bookings.get_mut(&booking_id) {
                    Some(booking)
                        if BookingStatus::active().contains(&booking.status.as_str()) =>
                    {
                        booking.status = BookingStatus::Cancelled.as_str().to_string();
                        booking.updated_at = now;
                        Some(booking_id)
                    }
                    _ => None,
                }
            }
            None => None,
        };

        Ok(InvoiceExpireOutcome::Expired {
            released_booking_id,
        })
    }

    async fn adjust_amount(&self, id: Uuid, delta: i64) -> Result<bool> {
        let mut invoices = lock(&self.invoices);
        match invoices.get_mut(&id) {
            Some(invoice) if invoice.status == InvoiceStatus::Pending.as_str() => {
                invoice.amount += delta;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_due_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<InvoiceEntity>> {
        let mut due: Vec<InvoiceEntity> = lock(&self.invoices)
            .values()
            .filter(|invoice| {
                invoice.status == InvoiceStatus::Pending.as_str()
                    && invoice.expired_at.is_some_and(|deadline| deadline <= now)
            })
            .cloned()
            .collect();
        due.sort_by_key(|invoice| invoice.expired_at);
        due.truncate(limit as usize);
        Ok(due)
    }
}

#[async_trait]
impl TransactionRepository for InMemoryEngine {
    async fn insert(&self, transaction: InsertTransactionEntity) -> Result<TransactionEntity> {
        let transaction = transaction_from_insert(transaction);
        lock(&self.transactions).insert(transaction.id, transaction.clone());
        Ok(transaction)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<TransactionEntity>> {
        Ok(self.transaction(id))
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<TransactionEntity>> {
        Ok(lock(&self.transactions)
            .values()
            .find(|transaction| transaction.order_id == order_id)
            .cloned())
    }

    async fn has_pending_topup(&self, user_id: Uuid) -> Result<bool> {
        Ok(lock(&self.transactions).values().any(|transaction| {
            transaction.user_id == user_id
                && transaction.type_ == TransactionType::Topup.as_str()
                && transaction.status == TransactionStatus::Pending.as_str()
        }))
    }

    async fn mark_success(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut transactions = lock(&self.transactions);
        match transactions.get_mut(&id) {
            Some(transaction) if transaction.status == TransactionStatus::Pending.as_str() => {
                transaction.status = TransactionStatus::Success.as_str().to_string();
                transaction.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_cancelled(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut transactions = lock(&self.transactions);
        match transactions.get_mut(&id) {
            Some(transaction) if transaction.status == TransactionStatus::Pending.as_str() => {
                transaction.status = TransactionStatus::Cancelled.as_str().to_string();
                transaction.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn expire_due(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let mut transactions = lock(&self.transactions);
        match transactions.get_mut(&id) {
            Some(transaction)
                if transaction.status == TransactionStatus::Pending.as_str()
                    && transaction
                        .expired_at
                        .is_some_and(|deadline| deadline <= now) =>
            {
                transaction.status = TransactionStatus::Expired.as_str().to_string();
                transaction.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_due_pending(
        &self,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<TransactionEntity>> {
        let mut due: Vec<TransactionEntity> = lock(&self.transactions)
            .values()
            .filter(|transaction| {
                transaction.status == TransactionStatus::Pending.as_str()
                    && transaction
                        .expired_at
                        .is_some_and(|deadline| deadline <= now)
            })
            .cloned()
            .collect();
        due.sort_by_key(|transaction| transaction.expired_at);
        due.truncate(limit as usize);
        Ok(due)
    }
}

/// Records schedule/cancel calls without any timers.
#[derive(Default)]
pub struct RecordingScheduler {
    scheduled: Mutex<Vec<(String, DateTime<Utc>)>>,
    cancelled: Mutex<Vec<String>>,
}

impl RecordingScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled_keys(&self) -> Vec<String> {
        lock(&self.scheduled)
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn cancelled_keys(&self) -> Vec<String> {
        lock(&self.cancelled).clone()
    }
}

#[async_trait]
impl ExpiryScheduler for RecordingScheduler {
    async fn schedule(
        &self,
        key: String,
        fire_at: DateTime<Utc>,
        _payload: serde_json::Value,
    ) -> Result<()> {
        lock(&self.scheduled).push((key, fire_at));
        Ok(())
    }

    async fn cancel(&self, key: &str) -> Result<()> {
        lock(&self.cancelled).push(key.to_string());
        Ok(())
    }
}

/// Collects published events for assertions.
#[derive(Default)]
pub struct CollectingEvents {
    published: Mutex<Vec<(String, DomainEvent)>>,
}

impl CollectingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_names(&self) -> Vec<String> {
        lock(&self.published)
            .iter()
            .map(|(_, event)| event.event.clone())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for CollectingEvents {
    async fn publish(&self, channel: &str, event: DomainEvent) -> Result<()> {
        lock(&self.published).push((channel.to_string(), event));
        Ok(())
    }
}

/// Gateway double; hands back fixed payment artifacts or fails every charge.
pub struct StubGateway {
    fail: bool,
}

impl StubGateway {
    pub fn ok() -> Self {
        Self { fail: false }
    }

    pub fn failing() -> Self {
        Self { fail: true }
    }
}

#[async_trait]
impl PaymentGatewayClient for StubGateway {
    async fn create_charge(
        &self,
        order_id: &str,
        _user_id: Uuid,
        _amount: i64,
    ) -> Result<GatewayCharge> {
        if self.fail {
            anyhow::bail!("gateway unavailable for {order_id}");
        }
        Ok(GatewayCharge {
            va_number: Some("9881234567890".to_string()),
            qris_url: None,
            payment_code: None,
        })
    }
}

/// Everything wired together over the in-memory store.
pub struct TestHarness {
    pub store: Arc<InMemoryEngine>,
    pub scheduler: Arc<RecordingScheduler>,
    pub events: Arc<CollectingEvents>,
    pub invoice_manager: Arc<InvoiceManager>,
    pub booking_ledger: Arc<BookingLedger>,
    pub transaction_ledger: Arc<TransactionLedger>,
    pub reconciler: Arc<GatewayReconciler>,
    pub sweeper: Arc<ExpirySweeper>,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_gateway(StubGateway::ok())
    }

    pub fn with_gateway(gateway: StubGateway) -> Self {
        let store = Arc::new(InMemoryEngine::new());
        let scheduler = Arc::new(RecordingScheduler::new());
        let events = Arc::new(CollectingEvents::new());
        let ttl = Duration::minutes(TEST_TTL_MINUTES);

        let invoice_manager = Arc::new(InvoiceManager::new(
            store.clone() as Arc<dyn InvoiceRepository>,
            scheduler.clone() as Arc<dyn ExpiryScheduler>,
            events.clone() as Arc<dyn EventPublisher>,
        ));
        let booking_ledger = Arc::new(BookingLedger::new(
            store.clone() as Arc<dyn BookingRepository>,
            Arc::clone(&invoice_manager),
            events.clone() as Arc<dyn EventPublisher>,
            ttl,
        ));
        let transaction_ledger = Arc::new(TransactionLedger::new(
            store.clone() as Arc<dyn TransactionRepository>,
            Arc::new(gateway) as Arc<dyn PaymentGatewayClient>,
            scheduler.clone() as Arc<dyn ExpiryScheduler>,
            events.clone() as Arc<dyn EventPublisher>,
            ttl,
        ));
        let reconciler = Arc::new(GatewayReconciler::new(
            store.clone() as Arc<dyn InvoiceRepository>,
            store.clone() as Arc<dyn TransactionRepository>,
            Arc::clone(&invoice_manager),
            Arc::clone(&transaction_ledger),
            Arc::clone(&booking_ledger),
            events.clone() as Arc<dyn EventPublisher>,
            TEST_SERVER_KEY.to_string(),
        ));
        let sweeper = Arc::new(ExpirySweeper::new(
            store.clone() as Arc<dyn InvoiceRepository>,
            store.clone() as Arc<dyn TransactionRepository>,
            Arc::clone(&invoice_manager),
            Arc::clone(&transaction_ledger),
            Arc::clone(&booking_ledger),
        ));

        Self {
            store,
            scheduler,
            events,
            invoice_manager,
            booking_ledger,
            transaction_ledger,
            reconciler,
            sweeper,
        }
    }

    /// A well-signed settlement callback for the given order.
    pub fn settlement_callback(&self, order_id: &str, gross_amount: &str) -> GatewayCallbackPayload {
        self.callback(order_id, gross_amount, "settlement")
    }

    pub fn callback(
        &self,
        order_id: &str,
        gross_amount: &str,
        transaction_status: &str,
    ) -> GatewayCallbackPayload {
        let status_code = "200";
        GatewayCallbackPayload {
            order_id: order_id.to_string(),
            status_code: status_code.to_string(),
            gross_amount: gross_amount.to_string(),
            signature_key: expected_signature(order_id, status_code, gross_amount, TEST_SERVER_KEY),
            transaction_status: transaction_status.to_string(),
            va_numbers: vec![],
        }
    }
}
