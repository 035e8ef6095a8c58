//! Inventory service — vaccine catalog maintenance and batch lifecycle.
//!
//! All stock mutations delegate to the ledger, which pairs every batch
//! write with the vaccine aggregate write in one transaction. This
//! service adds authorization, input validation, and event emission
//! on top.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use vaxtrack_core::error::AppError;
use vaxtrack_core::events::{
    DomainEvent, EventChannel, EventPayload, EventPriority, InventoryEvent,
};
use vaxtrack_core::result::AppResult;
use vaxtrack_core::traits::EventSink;
use vaxtrack_core::types::pagination::{PageRequest, PageResponse};
use vaxtrack_database::store::{BatchStore, InventoryLedger, VaccineStore};
use vaxtrack_entity::batch::{BatchStatus, CreateBatch, VaccineBatch};
use vaxtrack_entity::vaccine::{CreateVaccine, UpdateVaccine, Vaccine};

use crate::context::RequestContext;

/// Manages the vaccine catalog and batch inventory.
#[derive(Clone)]
pub struct InventoryService {
    vaccines: Arc<dyn VaccineStore>,
    batches: Arc<dyn BatchStore>,
    ledger: Arc<dyn InventoryLedger>,
    events: Arc<dyn EventSink>,
}

impl InventoryService {
    /// Creates a new inventory service.
    pub fn new(
        vaccines: Arc<dyn VaccineStore>,
        batches: Arc<dyn BatchStore>,
        ledger: Arc<dyn InventoryLedger>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            vaccines,
            batches,
            ledger,
            events,
        }
    }

    /// Creates a new vaccine with zero stock.
    pub async fn create_vaccine(
        &self,
        ctx: &RequestContext,
        data: CreateVaccine,
    ) -> AppResult<Vaccine> {
        self.require_manager(ctx)?;
        validate_vaccine_policy(data.doses_required, data.interval_days, data.min_stock_level)?;

        if data.name.trim().is_empty() || data.manufacturer.trim().is_empty() {
            return Err(AppError::validation(
                "Vaccine name and manufacturer are required",
            ));
        }

        let now = Utc::now();
        let vaccine = Vaccine {
            id: Uuid::new_v4(),
            name: data.name,
            manufacturer: data.manufacturer,
            doses_required: data.doses_required,
            interval_days: data.interval_days,
            is_obligatory: data.is_obligatory,
            min_stock_level: data.min_stock_level,
            total_stock: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created = self.vaccines.create(&vaccine).await?;
        info!(vaccine_id = %created.id, name = %created.name, "Vaccine created");
        Ok(created)
    }

    /// Updates a vaccine's mutable policy fields.
    pub async fn update_vaccine(
        &self,
        ctx: &RequestContext,
        data: UpdateVaccine,
    ) -> AppResult<Vaccine> {
        self.require_manager(ctx)?;

        let mut vaccine = self
            .vaccines
            .find_by_id(&data.id)
            .await?
            .ok_or_else(|| AppError::vaccine_not_found(data.id))?;

        if let Some(doses_required) = data.doses_required {
            vaccine.doses_required = doses_required;
        }
        if let Some(interval_days) = data.interval_days {
            vaccine.interval_days = Some(interval_days);
        }
        if let Some(is_obligatory) = data.is_obligatory {
            vaccine.is_obligatory = is_obligatory;
        }
        if let Some(min_stock_level) = data.min_stock_level {
            vaccine.min_stock_level = min_stock_level;
        }
        validate_vaccine_policy(
            vaccine.doses_required,
            vaccine.interval_days,
            vaccine.min_stock_level,
        )?;

        self.vaccines.update(&vaccine).await
    }

    /// Soft-deletes a vaccine.
    pub async fn delete_vaccine(&self, ctx: &RequestContext, id: Uuid) -> AppResult<bool> {
        self.require_manager(ctx)?;
        self.vaccines.delete(&id).await
    }

    /// Fetches a vaccine.
    pub async fn get_vaccine(&self, id: Uuid) -> AppResult<Vaccine> {
        self.vaccines
            .find_by_id(&id)
            .await?
            .ok_or_else(|| AppError::vaccine_not_found(id))
    }

    /// Lists vaccines.
    pub async fn list_vaccines(&self, page: PageRequest) -> AppResult<PageResponse<Vaccine>> {
        self.vaccines.find_all(&page).await
    }

    /// Lists vaccines below their minimum stock level.
    pub async fn list_below_min_stock(&self, ctx: &RequestContext) -> AppResult<Vec<Vaccine>> {
        self.require_manager(ctx)?;
        self.vaccines.find_below_min_stock().await
    }

    /// Registers a received batch, adding its units to the vaccine
    /// aggregate.
    pub async fn register_batch(
        &self,
        ctx: &RequestContext,
        data: CreateBatch,
    ) -> AppResult<VaccineBatch> {
        self.require_manager(ctx)?;

        if data.initial_quantity <= 0 {
            return Err(AppError::validation(
                "A batch must contain at least one unit",
            ));
        }
        if data.batch_number.trim().is_empty() {
            return Err(AppError::validation("Batch number is required"));
        }
        if data.expiration_date < data.received_date {
            return Err(AppError::validation(
                "A batch cannot expire before it was received",
            ));
        }

        // Surface a typed vaccine error before hitting the FK.
        let vaccine = self.get_vaccine(data.vaccine_id).await?;

        let now = Utc::now();
        let batch = VaccineBatch {
            id: Uuid::new_v4(),
            vaccine_id: vaccine.id,
            batch_number: data.batch_number,
            initial_quantity: data.initial_quantity,
            current_quantity: data.initial_quantity,
            expiration_date: data.expiration_date,
            received_date: data.received_date,
            status: BatchStatus::Available,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let created = self.ledger.register_batch(&batch).await?;

        self.emit(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Inventory(InventoryEvent::BatchRegistered {
                batch_id: created.id,
                vaccine_id: created.vaccine_id,
                batch_number: created.batch_number.clone(),
                initial_quantity: created.initial_quantity,
            }),
        ))
        .await;

        Ok(created)
    }

    /// Fetches a batch.
    pub async fn get_batch(&self, id: Uuid) -> AppResult<VaccineBatch> {
        self.batches
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::batch_not_found(id))
    }

    /// Lists a vaccine's batches.
    pub async fn list_batches(
        &self,
        vaccine_id: Uuid,
        page: PageRequest,
    ) -> AppResult<PageResponse<VaccineBatch>> {
        self.batches.find_by_vaccine(vaccine_id, &page).await
    }

    /// Returns units to a batch (an inventory correction).
    pub async fn increment_batch(
        &self,
        ctx: &RequestContext,
        batch_id: Uuid,
        amount: i32,
    ) -> AppResult<VaccineBatch> {
        self.require_manager(ctx)?;
        if amount <= 0 {
            return Err(AppError::validation("Amount must be positive"));
        }
        self.ledger.increment_quantity(batch_id, amount).await
    }

    /// Removes units from a batch (an inventory correction).
    pub async fn decrement_batch(
        &self,
        ctx: &RequestContext,
        batch_id: Uuid,
        amount: i32,
    ) -> AppResult<VaccineBatch> {
        self.require_manager(ctx)?;
        if amount <= 0 {
            return Err(AppError::validation("Amount must be positive"));
        }
        let batch = self.ledger.decrement_quantity(batch_id, amount).await?;
        self.check_low_stock(ctx, batch.vaccine_id).await;
        Ok(batch)
    }

    /// Discards a batch, removing its remaining units from stock.
    pub async fn discard_batch(
        &self,
        ctx: &RequestContext,
        batch_id: Uuid,
    ) -> AppResult<VaccineBatch> {
        self.require_manager(ctx)?;

        let discarded = self.ledger.discard_batch(batch_id).await?;

        self.emit(DomainEvent::new(
            Some(ctx.user_id),
            EventPayload::Inventory(InventoryEvent::BatchDiscarded {
                batch_id: discarded.id,
                vaccine_id: discarded.vaccine_id,
                discarded_quantity: discarded.current_quantity,
            }),
        ))
        .await;

        self.check_low_stock(ctx, discarded.vaccine_id).await;
        Ok(discarded)
    }

    /// Soft-deletes a batch.
    pub async fn remove_batch(&self, ctx: &RequestContext, batch_id: Uuid) -> AppResult<bool> {
        self.require_manager(ctx)?;
        self.ledger.remove_batch(batch_id).await
    }

    /// Transitions every Available batch past its expiration date to
    /// Expired. Returns the transitioned batches.
    pub async fn expire_batches(&self, ctx: &RequestContext) -> AppResult<Vec<VaccineBatch>> {
        self.require_manager(ctx)?;

        let expired = self
            .ledger
            .mark_expired_batches(ctx.request_time.date_naive())
            .await?;

        for batch in &expired {
            self.check_low_stock(ctx, batch.vaccine_id).await;
        }
        Ok(expired)
    }

    fn require_manager(&self, ctx: &RequestContext) -> AppResult<()> {
        if !ctx.is_manager() {
            return Err(AppError::forbidden(
                "Only a manager may manage vaccine inventory",
            ));
        }
        Ok(())
    }

    /// Emits a LowStock warning if the vaccine dropped below its
    /// minimum level. Best-effort.
    async fn check_low_stock(&self, ctx: &RequestContext, vaccine_id: Uuid) {
        let vaccine = match self.vaccines.find_by_id(&vaccine_id).await {
            Ok(Some(v)) => v,
            Ok(None) => return,
            Err(e) => {
                warn!(error = %e, %vaccine_id, "Failed to check stock level");
                return;
            }
        };

        if vaccine.is_below_min_stock() {
            self.emit(
                DomainEvent::new(
                    Some(ctx.user_id),
                    EventPayload::Inventory(InventoryEvent::LowStock {
                        vaccine_id: vaccine.id,
                        total_stock: vaccine.total_stock,
                        min_stock_level: vaccine.min_stock_level,
                    }),
                )
                .with_channels(vec![EventChannel::Email, EventChannel::InApp])
                .with_priority(EventPriority::High),
            )
            .await;
        }
    }

    /// Best-effort event dispatch; a failure never fails the operation.
    async fn emit(&self, event: DomainEvent) {
        if let Err(e) = self.events.dispatch(event).await {
            warn!(error = %e, "Failed to dispatch inventory event");
        }
    }
}

/// Validate the vaccine policy fields shared by create and update.
fn validate_vaccine_policy(
    doses_required: i32,
    interval_days: Option<i32>,
    min_stock_level: i32,
) -> AppResult<()> {
    if doses_required < 1 {
        return Err(AppError::validation(
            "A vaccine requires at least one dose",
        ));
    }
    if let Some(days) = interval_days {
        if days < 1 {
            return Err(AppError::validation(
                "The dose interval must be at least one day",
            ));
        }
    }
    if min_stock_level < 0 {
        return Err(AppError::validation(
            "The minimum stock level cannot be negative",
        ));
    }
    Ok(())
}
