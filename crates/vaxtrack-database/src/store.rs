//! Store traits describing the persistence seams.
//!
//! Services depend on these traits, not on the concrete sqlx
//! repositories, so the business logic stays agnostic of the backing
//! store. The only hard requirement on implementations is that the
//! ledger and unit-of-work mutations are atomic: conditional updates
//! at the storage layer, never read-modify-write from memory.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vaxtrack_core::result::AppResult;
use vaxtrack_core::traits::Repository;
use vaxtrack_core::types::pagination::{PageRequest, PageResponse};
use vaxtrack_entity::application::VaccineApplication;
use vaxtrack_entity::batch::VaccineBatch;
use vaxtrack_entity::scheduling::VaccineScheduling;
use vaxtrack_entity::user::User;
use vaxtrack_entity::vaccine::Vaccine;

/// Read-side lookup of users for authorization decisions.
///
/// Account management belongs to the identity collaborator; the core
/// only ever reads.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a non-deleted user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
}

/// Vaccine catalog persistence.
///
/// `delete` is a soft delete. `total_stock` is never written through
/// this trait; only the ledger mutates it.
#[async_trait]
pub trait VaccineStore: Repository<Vaccine, Uuid> {
    /// List vaccines whose aggregate stock is below their minimum level.
    async fn find_below_min_stock(&self) -> AppResult<Vec<Vaccine>>;
}

/// Read-side batch queries.
///
/// All batch mutations go through [`InventoryLedger`] so that every
/// stock change is mirrored to the vaccine aggregate atomically.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Find a non-deleted batch by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VaccineBatch>>;

    /// Find a batch by its globally unique batch number.
    async fn find_by_batch_number(&self, batch_number: &str) -> AppResult<Option<VaccineBatch>>;

    /// List a vaccine's batches with pagination.
    async fn find_by_vaccine(
        &self,
        vaccine_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<VaccineBatch>>;

    /// FIFO: the oldest-received Available batch with units remaining.
    async fn find_oldest_available(&self, vaccine_id: Uuid) -> AppResult<Option<VaccineBatch>>;

    /// FEFO: the soonest-expiring Available, non-expired batch with
    /// units remaining. `today` bounds the expiration horizon.
    async fn find_soonest_expiring(
        &self,
        vaccine_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<Option<VaccineBatch>>;
}

/// Scheduling persistence.
///
/// `delete` is a soft delete; the service sets Cancelled status through
/// `update` in the same call. Completion is reserved for the unit of work.
#[async_trait]
pub trait SchedulingStore: Repository<VaccineScheduling, Uuid> {
    /// Find the active (non-Cancelled) scheduling occupying the
    /// (user, vaccine, dose number) slot, if any.
    async fn find_active_for_dose(
        &self,
        user_id: Uuid,
        vaccine_id: Uuid,
        dose_number: i32,
    ) -> AppResult<Option<VaccineScheduling>>;

    /// List a user's schedulings with pagination.
    async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<VaccineScheduling>>;

    /// The reference date of the active dose event in a slot: the
    /// application date when completed, otherwise the scheduled date.
    /// Used for minimum-interval checks.
    async fn dose_event_date(
        &self,
        user_id: Uuid,
        vaccine_id: Uuid,
        dose_number: i32,
    ) -> AppResult<Option<DateTime<Utc>>>;
}

/// Filter for application list queries.
///
/// `user_id` filters by the receiving user (joined through the
/// scheduling); `applied_by` by the administering nurse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationFilter {
    /// Restrict to applications received by this user.
    pub user_id: Option<Uuid>,
    /// Restrict to applications of this vaccine.
    pub vaccine_id: Option<Uuid>,
    /// Restrict to applications administered by this nurse.
    pub applied_by: Option<Uuid>,
}

/// Administered-dose persistence.
///
/// `create` is never called directly by services; applications are
/// inserted only inside [`DoseUnitOfWork::apply_dose`]. `update`
/// touches the annotation fields only.
#[async_trait]
pub trait ApplicationStore: Repository<VaccineApplication, Uuid> {
    /// Find the application completing a scheduling, if recorded.
    async fn find_by_scheduling(
        &self,
        scheduling_id: Uuid,
    ) -> AppResult<Option<VaccineApplication>>;

    /// List applications matching the filter with pagination.
    async fn find_filtered(
        &self,
        filter: &ApplicationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<VaccineApplication>>;
}

/// Batch stock arithmetic with aggregate mirroring.
///
/// Every method is one transaction: the batch write and the equal and
/// opposite vaccine `total_stock` write commit or roll back together.
/// Quantity checks are conditional updates at the storage layer so
/// concurrent consumers cannot overdraw a batch.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    /// Register a new batch and add its quantity to the vaccine
    /// aggregate. Fails with BatchNumberAlreadyExists on a duplicate
    /// batch number.
    async fn register_batch(&self, batch: &VaccineBatch) -> AppResult<VaccineBatch>;

    /// Remove `amount` units from a batch. The batch transitions to
    /// Depleted when it reaches zero. Fails with InsufficientQuantity
    /// when fewer than `amount` units remain (no partial decrement).
    async fn decrement_quantity(&self, batch_id: Uuid, amount: i32) -> AppResult<VaccineBatch>;

    /// Return `amount` units to a batch (e.g. a correction). Reverses
    /// Depleted back to Available when the quantity becomes positive.
    /// The quantity may never exceed `initial_quantity`.
    async fn increment_quantity(&self, batch_id: Uuid, amount: i32) -> AppResult<VaccineBatch>;

    /// Discard a batch, removing its remaining units from the
    /// aggregate.
    async fn discard_batch(&self, batch_id: Uuid) -> AppResult<VaccineBatch>;

    /// Transition every Available batch past its expiration date to
    /// Expired, removing each one's remaining units from its vaccine
    /// aggregate. Returns the transitioned batches.
    async fn mark_expired_batches(&self, today: NaiveDate) -> AppResult<Vec<VaccineBatch>>;

    /// Soft-delete a batch. An Available batch's remaining units leave
    /// the aggregate. Returns `true` if a batch was deleted.
    async fn remove_batch(&self, batch_id: Uuid) -> AppResult<bool>;
}

/// The scheduling side of a dose application.
#[derive(Debug, Clone)]
pub enum SchedulingWrite {
    /// Complete an existing scheduling (must still be Scheduled or
    /// Confirmed at commit time).
    Existing(Uuid),
    /// Insert a synthesized Completed scheduling (walk-in path).
    New(VaccineScheduling),
}

/// All writes of one dose application, applied as one transaction.
#[derive(Debug, Clone)]
pub struct ApplyDoseWrite {
    /// The fully built application row to insert.
    pub application: VaccineApplication,
    /// The scheduling to complete or insert.
    pub scheduling: SchedulingWrite,
}

/// Result of a committed dose application.
#[derive(Debug, Clone)]
pub struct ApplyDoseOutcome {
    /// The inserted application.
    pub application: VaccineApplication,
    /// The completed (or synthesized) scheduling.
    pub scheduling: VaccineScheduling,
    /// The consumed batch after the decrement.
    pub batch: VaccineBatch,
    /// The vaccine's aggregate stock after the decrement.
    pub vaccine_total_stock: i32,
}

/// The named transactional boundary of the application orchestrator.
///
/// Application insert, conditional batch decrement, vaccine aggregate
/// decrement, and scheduling completion/insertion form one indivisible
/// group: any failure rolls back every write.
#[async_trait]
pub trait DoseUnitOfWork: Send + Sync {
    /// Apply a dose: exactly one application row and exactly one stock
    /// decrement, or nothing.
    async fn apply_dose(&self, write: ApplyDoseWrite) -> AppResult<ApplyDoseOutcome>;
}
