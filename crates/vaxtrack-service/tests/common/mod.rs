//! Shared in-memory fixtures for service tests.
//!
//! `MemStore` implements every store trait over one mutex-guarded set
//! of tables, applying the same guards as the sqlx repositories
//! (conditional check-then-write under the lock), so orchestration and
//! concurrency behavior can be exercised without a database.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use uuid::Uuid;

use vaxtrack_core::error::AppError;
use vaxtrack_core::events::{DomainEvent, EventPayload};
use vaxtrack_core::result::AppResult;
use vaxtrack_core::traits::{EventSink, Repository};
use vaxtrack_core::types::pagination::{PageRequest, PageResponse};
use vaxtrack_database::store::{
    ApplicationFilter, ApplicationStore, ApplyDoseOutcome, ApplyDoseWrite, BatchStore,
    DoseUnitOfWork, InventoryLedger, SchedulingStore, SchedulingWrite, UserStore, VaccineStore,
};
use vaxtrack_entity::application::VaccineApplication;
use vaxtrack_entity::batch::{BatchStatus, VaccineBatch};
use vaxtrack_entity::scheduling::{SchedulingStatus, VaccineScheduling};
use vaxtrack_entity::user::{User, UserRole, UserStatus};
use vaxtrack_entity::vaccine::Vaccine;
use vaxtrack_service::application::ApplicationService;
use vaxtrack_service::context::RequestContext;
use vaxtrack_service::inventory::InventoryService;
use vaxtrack_service::scheduling::SchedulingService;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    vaccines: HashMap<Uuid, Vaccine>,
    batches: HashMap<Uuid, VaccineBatch>,
    schedulings: HashMap<Uuid, VaccineScheduling>,
    applications: HashMap<Uuid, VaccineApplication>,
}

/// In-memory backing store implementing all persistence traits.
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Tables>,
}

impl MemStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert_user(&self, user: User) {
        self.inner.lock().unwrap().users.insert(user.id, user);
    }

    pub fn insert_vaccine(&self, vaccine: Vaccine) {
        self.inner
            .lock()
            .unwrap()
            .vaccines
            .insert(vaccine.id, vaccine);
    }

    /// Insert a batch directly, mirroring its quantity onto the vaccine
    /// aggregate when the batch counts toward stock.
    pub fn insert_batch(&self, batch: VaccineBatch) {
        let mut tables = self.inner.lock().unwrap();
        if batch.status == BatchStatus::Available {
            if let Some(vaccine) = tables.vaccines.get_mut(&batch.vaccine_id) {
                vaccine.total_stock += batch.current_quantity;
            }
        }
        tables.batches.insert(batch.id, batch);
    }

    /// Replace a batch row without touching the vaccine aggregate.
    pub fn update_batch(&self, batch: VaccineBatch) {
        self.inner.lock().unwrap().batches.insert(batch.id, batch);
    }

    pub fn insert_scheduling(&self, scheduling: VaccineScheduling) {
        self.inner
            .lock()
            .unwrap()
            .schedulings
            .insert(scheduling.id, scheduling);
    }

    pub fn insert_application(&self, application: VaccineApplication) {
        self.inner
            .lock()
            .unwrap()
            .applications
            .insert(application.id, application);
    }

    pub fn vaccine(&self, id: Uuid) -> Vaccine {
        self.inner.lock().unwrap().vaccines[&id].clone()
    }

    pub fn batch(&self, id: Uuid) -> VaccineBatch {
        self.inner.lock().unwrap().batches[&id].clone()
    }

    pub fn scheduling(&self, id: Uuid) -> VaccineScheduling {
        self.inner.lock().unwrap().schedulings[&id].clone()
    }

    pub fn schedulings_for(&self, user_id: Uuid) -> Vec<VaccineScheduling> {
        self.inner
            .lock()
            .unwrap()
            .schedulings
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }
}

fn paginate<T: Clone + serde::Serialize>(items: Vec<T>, page: &PageRequest) -> PageResponse<T> {
    let total = items.len() as u64;
    let start = (page.offset() as usize).min(items.len());
    let end = (start + page.limit() as usize).min(items.len());
    PageResponse::new(items[start..end].to_vec(), page.page, page.page_size, total)
}

#[async_trait]
impl UserStore for MemStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .get(&id)
            .filter(|u| u.deleted_at.is_none())
            .cloned())
    }
}

#[async_trait]
impl Repository<Vaccine, Uuid> for MemStore {
    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<Vaccine>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .vaccines
            .get(id)
            .filter(|v| v.deleted_at.is_none())
            .cloned())
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Vaccine>> {
        let mut items: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .vaccines
            .values()
            .filter(|v| v.deleted_at.is_none())
            .cloned()
            .collect();
        items.sort_by_key(|v| v.created_at);
        Ok(paginate(items, page))
    }

    async fn create(&self, entity: &Vaccine) -> AppResult<Vaccine> {
        self.inner
            .lock()
            .unwrap()
            .vaccines
            .insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn update(&self, entity: &Vaccine) -> AppResult<Vaccine> {
        let mut tables = self.inner.lock().unwrap();
        if !tables.vaccines.contains_key(&entity.id) {
            return Err(AppError::vaccine_not_found(entity.id));
        }
        tables.vaccines.insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, id: &Uuid) -> AppResult<bool> {
        let mut tables = self.inner.lock().unwrap();
        match tables.vaccines.get_mut(id) {
            Some(v) if v.deleted_at.is_none() => {
                v.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl VaccineStore for MemStore {
    async fn find_below_min_stock(&self) -> AppResult<Vec<Vaccine>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .vaccines
            .values()
            .filter(|v| v.deleted_at.is_none() && v.total_stock < v.min_stock_level)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BatchStore for MemStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<VaccineBatch>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .batches
            .get(&id)
            .filter(|b| b.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_batch_number(&self, batch_number: &str) -> AppResult<Option<VaccineBatch>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .batches
            .values()
            .find(|b| b.batch_number == batch_number && b.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_vaccine(
        &self,
        vaccine_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<VaccineBatch>> {
        let mut items: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .batches
            .values()
            .filter(|b| b.vaccine_id == vaccine_id && b.deleted_at.is_none())
            .cloned()
            .collect();
        items.sort_by_key(|b| b.received_date);
        Ok(paginate(items, page))
    }

    async fn find_oldest_available(&self, vaccine_id: Uuid) -> AppResult<Option<VaccineBatch>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .batches
            .values()
            .filter(|b| {
                b.vaccine_id == vaccine_id
                    && b.deleted_at.is_none()
                    && b.status == BatchStatus::Available
                    && b.current_quantity > 0
            })
            .min_by_key(|b| b.received_date)
            .cloned())
    }

    async fn find_soonest_expiring(
        &self,
        vaccine_id: Uuid,
        today: NaiveDate,
    ) -> AppResult<Option<VaccineBatch>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .batches
            .values()
            .filter(|b| {
                b.vaccine_id == vaccine_id
                    && b.deleted_at.is_none()
                    && b.status == BatchStatus::Available
                    && b.current_quantity > 0
                    && b.expiration_date >= today
            })
            .min_by_key(|b| b.expiration_date)
            .cloned())
    }
}

#[async_trait]
impl Repository<VaccineScheduling, Uuid> for MemStore {
    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<VaccineScheduling>> {
        Ok(self.inner.lock().unwrap().schedulings.get(id).cloned())
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<VaccineScheduling>> {
        let mut items: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .schedulings
            .values()
            .cloned()
            .collect();
        items.sort_by_key(|s| s.scheduled_date);
        Ok(paginate(items, page))
    }

    async fn create(&self, entity: &VaccineScheduling) -> AppResult<VaccineScheduling> {
        let mut tables = self.inner.lock().unwrap();
        // The partial unique index on the active dose slot.
        let occupied = tables.schedulings.values().any(|s| {
            s.user_id == entity.user_id
                && s.vaccine_id == entity.vaccine_id
                && s.dose_number == entity.dose_number
                && s.status != SchedulingStatus::Cancelled
        });
        if occupied {
            return Err(AppError::duplicate_dose(entity.dose_number));
        }
        tables.schedulings.insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn update(&self, entity: &VaccineScheduling) -> AppResult<VaccineScheduling> {
        let mut tables = self.inner.lock().unwrap();
        if !tables.schedulings.contains_key(&entity.id) {
            return Err(AppError::scheduling_not_found(entity.id));
        }
        tables.schedulings.insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, id: &Uuid) -> AppResult<bool> {
        let mut tables = self.inner.lock().unwrap();
        match tables.schedulings.get_mut(id) {
            Some(s) if s.deleted_at.is_none() => {
                s.deleted_at = Some(Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl SchedulingStore for MemStore {
    async fn find_active_for_dose(
        &self,
        user_id: Uuid,
        vaccine_id: Uuid,
        dose_number: i32,
    ) -> AppResult<Option<VaccineScheduling>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .schedulings
            .values()
            .find(|s| {
                s.user_id == user_id
                    && s.vaccine_id == vaccine_id
                    && s.dose_number == dose_number
                    && s.status != SchedulingStatus::Cancelled
            })
            .cloned())
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<VaccineScheduling>> {
        let mut items: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .schedulings
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by_key(|s| s.scheduled_date);
        Ok(paginate(items, page))
    }

    async fn dose_event_date(
        &self,
        user_id: Uuid,
        vaccine_id: Uuid,
        dose_number: i32,
    ) -> AppResult<Option<DateTime<Utc>>> {
        let tables = self.inner.lock().unwrap();
        let Some(scheduling) = tables.schedulings.values().find(|s| {
            s.user_id == user_id
                && s.vaccine_id == vaccine_id
                && s.dose_number == dose_number
                && s.status != SchedulingStatus::Cancelled
        }) else {
            return Ok(None);
        };

        if scheduling.status == SchedulingStatus::Completed {
            let applied = tables
                .applications
                .values()
                .find(|a| a.scheduling_id == scheduling.id)
                .map(|a| a.application_date);
            Ok(Some(applied.unwrap_or(scheduling.scheduled_date)))
        } else {
            Ok(Some(scheduling.scheduled_date))
        }
    }
}

#[async_trait]
impl Repository<VaccineApplication, Uuid> for MemStore {
    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<VaccineApplication>> {
        Ok(self.inner.lock().unwrap().applications.get(id).cloned())
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<VaccineApplication>> {
        let mut items: Vec<_> = self
            .inner
            .lock()
            .unwrap()
            .applications
            .values()
            .cloned()
            .collect();
        items.sort_by_key(|a| a.application_date);
        Ok(paginate(items, page))
    }

    async fn create(&self, entity: &VaccineApplication) -> AppResult<VaccineApplication> {
        self.inner
            .lock()
            .unwrap()
            .applications
            .insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn update(&self, entity: &VaccineApplication) -> AppResult<VaccineApplication> {
        let mut tables = self.inner.lock().unwrap();
        if !tables.applications.contains_key(&entity.id) {
            return Err(AppError::application_not_found(entity.id));
        }
        tables.applications.insert(entity.id, entity.clone());
        Ok(entity.clone())
    }

    async fn delete(&self, _id: &Uuid) -> AppResult<bool> {
        Err(AppError::validation(
            "Application records are immutable and cannot be deleted",
        ))
    }
}

#[async_trait]
impl ApplicationStore for MemStore {
    async fn find_by_scheduling(
        &self,
        scheduling_id: Uuid,
    ) -> AppResult<Option<VaccineApplication>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .applications
            .values()
            .find(|a| a.scheduling_id == scheduling_id)
            .cloned())
    }

    async fn find_filtered(
        &self,
        filter: &ApplicationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<VaccineApplication>> {
        let tables = self.inner.lock().unwrap();
        let mut items: Vec<_> = tables
            .applications
            .values()
            .filter(|a| {
                let scheduling = tables.schedulings.get(&a.scheduling_id);
                let user_ok = filter
                    .user_id
                    .is_none_or(|uid| scheduling.is_some_and(|s| s.user_id == uid));
                let vaccine_ok = filter
                    .vaccine_id
                    .is_none_or(|vid| scheduling.is_some_and(|s| s.vaccine_id == vid));
                let applier_ok = filter.applied_by.is_none_or(|n| a.applied_by == n);
                user_ok && vaccine_ok && applier_ok
            })
            .cloned()
            .collect();
        items.sort_by_key(|a| a.application_date);
        Ok(paginate(items, page))
    }
}

/// Decrement guard shared by the ledger and the unit of work, applied
/// under the table lock just like the SQL conditional update.
fn guarded_decrement(tables: &mut Tables, batch_id: Uuid, amount: i32) -> AppResult<VaccineBatch> {
    let batch = match tables
        .batches
        .get_mut(&batch_id)
        .filter(|b| b.deleted_at.is_none())
    {
        None => return Err(AppError::batch_not_found(batch_id)),
        Some(b) => b,
    };
    if batch.status != BatchStatus::Available {
        return Err(AppError::batch_not_available(format!(
            "status is {}",
            batch.status
        )));
    }
    if batch.current_quantity < amount {
        return Err(AppError::insufficient_quantity(batch_id, amount));
    }
    batch.current_quantity -= amount;
    if batch.current_quantity == 0 {
        batch.status = BatchStatus::Depleted;
    }
    batch.updated_at = Utc::now();
    Ok(batch.clone())
}

fn adjust_stock(tables: &mut Tables, vaccine_id: Uuid, delta: i32) -> AppResult<i32> {
    let vaccine = tables
        .vaccines
        .get_mut(&vaccine_id)
        .filter(|v| v.deleted_at.is_none())
        .ok_or_else(|| AppError::vaccine_not_found(vaccine_id))?;
    vaccine.total_stock += delta;
    Ok(vaccine.total_stock)
}

#[async_trait]
impl InventoryLedger for MemStore {
    async fn register_batch(&self, batch: &VaccineBatch) -> AppResult<VaccineBatch> {
        let mut tables = self.inner.lock().unwrap();
        if tables
            .batches
            .values()
            .any(|b| b.batch_number == batch.batch_number)
        {
            return Err(AppError::batch_number_exists(&batch.batch_number));
        }
        adjust_stock(&mut tables, batch.vaccine_id, batch.current_quantity)?;
        tables.batches.insert(batch.id, batch.clone());
        Ok(batch.clone())
    }

    async fn decrement_quantity(&self, batch_id: Uuid, amount: i32) -> AppResult<VaccineBatch> {
        let mut tables = self.inner.lock().unwrap();
        let batch = guarded_decrement(&mut tables, batch_id, amount)?;
        adjust_stock(&mut tables, batch.vaccine_id, -amount)?;
        Ok(batch)
    }

    async fn increment_quantity(&self, batch_id: Uuid, amount: i32) -> AppResult<VaccineBatch> {
        let mut tables = self.inner.lock().unwrap();
        let batch = match tables
            .batches
            .get_mut(&batch_id)
            .filter(|b| b.deleted_at.is_none())
        {
            Some(b)
                if matches!(b.status, BatchStatus::Available | BatchStatus::Depleted)
                    && b.current_quantity + amount <= b.initial_quantity =>
            {
                b.current_quantity += amount;
                if b.status == BatchStatus::Depleted && b.current_quantity > 0 {
                    b.status = BatchStatus::Available;
                }
                b.updated_at = Utc::now();
                b.clone()
            }
            _ => {
                return Err(AppError::validation(format!(
                    "Cannot add {amount} unit(s) to batch {batch_id}: batch missing, \
                     not restockable, or quantity would exceed the received amount"
                )));
            }
        };
        adjust_stock(&mut tables, batch.vaccine_id, amount)?;
        Ok(batch)
    }

    async fn discard_batch(&self, batch_id: Uuid) -> AppResult<VaccineBatch> {
        let mut tables = self.inner.lock().unwrap();
        let batch = match tables
            .batches
            .get_mut(&batch_id)
            .filter(|b| b.deleted_at.is_none() && b.status == BatchStatus::Available)
        {
            Some(b) => {
                b.status = BatchStatus::Discarded;
                b.updated_at = Utc::now();
                b.clone()
            }
            None => {
                return Err(AppError::batch_not_available(
                    "only an available batch can be discarded",
                ));
            }
        };
        if batch.current_quantity > 0 {
            adjust_stock(&mut tables, batch.vaccine_id, -batch.current_quantity)?;
        }
        Ok(batch)
    }

    async fn mark_expired_batches(&self, today: NaiveDate) -> AppResult<Vec<VaccineBatch>> {
        let mut tables = self.inner.lock().unwrap();
        let ids: Vec<Uuid> = tables
            .batches
            .values()
            .filter(|b| {
                b.deleted_at.is_none()
                    && b.status == BatchStatus::Available
                    && b.expiration_date < today
            })
            .map(|b| b.id)
            .collect();

        let mut expired = Vec::with_capacity(ids.len());
        for id in ids {
            let batch = {
                let b = tables.batches.get_mut(&id).ok_or_else(|| {
                    AppError::batch_not_found(id)
                })?;
                b.status = BatchStatus::Expired;
                b.updated_at = Utc::now();
                b.clone()
            };
            if batch.current_quantity > 0 {
                adjust_stock(&mut tables, batch.vaccine_id, -batch.current_quantity)?;
            }
            expired.push(batch);
        }
        Ok(expired)
    }

    async fn remove_batch(&self, batch_id: Uuid) -> AppResult<bool> {
        let mut tables = self.inner.lock().unwrap();
        let batch = match tables
            .batches
            .get_mut(&batch_id)
            .filter(|b| b.deleted_at.is_none())
        {
            Some(b) => {
                b.deleted_at = Some(Utc::now());
                b.updated_at = Utc::now();
                b.clone()
            }
            None => return Ok(false),
        };
        if batch.status == BatchStatus::Available && batch.current_quantity > 0 {
            adjust_stock(&mut tables, batch.vaccine_id, -batch.current_quantity)?;
        }
        Ok(true)
    }
}

#[async_trait]
impl DoseUnitOfWork for MemStore {
    async fn apply_dose(&self, write: ApplyDoseWrite) -> AppResult<ApplyDoseOutcome> {
        let mut tables = self.inner.lock().unwrap();

        // Check everything before mutating anything, so a failure at
        // any step leaves no partial state, like the SQL transaction.
        let scheduling_template = match &write.scheduling {
            SchedulingWrite::Existing(id) => {
                let current = tables
                    .schedulings
                    .get(id)
                    .filter(|s| s.deleted_at.is_none())
                    .ok_or_else(|| AppError::scheduling_not_found(id))?;
                match current.status {
                    SchedulingStatus::Completed => {
                        return Err(AppError::scheduling_already_completed(id));
                    }
                    SchedulingStatus::Cancelled => {
                        return Err(AppError::validation(format!(
                            "Scheduling {id} is cancelled and cannot be applied"
                        )));
                    }
                    SchedulingStatus::Scheduled | SchedulingStatus::Confirmed => {}
                }
                current.clone()
            }
            SchedulingWrite::New(scheduling) => {
                let occupied = tables.schedulings.values().any(|s| {
                    s.user_id == scheduling.user_id
                        && s.vaccine_id == scheduling.vaccine_id
                        && s.dose_number == scheduling.dose_number
                        && s.status != SchedulingStatus::Cancelled
                });
                if occupied {
                    return Err(AppError::duplicate_dose(scheduling.dose_number));
                }
                scheduling.clone()
            }
        };

        if tables
            .applications
            .values()
            .any(|a| a.scheduling_id == scheduling_template.id)
        {
            return Err(AppError::duplicate_dose(scheduling_template.dose_number));
        }

        let batch_ref = tables
            .batches
            .get(&write.application.batch_id)
            .filter(|b| b.deleted_at.is_none())
            .ok_or_else(|| AppError::batch_not_found(write.application.batch_id))?;
        if batch_ref.status != BatchStatus::Available {
            return Err(AppError::batch_not_available(format!(
                "status is {}",
                batch_ref.status
            )));
        }
        if batch_ref.current_quantity < 1 {
            return Err(AppError::insufficient_quantity(batch_ref.id, 1));
        }
        if !tables.vaccines.contains_key(&batch_ref.vaccine_id) {
            return Err(AppError::vaccine_not_found(batch_ref.vaccine_id));
        }

        // All guards passed; apply the writes.
        let mut scheduling = scheduling_template;
        scheduling.status = SchedulingStatus::Completed;
        scheduling.updated_at = Utc::now();
        tables.schedulings.insert(scheduling.id, scheduling.clone());

        let mut application = write.application;
        application.scheduling_id = scheduling.id;
        tables
            .applications
            .insert(application.id, application.clone());

        let batch = guarded_decrement(&mut tables, application.batch_id, 1)?;
        let vaccine_total_stock = adjust_stock(&mut tables, batch.vaccine_id, -1)?;

        Ok(ApplyDoseOutcome {
            application,
            scheduling,
            batch,
            vaccine_total_stock,
        })
    }
}

/// Event sink that records every dispatched event.
#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingEvents {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn recorded(&self) -> Vec<DomainEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count_matching(&self, predicate: impl Fn(&EventPayload) -> bool) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| predicate(&e.payload))
            .count()
    }
}

#[async_trait]
impl EventSink for RecordingEvents {
    async fn dispatch(&self, event: DomainEvent) -> AppResult<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Fully wired services over one shared in-memory store.
pub struct TestEnv {
    pub store: Arc<MemStore>,
    pub events: Arc<RecordingEvents>,
    pub applications: ApplicationService,
    pub schedulings: SchedulingService,
    pub inventory: InventoryService,
}

impl TestEnv {
    pub fn new() -> Self {
        let store = MemStore::new();
        let events = RecordingEvents::new();

        let applications = ApplicationService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            events.clone(),
        );
        let schedulings = SchedulingService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            events.clone(),
        );
        let inventory = InventoryService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            events.clone(),
        );

        Self {
            store,
            events,
            applications,
            schedulings,
            inventory,
        }
    }

    pub fn seed_user(&self, role: UserRole) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            full_name: format!("{role:?} User"),
            email: None,
            role,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.store.insert_user(user.clone());
        user
    }

    pub fn seed_vaccine(&self, doses_required: i32, interval_days: Option<i32>) -> Vaccine {
        let now = Utc::now();
        let vaccine = Vaccine {
            id: Uuid::new_v4(),
            name: "Hepatitis B".into(),
            manufacturer: "Acme Biologics".into(),
            doses_required,
            interval_days,
            is_obligatory: true,
            min_stock_level: 0,
            total_stock: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.store.insert_vaccine(vaccine.clone());
        vaccine
    }

    pub fn seed_batch(&self, vaccine_id: Uuid, quantity: i32, expires_in_days: i64) -> VaccineBatch {
        let now = Utc::now();
        let batch = VaccineBatch {
            id: Uuid::new_v4(),
            vaccine_id,
            batch_number: format!("LOT-{}", Uuid::new_v4().simple()),
            initial_quantity: quantity,
            current_quantity: quantity,
            expiration_date: now.date_naive() + Duration::days(expires_in_days),
            received_date: now.date_naive(),
            status: BatchStatus::Available,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        self.store.insert_batch(batch.clone());
        batch
    }

    /// Seed a completed dose event: a Completed scheduling plus its
    /// application, administered `days_ago` days in the past.
    pub fn seed_completed_dose(
        &self,
        user_id: Uuid,
        vaccine_id: Uuid,
        dose_number: i32,
        batch_id: Uuid,
        nurse_id: Uuid,
        days_ago: i64,
    ) -> VaccineScheduling {
        let applied_at = Utc::now() - Duration::days(days_ago);
        let scheduling = VaccineScheduling {
            id: Uuid::new_v4(),
            user_id,
            vaccine_id,
            dose_number,
            scheduled_date: applied_at,
            status: SchedulingStatus::Completed,
            assigned_nurse_id: Some(nurse_id),
            notes: None,
            created_at: applied_at,
            updated_at: applied_at,
            deleted_at: None,
        };
        self.store.insert_scheduling(scheduling.clone());
        self.store.insert_application(VaccineApplication {
            id: Uuid::new_v4(),
            scheduling_id: scheduling.id,
            batch_id,
            applied_by: nurse_id,
            application_date: applied_at,
            application_site: None,
            observations: None,
            created_at: applied_at,
            updated_at: applied_at,
        });
        scheduling
    }

    pub fn ctx_for(&self, user: &User) -> RequestContext {
        RequestContext::new(user.id, user.role)
    }
}
