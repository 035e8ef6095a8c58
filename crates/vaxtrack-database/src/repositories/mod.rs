//! Concrete sqlx repository implementations.

pub mod application;
pub mod batch;
pub mod ledger;
pub mod scheduling;
pub mod unit_of_work;
pub mod user;
pub mod vaccine;

pub use application::ApplicationRepository;
pub use batch::BatchRepository;
pub use ledger::PgInventoryLedger;
pub use scheduling::SchedulingRepository;
pub use unit_of_work::PgDoseUnitOfWork;
pub use user::UserRepository;
pub use vaccine::VaccineRepository;
