//! Entity modules.
//!
//! Each repository is a zero-sized struct providing async operations that
//! accept `&dyn Gateway` as the first argument. Mutations also take the
//! acting client id and, where attribution is stamped afterwards, a
//! `&dyn RecordChangeLogger`.

mod common;

pub mod client_repo;
pub mod donation_campaign_repo;
pub mod donation_repo;
pub mod event_attendance_repo;
pub mod event_repo;
pub mod household_repo;
pub mod milestone_repo;
pub mod ministry_delegation_repo;
pub mod ministry_repo;
pub mod person_repo;

pub use client_repo::ClientRepo;
pub use donation_campaign_repo::DonationCampaignRepo;
pub use donation_repo::DonationRepo;
pub use event_attendance_repo::EventAttendanceRepo;
pub use event_repo::EventRepo;
pub use household_repo::HouseholdRepo;
pub use milestone_repo::MilestoneRepo;
pub use ministry_delegation_repo::MinistryDelegationRepo;
pub use ministry_repo::MinistryRepo;
pub use person_repo::PersonRepo;
