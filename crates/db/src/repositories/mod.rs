//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&Database` as the first argument. Every read and write on user-owned data
//! takes the owner's id and filters by it.

pub mod campaign_repo;
pub mod character_repo;
pub mod narrative_repo;
pub mod progress_repo;
pub mod user_repo;

pub use campaign_repo::CampaignRepo;
pub use character_repo::CharacterRepo;
pub use narrative_repo::NarrativeRepo;
pub use progress_repo::ProgressRepo;
pub use user_repo::UserRepo;
