pub mod asset_admin_service;
pub mod asset_composer;
pub mod booking_service;
pub mod commit_sequencer;
pub mod draft_catalog;
pub mod onboarding_wizard;
pub mod search_service;
