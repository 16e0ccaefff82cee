//! Database entities module

pub mod partner;

pub use partner::Entity as Partner;
