//! Non-durable partner directory

pub mod memory;

pub use memory::InMemoryPartnerRepository;
