#![forbid(unsafe_code)]

pub mod fixture;
pub mod repository;

pub use fixture::{Fixture, FixtureError, Grant};
pub use repository::{
    InMemoryRepository, QuestionnaireRepository, ResponseRepository, Storage, StorageError,
};
