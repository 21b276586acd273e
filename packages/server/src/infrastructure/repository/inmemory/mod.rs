//! In-memory repositories (process lifetime, no persistence).

mod user;

pub use user::InMemoryUserRepository;
