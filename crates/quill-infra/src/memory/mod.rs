//! In-memory repositories - used when no database is configured, and by tests.
//!
//! Every mutation happens under a single write lock, which gives the same
//! per-document atomicity the SQL implementations get from single statements.
//! Data is lost on process restart.

mod categories;
mod posts;
mod users;

pub use categories::InMemoryCategoryRepository;
pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;

#[cfg(test)]
mod tests;
