//! Domain services - the operations the HTTP layer drives.

mod categories;
mod credentials;
mod federation;
mod gateway;
mod posts;

pub use categories::{CategoryDraft, CategoryPatch, CategoryService};
pub use credentials::{CredentialStore, MIN_PASSWORD_LEN};
pub use federation::FederatedIdentityBridge;
pub use gateway::AuthGateway;
pub use posts::{
    CategorySummary, CommentDetails, PostDetails, PostDraft, PostPatch, PostService, UserSummary,
};
