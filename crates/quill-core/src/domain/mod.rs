//! Domain entities - the core business objects.

mod category;
mod post;
mod user;

pub use category::{Category, slugify};
pub use post::{Comment, EXCERPT_MAX_LEN, Post, TITLE_MAX_LEN};
pub use user::{EMAIL_MAX_LEN, NAME_MAX_LEN, Role, User, mask_email, normalize_email};
