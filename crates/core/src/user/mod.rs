mod types;

pub use types::{User, UserUpdate, DEFAULT_ROLE};
