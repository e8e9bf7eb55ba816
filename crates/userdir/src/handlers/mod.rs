pub mod authz;
pub mod error;
pub mod root;
pub mod users;

pub use error::ApiError;
