pub mod create;
pub mod delete;
pub mod read;

pub use create::{CreateSourceError, create_source};
pub use delete::{DeleteSourceError, delete_source};
pub use read::read_source;
