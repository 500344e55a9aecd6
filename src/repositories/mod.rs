//! Data access, one repository per entity.
//!
//! Every repository borrows the shared [`SqlitePool`](sqlx::SqlitePool) handed to it by
//! the caller; nothing here holds global state. Queries bind all values as
//! parameters. Errors are never caught here: they surface as `sqlx::Error` and
//! become opaque 500s (or 404 for `RowNotFound`) through `AppError`.

pub mod board;
pub mod column;
pub mod comment;
pub mod label;
pub mod project;
pub mod task;
pub mod user;

pub use board::BoardRepo;
pub use column::ColumnRepo;
pub use comment::CommentRepo;
pub use label::LabelRepo;
pub use project::ProjectRepo;
pub use task::TaskRepo;
pub use user::UserRepo;

pub type RepoResult<T> = Result<T, sqlx::Error>;
