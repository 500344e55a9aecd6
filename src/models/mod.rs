pub mod board;
pub mod comment;
pub mod label;
pub mod project;
pub mod task;
pub mod user;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};

lazy_static! {
    /// `#rrggbb`, as used by columns and labels.
    pub(crate) static ref COLOR_REGEX: Regex = Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap();
}

pub use board::{Board, BoardColumn, BoardInput, ColumnInput, ColumnUpdate, ReorderColumnsInput};
pub use comment::{Comment, CommentInput};
pub use label::{Label, LabelInput, LabelUpdate};
pub use project::{
    AddMemberInput, MemberWithUser, Project, ProjectInput, ProjectMember, ProjectUpdate, Role,
};
pub use task::{
    NewTask, Task, TaskDetails, TaskInput, TaskPriority, TaskType, TaskUpdate, TaskWithLabels,
    TaskWithSubtasks,
};
pub use user::{PublicUser, User};

/// Tells an absent field (`None`) apart from an explicit `null` (`Some(None)`).
///
/// Use together with `#[serde(default)]` on `Option<Option<T>>` fields of
/// partial-update payloads.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
