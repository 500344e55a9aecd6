use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::COLOR_REGEX;

/// A project-scoped tag that can be attached to any task of the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Label {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LabelInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(regex(path = "COLOR_REGEX", message = "Color must be #rrggbb"))]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct LabelUpdate {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(regex(path = "COLOR_REGEX", message = "Color must be #rrggbb"))]
    pub color: Option<String>,
}

impl LabelUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }
}
