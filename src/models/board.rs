use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::COLOR_REGEX;

/// A row of the `boards` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A lane on a board. `position` is 0-based and dense per board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct BoardColumn {
    pub id: i64,
    pub board_id: i64,
    pub name: String,
    pub color: String,
    pub position: i64,
}

/// Payload of `POST /projects/{id}/boards` and `PATCH /boards/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct BoardInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ColumnInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(regex(path = "COLOR_REGEX", message = "Color must be #rrggbb"))]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ColumnUpdate {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(regex(path = "COLOR_REGEX", message = "Color must be #rrggbb"))]
    pub color: Option<String>,
}

impl ColumnUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }
}

/// Payload of `PATCH /boards/{id}/columns/reorder`: column ids in their new order.
#[derive(Debug, Deserialize)]
pub struct ReorderColumnsInput {
    pub column_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_color_validation() {
        let valid = ColumnInput {
            name: "Review".to_string(),
            color: Some("#A1b2C3".to_string()),
        };
        assert!(valid.validate().is_ok());

        let default_color = ColumnInput {
            name: "Review".to_string(),
            color: None,
        };
        assert!(default_color.validate().is_ok());

        let bad_color = ColumnInput {
            name: "Review".to_string(),
            color: Some("red".to_string()),
        };
        assert!(bad_color.validate().is_err());

        let update = ColumnUpdate::default();
        assert!(update.is_empty());
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_board_name_required() {
        assert!(BoardInput { name: String::new() }.validate().is_err());
        assert!(BoardInput { name: "Sprint".into() }.validate().is_ok());
    }
}
