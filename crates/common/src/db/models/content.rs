//! Content record entity
//!
//! One submitted document (file or pasted text) together with everything the
//! pipeline generated for it. Rows are written once and never updated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Summary length used when the client does not send one
pub const DEFAULT_SUMMARY_LENGTH: &str = "medium";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: Option<i32>,

    /// Storage-relative path of the uploaded document
    #[sea_orm(column_type = "Text", nullable)]
    pub original_file: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub original_text: Option<String>,

    /// `short`, `medium`, `long` or a percentage, as submitted
    #[sea_orm(column_type = "Text")]
    pub summary_length: String,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(column_type = "Text")]
    pub extracted_text: String,

    #[sea_orm(column_type = "Text")]
    pub summary: String,

    #[sea_orm(column_type = "Text")]
    pub keywords: String,

    #[sea_orm(column_type = "Text")]
    pub auto_title: String,

    #[sea_orm(column_type = "Text")]
    pub document_type: String,

    #[sea_orm(column_type = "Text")]
    pub language: String,
}

impl Model {
    /// First 500 characters of the extracted text followed by an ellipsis
    pub fn text_preview(&self) -> Option<String> {
        if self.extracted_text.is_empty() {
            return None;
        }
        let head: String = self.extracted_text.chars().take(500).collect();
        Some(format!("{}...", head))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
