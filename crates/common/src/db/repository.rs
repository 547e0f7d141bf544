//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations
//! with proper error handling. Every content query is scoped by owner.

use crate::errors::{AppError, Result};
use crate::db::DbPool;
use crate::db::models::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    Set, SqlErr,
};

/// Fields for a new content record, produced by the ingestion pipeline
#[derive(Debug, Clone, Default)]
pub struct NewContent {
    pub user_id: Option<i32>,
    pub original_file: Option<String>,
    pub original_text: Option<String>,
    pub summary_length: String,
    pub extracted_text: String,
    pub summary: String,
    pub keywords: String,
    pub auto_title: String,
    pub document_type: String,
    pub language: String,
}

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.connection()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // User Operations
    // ========================================================================

    /// Create a new user; the password must already be hashed
    pub async fn create_user(
        &self,
        username: String,
        email: String,
        password_hash: String,
    ) -> Result<User> {
        let user = UserActiveModel {
            username: Set(username.clone()),
            email: Set(email),
            password_hash: Set(password_hash),
            date_joined: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        user.insert(self.conn()).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateUsername { username },
            _ => e.into(),
        })
    }

    /// Find user by ID
    pub async fn find_user_by_id(&self, id: i32) -> Result<Option<User>> {
        UserEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Find user by username
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        UserEntity::find()
            .filter(UserColumn::Username.eq(username))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Content Operations
    // ========================================================================

    /// Persist a fully processed content record
    pub async fn create_content(&self, new: NewContent) -> Result<Content> {
        let content = ContentActiveModel {
            user_id: Set(new.user_id),
            original_file: Set(new.original_file),
            original_text: Set(new.original_text),
            summary_length: Set(new.summary_length),
            created_at: Set(chrono::Utc::now().into()),
            extracted_text: Set(new.extracted_text),
            summary: Set(new.summary),
            keywords: Set(new.keywords),
            auto_title: Set(new.auto_title),
            document_type: Set(new.document_type),
            language: Set(new.language),
            ..Default::default()
        };

        content.insert(self.conn()).await.map_err(Into::into)
    }

    /// Find a content record owned by the given user
    ///
    /// Records of other users are indistinguishable from missing ones.
    pub async fn find_content_for_user(&self, id: i32, user_id: i32) -> Result<Option<Content>> {
        ContentEntity::find_by_id(id)
            .filter(ContentColumn::UserId.eq(user_id))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// List a user's content records, newest first
    pub async fn list_contents_for_user(&self, user_id: i32) -> Result<Vec<Content>> {
        ContentEntity::find()
            .filter(ContentColumn::UserId.eq(user_id))
            .order_by_desc(ContentColumn::CreatedAt)
            .order_by_desc(ContentColumn::Id)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Delete content by ID
    pub async fn delete_content(&self, id: i32) -> Result<bool> {
        let result = ContentEntity::delete_by_id(id)
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }
}
