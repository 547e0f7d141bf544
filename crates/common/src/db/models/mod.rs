//! SeaORM entity models
//!
//! Database entities for Precis

mod content;
mod user;

pub use content::{
    Entity as ContentEntity,
    Model as Content,
    ActiveModel as ContentActiveModel,
    Column as ContentColumn,
    DEFAULT_SUMMARY_LENGTH,
};

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
};
