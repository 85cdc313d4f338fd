use sqlx::FromRow;

/// Database model for tag. Names are unique case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Tag {
    pub id: i32,
    pub name: String,
}
