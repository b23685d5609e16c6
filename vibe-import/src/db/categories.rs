//! Category persistence
//!
//! The category tree is owned by the library UI; the pipeline only consumes
//! category ids. Re-parenting walks the ancestor chain to keep the tree
//! acyclic.

use crate::models::Category;
use chrono::DateTime;
use chrono::Utc;
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;
use vibe_common::{Error, Result};

/// Insert a new category
pub async fn save_category(pool: &SqlitePool, category: &Category) -> Result<()> {
    sqlx::query("INSERT INTO categories (guid, name, parent_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(category.id.to_string())
        .bind(&category.name)
        .bind(category.parent_id.map(|p| p.to_string()))
        .bind(category.created_at.timestamp())
        .execute(pool)
        .await?;
    Ok(())
}

/// Load all categories
pub async fn get_all_categories(pool: &SqlitePool) -> Result<Vec<Category>> {
    let rows = sqlx::query("SELECT guid, name, parent_id, created_at FROM categories")
        .fetch_all(pool)
        .await?;

    let mut categories = Vec::with_capacity(rows.len());
    for row in &rows {
        let id = Uuid::parse_str(&row.get::<String, _>("guid"))
            .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))?;
        let parent_id = row
            .get::<Option<String>, _>("parent_id")
            .map(|s| {
                Uuid::parse_str(&s)
                    .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
            })
            .transpose()?;

        categories.push(Category {
            id,
            name: row.get("name"),
            parent_id,
            created_at: DateTime::from_timestamp(row.get::<i64, _>("created_at"), 0)
                .unwrap_or_else(Utc::now),
        });
    }

    Ok(categories)
}

/// Re-parent a category, rejecting moves that would create a cycle
pub async fn set_parent(
    pool: &SqlitePool,
    category_id: Uuid,
    new_parent: Option<Uuid>,
) -> Result<()> {
    if let Some(parent) = new_parent {
        if parent == category_id {
            return Err(Error::InvalidInput(
                "Category cannot be its own parent".to_string(),
            ));
        }

        // Walk up from the proposed parent; hitting ourselves means a cycle
        let categories = get_all_categories(pool).await?;
        let parents: HashMap<Uuid, Option<Uuid>> =
            categories.iter().map(|c| (c.id, c.parent_id)).collect();

        if !parents.contains_key(&parent) {
            return Err(Error::NotFound(format!("Category {}", parent)));
        }

        let mut cursor = Some(parent);
        while let Some(current) = cursor {
            if current == category_id {
                return Err(Error::InvalidInput(
                    "Move would create a category cycle".to_string(),
                ));
            }
            cursor = parents.get(&current).copied().flatten();
        }
    }

    let result = sqlx::query("UPDATE categories SET parent_id = ? WHERE guid = ?")
        .bind(new_parent.map(|p| p.to_string()))
        .bind(category_id.to_string())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound(format!("Category {}", category_id)));
    }
    Ok(())
}
