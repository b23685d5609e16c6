//! Entry persistence
//!
//! Implements `VibeRepository` against the SQLite schema created by
//! `vibe_common::db`. Entries and their references are written in one
//! transaction so a failed save never leaves a half-persisted bundle.

use crate::models::VibeLibraryEntry;
use crate::repo::VibeRepository;
use crate::types::{SourceType, VibeReference};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;
use vibe_common::{Error, Result};

/// SQLite implementation of the entry store
#[derive(Clone)]
pub struct SqliteVibeRepository {
    pool: SqlitePool,
}

impl SqliteVibeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn entry_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<VibeLibraryEntry> {
        let id = parse_uuid(&row.get::<String, _>("guid"))?;
        let category_id = row
            .get::<Option<String>, _>("category_id")
            .map(|s| parse_uuid(&s))
            .transpose()?;

        Ok(VibeLibraryEntry {
            id,
            name: row.get("name"),
            category_id,
            is_favorite: row.get::<i64, _>("is_favorite") != 0,
            created_at: timestamp_from_secs(row.get::<i64, _>("created_at")),
            last_used: row.get::<Option<i64>, _>("last_used").map(timestamp_from_secs),
            used_count: row.get("used_count"),
            references: Vec::new(),
        })
    }

    fn reference_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<VibeReference> {
        let source_type_str: String = row.get("source_type");
        let source_type = SourceType::parse(&source_type_str).ok_or_else(|| {
            Error::Internal(format!("Unknown source type in database: {}", source_type_str))
        })?;

        Ok(VibeReference {
            display_name: row.get("display_name"),
            encoding: row.get("encoding"),
            strength: row.get::<f64, _>("strength") as f32,
            info_extracted: row.get::<f64, _>("info_extracted") as f32,
            source_type,
            thumbnail: row.get("thumbnail"),
            raw_image: row.get("raw_image"),
        })
    }
}

#[async_trait]
impl VibeRepository for SqliteVibeRepository {
    async fn get_all_entries(&self) -> Result<Vec<VibeLibraryEntry>> {
        let entry_rows = sqlx::query(
            "SELECT guid, name, category_id, is_favorite, created_at, last_used, used_count
             FROM entries ORDER BY created_at, guid",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries = Vec::with_capacity(entry_rows.len());
        let mut by_id: HashMap<Uuid, usize> = HashMap::new();

        for row in &entry_rows {
            let entry = Self::entry_from_row(row)?;
            by_id.insert(entry.id, entries.len());
            entries.push(entry);
        }

        let reference_rows = sqlx::query(
            "SELECT entry_id, display_name, encoding, strength, info_extracted,
                    source_type, thumbnail, raw_image
             FROM vibe_references ORDER BY entry_id, position",
        )
        .fetch_all(&self.pool)
        .await?;

        for row in &reference_rows {
            let entry_id = parse_uuid(&row.get::<String, _>("entry_id"))?;
            if let Some(&idx) = by_id.get(&entry_id) {
                entries[idx].references.push(Self::reference_from_row(row)?);
            }
        }

        Ok(entries)
    }

    async fn entry_names(&self) -> Result<Vec<String>> {
        let rows = sqlx::query_scalar::<_, String>("SELECT name FROM entries")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn save_entry(&self, entry: &VibeLibraryEntry) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO entries
                 (guid, name, category_id, is_favorite, created_at, last_used, used_count)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(&entry.name)
        .bind(entry.category_id.map(|id| id.to_string()))
        .bind(entry.is_favorite as i64)
        .bind(entry.created_at.timestamp())
        .bind(entry.last_used.map(|t| t.timestamp()))
        .bind(entry.used_count)
        .execute(&mut *tx)
        .await?;

        for (position, reference) in entry.references.iter().enumerate() {
            sqlx::query(
                "INSERT INTO vibe_references
                     (guid, entry_id, position, display_name, encoding, encoding_digest,
                      strength, info_extracted, source_type, thumbnail, raw_image)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(entry.id.to_string())
            .bind(position as i64)
            .bind(&reference.display_name)
            .bind(&reference.encoding)
            .bind(reference.encoding_digest())
            .bind(reference.strength as f64)
            .bind(reference.info_extracted as f64)
            .bind(reference.source_type.as_str())
            .bind(reference.thumbnail.as_deref())
            .bind(reference.raw_image.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(
            entry_id = %entry.id,
            name = %entry.name,
            references = entry.references.len(),
            "Entry saved"
        );

        Ok(())
    }

    async fn delete_entry(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM entries WHERE guid = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Entry {}", id)));
        }
        Ok(())
    }

    async fn rename_entry(&self, id: Uuid, name: &str) -> Result<()> {
        let result = sqlx::query("UPDATE entries SET name = ? WHERE guid = ?")
            .bind(name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Entry {}", id)));
        }
        Ok(())
    }

    async fn set_category(&self, id: Uuid, category_id: Option<Uuid>) -> Result<()> {
        let result = sqlx::query("UPDATE entries SET category_id = ? WHERE guid = ?")
            .bind(category_id.map(|c| c.to_string()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Entry {}", id)));
        }
        Ok(())
    }

    async fn set_favorite(&self, id: Uuid, favorite: bool) -> Result<()> {
        let result = sqlx::query("UPDATE entries SET is_favorite = ? WHERE guid = ?")
            .bind(favorite as i64)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Entry {}", id)));
        }
        Ok(())
    }

    async fn record_use(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            "UPDATE entries SET used_count = used_count + 1, last_used = ? WHERE guid = ?",
        )
        .bind(Utc::now().timestamp())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Entry {}", id)));
        }
        Ok(())
    }
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
}

fn timestamp_from_secs(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}
