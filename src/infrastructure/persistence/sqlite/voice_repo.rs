//! SQLite Voice Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection};
use std::path::PathBuf;

use super::DbPool;
use crate::application::ports::{
    NewVoice, RepositoryError, VoiceChanges, VoiceFilter, VoiceRecord, VoiceRepositoryPort,
};
use crate::domain::voice::{Gender, VoiceId};

const VOICE_COLUMNS: &str = "id, name, description, language, gender, file_path, \
    is_default, is_active, embedding_path, owner_id, created_at, updated_at";

/// SQLite Voice Repository
pub struct SqliteVoiceRepository {
    pool: DbPool,
}

impl SqliteVoiceRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct VoiceRow {
    id: i64,
    name: String,
    description: Option<String>,
    language: String,
    gender: String,
    file_path: String,
    is_default: bool,
    is_active: bool,
    embedding_path: Option<String>,
    owner_id: Option<i64>,
    created_at: String,
    updated_at: String,
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

fn path_to_string(path: &PathBuf) -> String {
    path.to_string_lossy().to_string()
}

impl TryFrom<VoiceRow> for VoiceRecord {
    type Error = RepositoryError;

    fn try_from(row: VoiceRow) -> Result<Self, Self::Error> {
        Ok(VoiceRecord {
            id: VoiceId::new(row.id),
            name: row.name,
            description: row.description,
            language: row.language,
            gender: row
                .gender
                .parse::<Gender>()
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            file_path: PathBuf::from(row.file_path),
            embedding_path: row.embedding_path.map(PathBuf::from),
            is_default: row.is_default,
            is_active: row.is_active,
            owner_id: row.owner_id,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl VoiceRepositoryPort for SqliteVoiceRepository {
    async fn get(&self, id: VoiceId) -> Result<Option<VoiceRecord>, RepositoryError> {
        let sql = format!("SELECT {} FROM voices WHERE id = ?", VOICE_COLUMNS);
        let row: Option<VoiceRow> = sqlx::query_as(&sql)
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(VoiceRecord::try_from).transpose()
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<VoiceRecord>, RepositoryError> {
        let sql = format!(
            "SELECT {} FROM voices WHERE name = ? ORDER BY id ASC LIMIT 1",
            VOICE_COLUMNS
        );
        let row: Option<VoiceRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(VoiceRecord::try_from).transpose()
    }

    async fn list_active(&self, filter: &VoiceFilter) -> Result<Vec<VoiceRecord>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT {} FROM voices
            WHERE is_active = 1
              AND (?1 IS NULL OR language = ?1)
              AND (?2 IS NULL OR gender = ?2)
            ORDER BY id ASC
            "#,
            VOICE_COLUMNS
        );
        let rows: Vec<VoiceRow> = sqlx::query_as(&sql)
            .bind(filter.language.as_deref())
            .bind(filter.gender.map(|g| g.as_str()))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        rows.into_iter().map(VoiceRecord::try_from).collect()
    }

    async fn get_default(
        &self,
        language: &str,
        gender: Gender,
    ) -> Result<Option<VoiceRecord>, RepositoryError> {
        let sql = format!(
            r#"
            SELECT {} FROM voices
            WHERE language = ? AND gender = ? AND is_default = 1 AND is_active = 1
            ORDER BY id ASC
            LIMIT 2
            "#,
            VOICE_COLUMNS
        );
        let rows: Vec<VoiceRow> = sqlx::query_as(&sql)
            .bind(language)
            .bind(gender.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        if rows.len() > 1 {
            tracing::error!(
                language = %language,
                gender = %gender,
                "Consistency fault: multiple default voices"
            );
        }

        rows.into_iter().next().map(VoiceRecord::try_from).transpose()
    }

    async fn create(&self, voice: NewVoice) -> Result<VoiceRecord, RepositoryError> {
        let now = Utc::now().to_rfc3339();
        let sql = format!(
            r#"
            INSERT INTO voices (name, description, language, gender, file_path,
                is_default, is_active, embedding_path, owner_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?, ?, ?)
            RETURNING {}
            "#,
            VOICE_COLUMNS
        );
        let row: VoiceRow = sqlx::query_as(&sql)
            .bind(&voice.name)
            .bind(&voice.description)
            .bind(&voice.language)
            .bind(voice.gender.as_str())
            .bind(path_to_string(&voice.file_path))
            .bind(voice.is_active)
            .bind(voice.embedding_path.as_ref().map(path_to_string))
            .bind(voice.owner_id)
            .bind(&now)
            .bind(&now)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        VoiceRecord::try_from(row)
    }

    async fn update(
        &self,
        id: VoiceId,
        changes: &VoiceChanges,
    ) -> Result<Option<VoiceRecord>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let select = format!("SELECT {} FROM voices WHERE id = ?", VOICE_COLUMNS);
        let row: Option<VoiceRow> = sqlx::query_as(&select)
            .bind(id.as_i64())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut voice = VoiceRecord::try_from(row)?;
        let (language, gender) = (voice.language.clone(), voice.gender);
        changes.apply_to(&mut voice);
        // 默认标记不随记录迁移到其他 (语言, 性别)
        if !voice.matches(&language, gender) {
            voice.is_default = false;
        }
        voice.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE voices SET
                name = ?, description = ?, language = ?, gender = ?, file_path = ?,
                is_default = ?, is_active = ?, embedding_path = ?, owner_id = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&voice.name)
        .bind(&voice.description)
        .bind(&voice.language)
        .bind(voice.gender.as_str())
        .bind(path_to_string(&voice.file_path))
        .bind(voice.is_default)
        .bind(voice.is_active)
        .bind(voice.embedding_path.as_ref().map(path_to_string))
        .bind(voice.owner_id)
        .bind(voice.updated_at.to_rfc3339())
        .bind(id.as_i64())
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        Ok(Some(voice))
    }

    async fn delete(&self, id: VoiceId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM voices WHERE id = ?")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_default_flags(
        &self,
        language: &str,
        gender: Gender,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        clear_flags(&mut conn, language, gender).await
    }

    async fn mark_default(
        &self,
        id: VoiceId,
        language: &str,
        gender: Gender,
    ) -> Result<Option<VoiceRecord>, RepositoryError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        mark_flag(&mut conn, id, language, gender).await
    }

    async fn replace_default(
        &self,
        id: VoiceId,
        language: &str,
        gender: Gender,
    ) -> Result<Option<VoiceRecord>, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        clear_flags(&mut tx, language, gender).await?;
        let promoted = mark_flag(&mut tx, id, language, gender).await?;

        // 拒绝时同样提交：清除不回滚
        tx.commit().await.map_err(db_error)?;

        Ok(promoted)
    }
}

async fn clear_flags(
    conn: &mut SqliteConnection,
    language: &str,
    gender: Gender,
) -> Result<(), RepositoryError> {
    let result = sqlx::query(
        r#"
        UPDATE voices SET is_default = 0, updated_at = ?
        WHERE language = ? AND gender = ? AND is_default = 1
        "#,
    )
    .bind(Utc::now().to_rfc3339())
    .bind(language)
    .bind(gender.as_str())
    .execute(&mut *conn)
    .await
    .map_err(db_error)?;

    tracing::debug!(
        language = %language,
        gender = %gender,
        cleared = result.rows_affected(),
        "Default flags cleared"
    );

    Ok(())
}

/// 只有仍属于 (语言, 性别) 的记录会被标记
async fn mark_flag(
    conn: &mut SqliteConnection,
    id: VoiceId,
    language: &str,
    gender: Gender,
) -> Result<Option<VoiceRecord>, RepositoryError> {
    let sql = format!(
        "UPDATE voices SET is_default = 1, updated_at = ? \
         WHERE id = ? AND language = ? AND gender = ? RETURNING {}",
        VOICE_COLUMNS
    );
    let row: Option<VoiceRow> = sqlx::query_as(&sql)
        .bind(Utc::now().to_rfc3339())
        .bind(id.as_i64())
        .bind(language)
        .bind(gender.as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_error)?;

    row.map(VoiceRecord::try_from).transpose()
}
