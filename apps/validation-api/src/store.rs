//! SQLite-backed asset store
//!
//! Ids and timestamps are stored as TEXT (uuid hyphenated, RFC 3339).
//! JSON-shaped fields (persona attributes, taglines, outline body) are
//! stored as serialized text.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{AssetId, BlogOutline, Messaging, Persona, Script, ScriptSections};
use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Decode, Row, Type};
use uuid::Uuid;
use validation_core::{AssetLookup, LookupError};

#[derive(Clone)]
pub struct SqliteAssetStore {
    pool: SqlitePool,
}

impl SqliteAssetStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        tracing::info!("Connecting to database: {}", database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database. Pinned to one connection that never
    /// expires, since each SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self> {
        Self::run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS personas (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                product TEXT NOT NULL,
                audience TEXT NOT NULL,
                attributes_json TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messagings (
                id TEXT PRIMARY KEY,
                persona_id TEXT NOT NULL,
                headline TEXT NOT NULL,
                elevator_pitch TEXT NOT NULL,
                viral_taglines_json TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        // hook/body/cta are NULL on rows written before scripts were
        // structured; those are parsed from `content` on load.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS scripts (
                id TEXT PRIMARY KEY,
                persona_id TEXT NOT NULL,
                messaging_id TEXT,
                platform TEXT NOT NULL,
                hook TEXT,
                body TEXT,
                cta TEXT,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blog_outlines (
                id TEXT PRIMARY KEY,
                persona_id TEXT NOT NULL,
                messaging_id TEXT,
                title TEXT NOT NULL,
                outline_json TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        for (table, column) in [
            ("messagings", "persona_id"),
            ("scripts", "persona_id"),
            ("blog_outlines", "persona_id"),
        ] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS idx_{table}_{column} ON {table}({column})"
            ))
            .execute(pool)
            .await?;
        }

        tracing::info!("Migrations complete");
        Ok(())
    }

    pub async fn insert_persona(&self, persona: &Persona) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO personas (id, name, product, audience, attributes_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(persona.id.to_string())
        .bind(&persona.name)
        .bind(&persona.product)
        .bind(&persona.audience)
        .bind(persona.attributes.to_string())
        .bind(persona.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_messaging(&self, messaging: &Messaging) -> sqlx::Result<()> {
        let taglines = serde_json::to_string(&messaging.viral_taglines)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query(
            r#"
            INSERT INTO messagings (id, persona_id, headline, elevator_pitch, viral_taglines_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(messaging.id.to_string())
        .bind(messaging.persona_id.to_string())
        .bind(&messaging.headline)
        .bind(&messaging.elevator_pitch)
        .bind(taglines)
        .bind(messaging.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_script(&self, script: &Script) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scripts (id, persona_id, messaging_id, platform, hook, body, cta, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(script.id.to_string())
        .bind(script.persona_id.to_string())
        .bind(script.messaging_id.map(|id| id.to_string()))
        .bind(&script.platform)
        .bind(&script.sections.hook)
        .bind(&script.sections.body)
        .bind(&script.sections.cta)
        .bind(script.content())
        .bind(script.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Insert a script in the flattened-only format older generators wrote.
    pub async fn insert_legacy_script(
        &self,
        id: AssetId,
        persona_id: AssetId,
        messaging_id: Option<AssetId>,
        platform: &str,
        content: &str,
    ) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO scripts (id, persona_id, messaging_id, platform, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(persona_id.to_string())
        .bind(messaging_id.map(|id| id.to_string()))
        .bind(platform)
        .bind(content)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert_blog_outline(&self, outline: &BlogOutline) -> sqlx::Result<()> {
        let body = serde_json::to_string(&outline.outline)
            .map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        sqlx::query(
            r#"
            INSERT INTO blog_outlines (id, persona_id, messaging_id, title, outline_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(outline.id.to_string())
        .bind(outline.persona_id.to_string())
        .bind(outline.messaging_id.map(|id| id.to_string()))
        .bind(&outline.title)
        .bind(body)
        .bind(outline.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn fetch_row(&self, sql: &str, id: AssetId) -> Result<Option<SqliteRow>, LookupError> {
        sqlx::query(sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| LookupError::Storage(e.to_string()))
    }
}

fn corrupt(id: AssetId, reason: impl ToString) -> LookupError {
    LookupError::Corrupt {
        id,
        reason: reason.to_string(),
    }
}

fn column<'r, T>(row: &'r SqliteRow, name: &str, id: AssetId) -> Result<T, LookupError>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    row.try_get(name).map_err(|e| corrupt(id, e))
}

fn uuid_column(row: &SqliteRow, name: &str, id: AssetId) -> Result<AssetId, LookupError> {
    let raw: String = column(row, name, id)?;
    Uuid::parse_str(&raw).map_err(|e| corrupt(id, format!("{}: {}", name, e)))
}

fn optional_uuid_column(
    row: &SqliteRow,
    name: &str,
    id: AssetId,
) -> Result<Option<AssetId>, LookupError> {
    let raw: Option<String> = column(row, name, id)?;
    raw.map(|raw| Uuid::parse_str(&raw).map_err(|e| corrupt(id, format!("{}: {}", name, e))))
        .transpose()
}

fn timestamp_column(row: &SqliteRow, id: AssetId) -> Result<DateTime<Utc>, LookupError> {
    let raw: String = column(row, "created_at", id)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| corrupt(id, format!("created_at: {}", e)))
}

fn json_column<T: serde::de::DeserializeOwned>(
    row: &SqliteRow,
    name: &str,
    id: AssetId,
) -> Result<T, LookupError> {
    let raw: String = column(row, name, id)?;
    serde_json::from_str(&raw).map_err(|e| corrupt(id, format!("{}: {}", name, e)))
}

fn script_sections(row: &SqliteRow, id: AssetId) -> Result<ScriptSections, LookupError> {
    let hook: Option<String> = column(row, "hook", id)?;
    let body: Option<String> = column(row, "body", id)?;
    let cta: Option<String> = column(row, "cta", id)?;

    if hook.is_none() && body.is_none() && cta.is_none() {
        let content: String = column(row, "content", id)?;
        return Ok(ScriptSections::parse_labeled(&content));
    }

    Ok(ScriptSections::new(
        hook.unwrap_or_default(),
        body.unwrap_or_default(),
        cta.unwrap_or_default(),
    ))
}

#[async_trait]
impl AssetLookup for SqliteAssetStore {
    async fn persona(&self, id: AssetId) -> Result<Option<Persona>, LookupError> {
        let Some(row) = self
            .fetch_row("SELECT * FROM personas WHERE id = ?", id)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(Persona {
            id,
            name: column(&row, "name", id)?,
            product: column(&row, "product", id)?,
            audience: column(&row, "audience", id)?,
            attributes: json_column(&row, "attributes_json", id)?,
            created_at: timestamp_column(&row, id)?,
        }))
    }

    async fn messaging(&self, id: AssetId) -> Result<Option<Messaging>, LookupError> {
        let Some(row) = self
            .fetch_row("SELECT * FROM messagings WHERE id = ?", id)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(Messaging {
            id,
            persona_id: uuid_column(&row, "persona_id", id)?,
            headline: column(&row, "headline", id)?,
            elevator_pitch: column(&row, "elevator_pitch", id)?,
            viral_taglines: json_column(&row, "viral_taglines_json", id)?,
            created_at: timestamp_column(&row, id)?,
        }))
    }

    async fn script(&self, id: AssetId) -> Result<Option<Script>, LookupError> {
        let Some(row) = self
            .fetch_row("SELECT * FROM scripts WHERE id = ?", id)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(Script {
            id,
            persona_id: uuid_column(&row, "persona_id", id)?,
            messaging_id: optional_uuid_column(&row, "messaging_id", id)?,
            platform: column(&row, "platform", id)?,
            sections: script_sections(&row, id)?,
            created_at: timestamp_column(&row, id)?,
        }))
    }

    async fn blog_outline(&self, id: AssetId) -> Result<Option<BlogOutline>, LookupError> {
        let Some(row) = self
            .fetch_row("SELECT * FROM blog_outlines WHERE id = ?", id)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(BlogOutline {
            id,
            persona_id: uuid_column(&row, "persona_id", id)?,
            messaging_id: optional_uuid_column(&row, "messaging_id", id)?,
            title: column(&row, "title", id)?,
            outline: json_column(&row, "outline_json", id)?,
            created_at: timestamp_column(&row, id)?,
        }))
    }
}
