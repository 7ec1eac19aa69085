//! PostgreSQL-backed document store: one JSONB row per record.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};

use super::{clean_fields, new_id, Batch, DocumentStore, Fields, Record, StoreResult, Write};

const UPSERT_SQL: &str = r#"
    INSERT INTO documents (collection, id, body)
    VALUES ($1, $2, $3)
    ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body
"#;

// A null inside the patch removes the field.
const MERGE_SQL: &str = r#"
    INSERT INTO documents (collection, id, body)
    VALUES ($1, $2, jsonb_strip_nulls($3::jsonb))
    ON CONFLICT (collection, id) DO UPDATE SET body = jsonb_strip_nulls(documents.body || $3::jsonb)
"#;

const DELETE_SQL: &str = "DELETE FROM documents WHERE collection = $1 AND id = $2";

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `documents` table if needed.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

async fn apply_write<'e, E>(executor: E, write: &Write) -> StoreResult<()>
where
    E: PgExecutor<'e>,
{
    match write {
        Write::Set { collection, id, fields } => {
            sqlx::query(UPSERT_SQL)
                .bind(collection)
                .bind(id)
                .bind(Json(clean_fields(fields.clone())))
                .execute(executor)
                .await?;
        }
        Write::Update { collection, id, fields } => {
            let mut patch = fields.clone();
            patch.remove("id");
            sqlx::query(MERGE_SQL)
                .bind(collection)
                .bind(id)
                .bind(Json(patch))
                .execute(executor)
                .await?;
        }
        Write::Delete { collection, id } => {
            sqlx::query(DELETE_SQL)
                .bind(collection)
                .bind(id)
                .execute(executor)
                .await?;
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn create_data(&self, collection: &str, fields: Fields) -> StoreResult<Record> {
        let id = new_id();
        self.set_data(collection, &id, fields).await
    }

    async fn set_data(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<Record> {
        let fields = clean_fields(fields);
        let write = Write::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            fields: fields.clone(),
        };
        apply_write(&self.pool, &write).await?;
        Ok(Record::new(id, fields))
    }

    async fn get_all_data(&self, collection: &str) -> StoreResult<Vec<Record>> {
        let rows = sqlx::query_as::<_, (String, Json<Fields>)>(
            "SELECT id, body FROM documents WHERE collection = $1 ORDER BY inserted_at, id",
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, Json(fields))| Record::new(id, fields))
            .collect())
    }

    async fn get_data_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Record>> {
        let row = sqlx::query_as::<_, (Json<Fields>,)>(
            "SELECT body FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(Json(fields),)| Record::new(id, fields)))
    }

    async fn update_data(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        let write = Write::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        };
        apply_write(&self.pool, &write).await
    }

    async fn delete_data(&self, collection: &str, id: &str) -> StoreResult<()> {
        let write = Write::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        };
        apply_write(&self.pool, &write).await
    }

    async fn commit(&self, batch: Batch) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        // Row locks make concurrent batches on the same records serialize here.
        for pre in &batch.preconditions {
            let row = sqlx::query_as::<_, (Json<Fields>,)>(
                "SELECT body FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
            )
            .bind(&pre.collection)
            .bind(&pre.id)
            .fetch_optional(&mut *tx)
            .await?;

            let current = row.map(|(Json(fields),)| fields);
            if !pre.holds(current.as_ref()) {
                tx.rollback().await?;
                return Err(pre.conflict());
            }
        }

        for write in &batch.writes {
            apply_write(&mut *tx, write).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
