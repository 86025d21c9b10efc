use crate::entities::{EventDocument, EventId};
use crate::framework::DatabaseProcessor;
use kanau::processor::Processor;
use sqlx::types::Json;

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    document: Json<EventDocument>,
}

#[derive(Debug, Clone)]
/// Insert an event, or merge it into the stored document with the same id.
///
/// The merge is shallow (`jsonb ||`): top-level fields of the new document
/// replace the stored ones, so ingesting the same document twice is a no-op.
/// Only a string `TimeStamp` becomes the sort key; any other value sorts
/// with the documents that have none.
pub struct UpsertEvent {
    pub event_id: EventId,
    pub document: EventDocument,
}

impl Processor<UpsertEvent> for DatabaseProcessor {
    type Output = ();
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:UpsertEvent")]
    async fn process(&self, upsert: UpsertEvent) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO events (event_id, time_stamp, document)
            VALUES (
                $1,
                CASE WHEN jsonb_typeof($2::jsonb->'TimeStamp') = 'string'
                    THEN $2::jsonb->>'TimeStamp' END,
                $2::jsonb
            )
            ON CONFLICT (event_id) DO UPDATE SET
                document = events.document || EXCLUDED.document,
                time_stamp = CASE
                    WHEN jsonb_typeof((events.document || EXCLUDED.document)->'TimeStamp') = 'string'
                    THEN (events.document || EXCLUDED.document)->>'TimeStamp'
                END,
                updated_at = now()
            "#,
        )
        .bind(upsert.event_id.0)
        .bind(Json(&upsert.document))
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
/// Most recent events by `TimeStamp`, newest first.
///
/// `TimeStamp` is compared as stored (ISO-8601 text sorts chronologically);
/// documents without one sort last.
pub struct GetRecentEvents {
    pub limit: i64,
}

impl Processor<GetRecentEvents> for DatabaseProcessor {
    type Output = Vec<EventDocument>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetRecentEvents")]
    async fn process(&self, query: GetRecentEvents) -> Result<Vec<EventDocument>, sqlx::Error> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT document
            FROM events
            ORDER BY time_stamp DESC NULLS LAST, event_id DESC
            LIMIT $1
            "#,
        )
        .bind(query.limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.document.0).collect())
    }
}

#[derive(Debug, Clone)]
/// All stored documents with the given id (zero or one).
pub struct GetEventsById {
    pub event_id: EventId,
}

impl Processor<GetEventsById> for DatabaseProcessor {
    type Output = Vec<EventDocument>;
    type Error = sqlx::Error;
    #[tracing::instrument(skip_all, err, name = "SQL:GetEventsById")]
    async fn process(&self, query: GetEventsById) -> Result<Vec<EventDocument>, sqlx::Error> {
        let rows = sqlx::query_as::<_, EventRow>(
            r#"
            SELECT document
            FROM events
            WHERE event_id = $1
            "#,
        )
        .bind(query.event_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|row| row.document.0).collect())
    }
}
