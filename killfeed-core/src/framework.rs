use sqlx::PgPool;

/// Executes the database queries defined in [`crate::entities`].
///
/// Each query is a plain struct with a `kanau::processor::Processor` impl
/// on this type, so callers only ever hold a pool.
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}
