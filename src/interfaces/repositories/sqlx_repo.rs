use sqlx::PgPool;

#[derive(Clone)]
pub struct SqlxContactRepo {
    pub pool: PgPool,
}
