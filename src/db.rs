use sqlx::postgres::PgPoolOptions;

#[derive(Clone)]
pub struct Database {
    pub pool: sqlx::PgPool,
}

impl Database {
    pub async fn connect(pg_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(pg_url)
            .await?;

        Ok(Database { pool })
    }

    /// Creates the tables if they are missing.
    pub async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::raw_sql(crate::schema::SCHEMA).execute(&self.pool).await?;
        Ok(())
    }
}
