use crate::entities::users;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema,
};
use std::time::Duration;
use tracing::info;

pub async fn setup_database(database_url: &str) -> anyhow::Result<DatabaseConnection> {
    info!("📂 Database: {}", database_url);

    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(100)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(30))
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .sqlx_logging(true)
        .sqlx_logging_level(log::LevelFilter::Debug);

    let db = Database::connect(opt).await?;

    info!("✅ Database connected successfully");

    run_migrations(&db, database_url).await?;

    Ok(db)
}

pub async fn run_migrations(db: &DatabaseConnection, database_url: &str) -> anyhow::Result<()> {
    if db.get_database_backend() == DbBackend::Postgres {
        info!("🔄 Running SQLx migrations for PostgreSQL...");
        let pool = sqlx::PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
    } else {
        info!("🔄 Running SeaORM auto-migrations for SQLite...");
        let builder = db.get_database_backend();
        let schema = Schema::new(builder);

        let stmt = schema
            .create_table_from_entity(users::Entity)
            .if_not_exists()
            .to_owned();
        db.execute(builder.build(&stmt)).await?;
    }

    Ok(())
}
