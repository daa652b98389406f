use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Set up an in-memory SQLite database with the schema applied. A single
/// connection keeps the whole test on one memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options.max_connections(1);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Serve an axum router on an ephemeral local port, returning its base URL.
/// Used to stand in for the external providers.
pub async fn spawn_mock_provider(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock provider");
    let addr = listener
        .local_addr()
        .expect("Mock provider has no local address");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Mock provider stopped");
    });

    format!("http://{}", addr)
}
