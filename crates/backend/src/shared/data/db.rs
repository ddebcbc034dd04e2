use once_cell::sync::OnceCell;
use sea_orm::{Database, DatabaseConnection};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// `sqlite://` URL для файла; на Windows путь получает ведущий `/`
pub fn build_sqlite_url(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Подключение к файлу базы; схему создают миграции (см. `migration_runner`)
pub async fn connect(db_path: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_path.is_absolute() {
        db_path.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_path)
    };
    Ok(Database::connect(&build_sqlite_url(&absolute_path)).await?)
}

pub async fn initialize_database(db_path: &Path) -> anyhow::Result<()> {
    let conn = connect(db_path).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}

/// Отдельная мигрированная база во временном каталоге для одного теста
#[cfg(test)]
pub async fn test_database() -> DatabaseConnection {
    let path = std::env::temp_dir()
        .join(format!("salesforce_connector_{}.db", uuid::Uuid::new_v4()));
    super::migration_runner::run_migrations(&path).await.unwrap();
    connect(&path).await.unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_url_forms() {
        assert_eq!(
            build_sqlite_url(Path::new("/var/db/app.db")),
            "sqlite:///var/db/app.db?mode=rwc"
        );
        assert_eq!(
            build_sqlite_url(Path::new("C:\\data\\app.db")),
            "sqlite:///C:/data/app.db?mode=rwc"
        );
    }
}
