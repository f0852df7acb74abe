//! One-shot admin bootstrap: creates the account or promotes an existing one.
//!
//! Usage: create-admin <id> <email> <password>

use sqlx::sqlite::SqlitePoolOptions;

use daykeep::auth;
use daykeep::db::repository;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let [_, id, email, password] = args.as_slice() else {
        eprintln!("usage: create-admin <id> <email> <password>");
        std::process::exit(2);
    };

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://daykeep.db".to_string());
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    match repository::find_user(&pool, id).await? {
        Some(_) => {
            sqlx::query("UPDATE users SET is_admin = 1 WHERE id = ?")
                .bind(id)
                .execute(&pool)
                .await?;
            println!("promoted existing user {id} to admin");
        }
        None => {
            let hash = auth::hash_password(password.clone()).await?;
            repository::insert_user(&pool, id, email, &hash).await?;
            sqlx::query("UPDATE users SET is_admin = 1 WHERE id = ?")
                .bind(id)
                .execute(&pool)
                .await?;
            println!("created admin user {id}");
        }
    }

    Ok(())
}
