use sqlx::{Error, SqlitePool};

const STATEMENTS: [&str; 4] = [
	r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            token_hash TEXT NOT NULL UNIQUE,
            is_superuser BOOLEAN NOT NULL DEFAULT 0,
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
	r#"
        CREATE TABLE IF NOT EXISTS mood_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date DATE NOT NULL,
            score INTEGER NOT NULL CHECK (score BETWEEN -4 AND 4),
            note TEXT NOT NULL DEFAULT '' CHECK (length(note) <= 280),
            created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CONSTRAINT unique_mood_per_user_per_date UNIQUE (user_id, date)
        )
        "#,
	"CREATE INDEX IF NOT EXISTS idx_user_date ON mood_entries(user_id, date)",
	"CREATE INDEX IF NOT EXISTS idx_mood_entries_date ON mood_entries(date)",
];

pub async fn init_schema(pool: &SqlitePool) -> Result<(), Error> {
	for statement in STATEMENTS {
		sqlx::query(statement).execute(pool).await?;
	}

	Ok(())
}
