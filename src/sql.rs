use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{
	Book, BookId, BookQuery, NewBook, NewParty, Party, PartyId, PartyQuery, BOOK_MODEL, PARTY_MODEL,
};

pub const TABLE_SCHEMA: &[&str] = &[
	r#"
CREATE TABLE IF NOT EXISTS parties (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	name TEXT NOT NULL CHECK(trim(name) != '')
)"#,
	r#"
CREATE TABLE IF NOT EXISTS books (
	id INTEGER NOT NULL PRIMARY KEY AUTOINCREMENT,
	title TEXT NOT NULL CHECK(trim(title) != ''),
	isbn TEXT DEFAULT NULL,
	subject TEXT DEFAULT NULL,
	abstract_text TEXT DEFAULT NULL,
	renter_id INTEGER DEFAULT NULL,
	FOREIGN KEY(renter_id) REFERENCES parties(id) ON DELETE SET NULL
)"#,
	"CREATE INDEX IF NOT EXISTS books_renter ON books(renter_id)",
];

const SELECT_BOOKS: &str = "SELECT id, title, isbn, subject, abstract_text, renter_id FROM books";

/// SQLite backed store.
#[derive(Debug, Clone)]
pub struct Db {
	pool: Pool<Sqlite>,
}

impl Db {
	pub async fn open(config: &Config) -> Result<Db> {
		let options = SqliteConnectOptions::from_str(&config.database_url)?
			.create_if_missing(true)
			.foreign_keys(true);

		let mut pool = SqlitePoolOptions::new()
			.max_connections(config.max_connections)
			.acquire_timeout(config.acquire_timeout);
		// dropping the only connection would drop the whole in-memory database
		if config.is_memory() {
			let forever: Option<Duration> = None;
			pool = pool.max_connections(1).idle_timeout(forever).max_lifetime(forever);
		}
		let pool = pool.connect_with(options).await?;

		let db = Db { pool };
		db.schema().await?;
		info!(url = %config.database_url, "database ready");
		Ok(db)
	}

	pub async fn schema(&self) -> Result<()> {
		for statement in TABLE_SCHEMA {
			sqlx::query(*statement).execute(&self.pool).await?;
		}
		Ok(())
	}

	pub async fn close(self) {
		self.pool.close().await;
	}

	async fn require_party(&self, renter: Option<PartyId>) -> Result<()> {
		if let Some(id) = renter {
			if self.get_party(id).await?.is_none() {
				return Err(Error::NotFound { model: PARTY_MODEL, id });
			}
		}
		Ok(())
	}

	async fn require_book(&self, id: BookId) -> Result<Book> {
		self.get_book(id)
			.await?
			.ok_or(Error::NotFound { model: BOOK_MODEL, id })
	}
}

#[async_trait]
impl Store for Db {
	async fn create_book(&self, book: NewBook) -> Result<Book> {
		book.validate()?;
		let id = sqlx::query(
			"INSERT INTO books (title, isbn, subject, abstract_text) VALUES (?, ?, ?, ?)",
		)
		.bind(&book.title)
		.bind(&book.isbn)
		.bind(&book.subject)
		.bind(&book.r#abstract)
		.execute(&self.pool)
		.await?
		.last_insert_rowid();
		debug!(id, title = %book.title, "book created");
		Ok(book.into_book(id))
	}

	async fn get_book(&self, id: BookId) -> Result<Option<Book>> {
		let row = sqlx::query_as::<_, BookQuery>(&format!("{SELECT_BOOKS} WHERE id = ?"))
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;
		Ok(row.map(Book::from_query))
	}

	async fn update_book(&self, book: &Book) -> Result<Book> {
		book.validate()?;
		self.require_party(book.renter).await?;
		let done = sqlx::query(
			r#"
UPDATE books SET
	title = ?, isbn = ?, subject = ?, abstract_text = ?, renter_id = ?
WHERE
	id = ?"#,
		)
		.bind(&book.title)
		.bind(&book.isbn)
		.bind(&book.subject)
		.bind(&book.r#abstract)
		.bind(book.renter)
		.bind(book.id)
		.execute(&self.pool)
		.await?;
		if done.rows_affected() == 0 {
			return Err(Error::NotFound { model: BOOK_MODEL, id: book.id });
		}
		debug!(id = book.id, "book updated");
		Ok(book.clone())
	}

	async fn set_renter(&self, id: BookId, renter: Option<PartyId>) -> Result<Book> {
		self.require_party(renter).await?;
		let done = sqlx::query("UPDATE books SET renter_id = ? WHERE id = ?")
			.bind(renter)
			.bind(id)
			.execute(&self.pool)
			.await?;
		if done.rows_affected() == 0 {
			return Err(Error::NotFound { model: BOOK_MODEL, id });
		}
		debug!(id, ?renter, "renter set");
		self.require_book(id).await
	}

	async fn rent_if_free(&self, id: BookId, renter: PartyId) -> Result<Book> {
		self.require_party(Some(renter)).await?;
		let mut tx = self.pool.begin().await?;
		let done = sqlx::query(
			r#"
UPDATE books SET
	renter_id = ?
WHERE
	id = ? AND (renter_id IS NULL OR renter_id = ?)"#,
		)
		.bind(renter)
		.bind(id)
		.bind(renter)
		.execute(&mut *tx)
		.await?;
		let row = sqlx::query_as::<_, BookQuery>(&format!("{SELECT_BOOKS} WHERE id = ?"))
			.bind(id)
			.fetch_optional(&mut *tx)
			.await?;
		let Some(book) = row.map(Book::from_query) else {
			tx.rollback().await?;
			return Err(Error::NotFound { model: BOOK_MODEL, id });
		};
		if done.rows_affected() == 0 {
			tx.rollback().await?;
			return Err(Error::AlreadyRented {
				book: id,
				renter: book.renter.unwrap_or(renter),
			});
		}
		tx.commit().await?;
		debug!(id, renter, "renter set if free");
		Ok(book)
	}

	async fn delete_book(&self, id: BookId) -> Result<()> {
		let done = sqlx::query("DELETE FROM books WHERE id = ?")
			.bind(id)
			.execute(&self.pool)
			.await?;
		if done.rows_affected() == 0 {
			return Err(Error::NotFound { model: BOOK_MODEL, id });
		}
		debug!(id, "book deleted");
		Ok(())
	}

	async fn list_books(&self) -> Result<Vec<Book>> {
		let rows = sqlx::query_as::<_, BookQuery>(&format!("{SELECT_BOOKS} ORDER BY id"))
			.fetch_all(&self.pool)
			.await?;
		Ok(rows.into_iter().map(Book::from_query).collect())
	}

	async fn books_by_renter(&self, renter: PartyId) -> Result<Vec<Book>> {
		let rows = sqlx::query_as::<_, BookQuery>(&format!("{SELECT_BOOKS} WHERE renter_id = ? ORDER BY id"))
			.bind(renter)
			.fetch_all(&self.pool)
			.await?;
		Ok(rows.into_iter().map(Book::from_query).collect())
	}

	async fn create_party(&self, party: NewParty) -> Result<Party> {
		party.validate()?;
		let id = sqlx::query("INSERT INTO parties (name) VALUES (?)")
			.bind(&party.name)
			.execute(&self.pool)
			.await?
			.last_insert_rowid();
		debug!(id, name = %party.name, "party created");
		Ok(party.into_party(id))
	}

	async fn get_party(&self, id: PartyId) -> Result<Option<Party>> {
		let row = sqlx::query_as::<_, PartyQuery>("SELECT id, name FROM parties WHERE id = ?")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;
		Ok(row.map(Party::from_query))
	}

	async fn list_parties(&self) -> Result<Vec<Party>> {
		let rows = sqlx::query_as::<_, PartyQuery>("SELECT id, name FROM parties ORDER BY id")
			.fetch_all(&self.pool)
			.await?;
		Ok(rows.into_iter().map(Party::from_query).collect())
	}

	async fn delete_party(&self, id: PartyId) -> Result<()> {
		let mut tx = self.pool.begin().await?;
		let released = sqlx::query("UPDATE books SET renter_id = NULL WHERE renter_id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?
			.rows_affected();
		let done = sqlx::query("DELETE FROM parties WHERE id = ?")
			.bind(id)
			.execute(&mut *tx)
			.await?;
		if done.rows_affected() == 0 {
			tx.rollback().await?;
			return Err(Error::NotFound { model: PARTY_MODEL, id });
		}
		tx.commit().await?;
		info!(id, released, "party deleted");
		Ok(())
	}
}
