// persistence seam: anything that can create/read/update/delete books and
// parties and answer "books where renter == party"

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::{Book, BookId, NewBook, NewParty, Party, PartyId, BOOK_MODEL, PARTY_MODEL};

#[async_trait]
pub trait Store: Send + Sync {
	async fn create_book(&self, book: NewBook) -> Result<Book>;
	async fn get_book(&self, id: BookId) -> Result<Option<Book>>;
	/// Writes every stored field of `book`, renter included.
	async fn update_book(&self, book: &Book) -> Result<Book>;
	/// Plain field write, no rental rules. Last write wins.
	async fn set_renter(&self, id: BookId, renter: Option<PartyId>) -> Result<Book>;
	/// Sets the renter only if the book is free or already held by `renter`,
	/// checked and written in one step. `AlreadyRented` otherwise.
	async fn rent_if_free(&self, id: BookId, renter: PartyId) -> Result<Book>;
	async fn delete_book(&self, id: BookId) -> Result<()>;
	async fn list_books(&self) -> Result<Vec<Book>>;
	async fn books_by_renter(&self, renter: PartyId) -> Result<Vec<Book>>;

	async fn create_party(&self, party: NewParty) -> Result<Party>;
	async fn get_party(&self, id: PartyId) -> Result<Option<Party>>;
	async fn list_parties(&self) -> Result<Vec<Party>>;
	/// Books rented by the party go back on the shelf.
	async fn delete_party(&self, id: PartyId) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryState {
	books: BTreeMap<BookId, Book>,
	parties: BTreeMap<PartyId, Party>,
	last_book: BookId,
	last_party: PartyId,
}

impl MemoryState {
	fn check_party(&self, renter: Option<PartyId>) -> Result<()> {
		match renter {
			Some(id) if !self.parties.contains_key(&id) => Err(Error::NotFound { model: PARTY_MODEL, id }),
			_ => Ok(()),
		}
	}
}

/// In-process store. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
	state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl Store for MemoryStore {
	async fn create_book(&self, book: NewBook) -> Result<Book> {
		book.validate()?;
		let mut state = self.state.lock().await;
		state.last_book += 1;
		let book = book.into_book(state.last_book);
		state.books.insert(book.id, book.clone());
		debug!(id = book.id, title = %book.title, "book created");
		Ok(book)
	}

	async fn get_book(&self, id: BookId) -> Result<Option<Book>> {
		Ok(self.state.lock().await.books.get(&id).cloned())
	}

	async fn update_book(&self, book: &Book) -> Result<Book> {
		book.validate()?;
		let mut state = self.state.lock().await;
		state.check_party(book.renter)?;
		let stored = state
			.books
			.get_mut(&book.id)
			.ok_or(Error::NotFound { model: BOOK_MODEL, id: book.id })?;
		*stored = book.clone();
		debug!(id = book.id, "book updated");
		Ok(book.clone())
	}

	async fn set_renter(&self, id: BookId, renter: Option<PartyId>) -> Result<Book> {
		let mut state = self.state.lock().await;
		state.check_party(renter)?;
		let stored = state
			.books
			.get_mut(&id)
			.ok_or(Error::NotFound { model: BOOK_MODEL, id })?;
		stored.renter = renter;
		debug!(id, ?renter, "renter set");
		Ok(stored.clone())
	}

	async fn rent_if_free(&self, id: BookId, renter: PartyId) -> Result<Book> {
		let mut state = self.state.lock().await;
		state.check_party(Some(renter))?;
		let stored = state
			.books
			.get_mut(&id)
			.ok_or(Error::NotFound { model: BOOK_MODEL, id })?;
		match stored.renter {
			Some(holder) if holder != renter => {
				return Err(Error::AlreadyRented { book: id, renter: holder });
			}
			_ => stored.renter = Some(renter),
		}
		debug!(id, renter, "renter set if free");
		Ok(stored.clone())
	}

	async fn delete_book(&self, id: BookId) -> Result<()> {
		let mut state = self.state.lock().await;
		state
			.books
			.remove(&id)
			.ok_or(Error::NotFound { model: BOOK_MODEL, id })?;
		debug!(id, "book deleted");
		Ok(())
	}

	async fn list_books(&self) -> Result<Vec<Book>> {
		Ok(self.state.lock().await.books.values().cloned().collect())
	}

	async fn books_by_renter(&self, renter: PartyId) -> Result<Vec<Book>> {
		let state = self.state.lock().await;
		Ok(state
			.books
			.values()
			.filter(|book| book.renter == Some(renter))
			.cloned()
			.collect())
	}

	async fn create_party(&self, party: NewParty) -> Result<Party> {
		party.validate()?;
		let mut state = self.state.lock().await;
		state.last_party += 1;
		let party = party.into_party(state.last_party);
		state.parties.insert(party.id, party.clone());
		debug!(id = party.id, name = %party.name, "party created");
		Ok(party)
	}

	async fn get_party(&self, id: PartyId) -> Result<Option<Party>> {
		Ok(self.state.lock().await.parties.get(&id).cloned())
	}

	async fn list_parties(&self) -> Result<Vec<Party>> {
		Ok(self.state.lock().await.parties.values().cloned().collect())
	}

	async fn delete_party(&self, id: PartyId) -> Result<()> {
		let mut state = self.state.lock().await;
		state
			.parties
			.remove(&id)
			.ok_or(Error::NotFound { model: PARTY_MODEL, id })?;
		let mut released = 0;
		for book in state.books.values_mut().filter(|book| book.renter == Some(id)) {
			book.renter = None;
			released += 1;
		}
		info!(id, released, "party deleted");
		Ok(())
	}
}
