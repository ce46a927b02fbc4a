//! Rental extension: a book has at most one renter, is available while it
//! has none, and a party sees the books it holds through a live query.

use tracing::info;

use crate::error::{Error, Result};
use crate::registry::{FieldDescriptor, ModelDescriptor, ModelKind, Registry, WizardDescriptor};
use crate::store::Store;
use crate::types::{Book, BookId, PartyId, BOOK_MODEL, PARTY_MODEL};
use crate::wizard::{PrintLibraryReport, START_MODEL, WIZARD_NAME};

pub const MODULE: &str = "library_rent";

/// `true` iff nobody is renting the book. Recomputed on every call.
pub fn is_available(book: &Book) -> bool {
	book.is_available()
}

/// Every book currently rented by `party`, read fresh from the store.
pub async fn rented_books_of<S: Store + ?Sized>(store: &S, party: PartyId) -> Result<Vec<Book>> {
	store.books_by_renter(party).await
}

/// Hands `book` to `party`. Renting to the current renter again is a no-op.
pub async fn rent<S: Store + ?Sized>(store: &S, book: BookId, party: PartyId) -> Result<Book> {
	let rented = store.rent_if_free(book, party).await?;
	info!(book, party, "book rented");
	Ok(rented)
}

/// Puts `book` back on the shelf.
pub async fn give_back<S: Store + ?Sized>(store: &S, book: BookId) -> Result<Book> {
	let current = store
		.get_book(book)
		.await?
		.ok_or(Error::NotFound { model: BOOK_MODEL, id: book })?;
	let Some(renter) = current.renter else {
		return Ok(current);
	};
	let returned = store.set_renter(book, None).await?;
	info!(book, renter, "book returned");
	Ok(returned)
}

pub fn register(registry: &mut Registry) -> Result<()> {
	registry.register_model(
		MODULE,
		ModelDescriptor::extension(BOOK_MODEL)
			.field(FieldDescriptor::many2one("renter", "Rented by", PARTY_MODEL))
			.field(FieldDescriptor::boolean("available", "Available for rent").function(&["renter"])),
	)?;
	registry.register_model(
		MODULE,
		ModelDescriptor::extension(PARTY_MODEL)
			.field(FieldDescriptor::one2many("rented_books", "Rented Books", BOOK_MODEL, "renter")),
	)?;
	registry.register_model(
		MODULE,
		ModelDescriptor::new(START_MODEL, "Print Library Report", ModelKind::View)
			.field(FieldDescriptor::many2one("book", "Book", BOOK_MODEL).required()),
	)?;
	registry.register_wizard(
		MODULE,
		WizardDescriptor {
			name: WIZARD_NAME,
			description: "Print Library Report",
			start: PrintLibraryReport::start_view(),
			module: MODULE,
		},
	)
}
