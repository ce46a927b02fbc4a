use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{Error, Result, ValidationKind};

pub const BOOK_MODEL: &str = "library.book";
pub const PARTY_MODEL: &str = "party.party";

pub type BookId = i64;
pub type PartyId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Book {
	pub id: BookId,
	pub title: String,
	#[serde(default)]
	pub isbn: Option<String>,
	#[serde(default)]
	pub subject: Option<String>,
	#[serde(default)]
	pub r#abstract: Option<String>,
	/// party currently holding the book, `None` while it is on the shelf
	#[serde(default)]
	pub renter: Option<PartyId>,
}

impl Book {
	/// Derived from `renter` on every call, never stored.
	pub fn is_available(&self) -> bool {
		self.renter.is_none()
	}

	pub fn validate(&self) -> Result<()> {
		required(BOOK_MODEL, "title", &self.title)
	}

	pub fn from_query(info: BookQuery) -> Self {
		Book {
			id: info.id,
			title: info.title,
			isbn: info.isbn,
			subject: info.subject,
			r#abstract: info.abstract_text,
			renter: info.renter_id,
		}
	}
}

// `available` goes out with the record but is dropped on the way back in
impl Serialize for Book {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		let mut book = serializer.serialize_struct("Book", 7)?;
		book.serialize_field("id", &self.id)?;
		book.serialize_field("title", &self.title)?;
		book.serialize_field("isbn", &self.isbn)?;
		book.serialize_field("subject", &self.subject)?;
		book.serialize_field("abstract", &self.r#abstract)?;
		book.serialize_field("renter", &self.renter)?;
		book.serialize_field("available", &self.is_available())?;
		book.end()
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
	pub title: String,
	#[serde(default)]
	pub isbn: Option<String>,
	#[serde(default)]
	pub subject: Option<String>,
	#[serde(default)]
	pub r#abstract: Option<String>,
}

impl NewBook {
	pub fn titled(title: impl Into<String>) -> Self {
		NewBook {
			title: title.into(),
			..Default::default()
		}
	}

	pub fn isbn(mut self, isbn: impl Into<String>) -> Self {
		self.isbn = Some(isbn.into());
		self
	}

	pub fn subject(mut self, subject: impl Into<String>) -> Self {
		self.subject = Some(subject.into());
		self
	}

	pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
		self.r#abstract = Some(text.into());
		self
	}

	pub fn validate(&self) -> Result<()> {
		required(BOOK_MODEL, "title", &self.title)
	}

	/// New books are always created on the shelf.
	pub fn into_book(self, id: BookId) -> Book {
		Book {
			id,
			title: self.title,
			isbn: self.isbn,
			subject: self.subject,
			r#abstract: self.r#abstract,
			renter: None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
	pub id: PartyId,
	pub name: String,
}

impl Party {
	pub fn from_query(info: PartyQuery) -> Self {
		Party {
			id: info.id,
			name: info.name,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewParty {
	pub name: String,
}

impl NewParty {
	pub fn named(name: impl Into<String>) -> Self {
		NewParty { name: name.into() }
	}

	pub fn validate(&self) -> Result<()> {
		required(PARTY_MODEL, "name", &self.name)
	}

	pub fn into_party(self, id: PartyId) -> Party {
		Party { id, name: self.name }
	}
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BookQuery {
	pub id: BookId,
	pub title: String,
	pub isbn: Option<String>,
	pub subject: Option<String>,
	pub abstract_text: Option<String>,
	pub renter_id: Option<PartyId>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PartyQuery {
	pub id: PartyId,
	pub name: String,
}

// whitespace-only counts as missing
fn required(model: &'static str, field: &'static str, value: &str) -> Result<()> {
	if value.trim().is_empty() {
		return Err(Error::Validation {
			model,
			field,
			kind: ValidationKind::RequiredFieldMissing,
		});
	}
	Ok(())
}
