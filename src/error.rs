use std::fmt;

use thiserror::Error;

use crate::types::{BookId, PartyId};
use crate::wizard::{ButtonId, WizardState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
	RequiredFieldMissing,
}

impl fmt::Display for ValidationKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ValidationKind::RequiredFieldMissing => f.write_str("required field missing"),
		}
	}
}

#[derive(Error, Debug)]
pub enum Error {
	#[error("{model}.{field}: {kind}")]
	Validation {
		model: &'static str,
		field: &'static str,
		kind: ValidationKind,
	},

	#[error("no valid book selected")]
	InvalidSelection,

	#[error("book {book} is already rented by party {renter}")]
	AlreadyRented { book: BookId, renter: PartyId },

	#[error("{model} with id={id} not found")]
	NotFound { model: &'static str, id: i64 },

	#[error("can't press {button} in state {from}")]
	InvalidTransition { from: WizardState, button: ButtonId },

	#[error("registry: {0}")]
	Registry(String),

	#[error("config: {0}")]
	Config(String),

	#[error(transparent)]
	Database(#[from] sqlx::Error),

	#[error(transparent)]
	Payload(#[from] serde_json::Error),
}

impl Error {
	pub fn is_validation(&self) -> bool {
		matches!(self, Error::Validation { .. })
	}
}

pub type Result<T> = std::result::Result<T, Error>;
