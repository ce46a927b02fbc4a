//! "Print Library Report" wizard.
//!
//! ```text
//! start --Cancel--> end
//! start --Print (default)--> print_ --> end
//! ```
//!
//! `start` is a form with one book picker. `print_` hands the report
//! collaborator a [`PrintAction`] and `{"library": <book id>}`; nothing is
//! rendered here.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{BookId, BOOK_MODEL};

pub const WIZARD_NAME: &str = "library.print_report";
pub const START_MODEL: &str = "library.print_report.start";
pub const START_FORM_VIEW: &str = "library.print_view_form";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardState {
	#[default]
	#[serde(rename = "start")]
	Start,
	#[serde(rename = "print_")]
	Print,
	#[serde(rename = "end")]
	End,
}

impl WizardState {
	pub fn name(self) -> &'static str {
		match self {
			WizardState::Start => "start",
			WizardState::Print => "print_",
			WizardState::End => "end",
		}
	}

	pub fn is_terminal(self) -> bool {
		self == WizardState::End
	}
}

impl fmt::Display for WizardState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonId {
	Cancel,
	Print,
}

impl fmt::Display for ButtonId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ButtonId::Cancel => f.write_str("Cancel"),
			ButtonId::Print => f.write_str("Print"),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Button {
	pub id: ButtonId,
	pub label: &'static str,
	pub state: WizardState,
	pub icon: &'static str,
	pub default: bool,
}

/// A form state: which model backs the form, which view shows it, and the
/// buttons leaving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateView {
	pub model: &'static str,
	pub view: &'static str,
	pub buttons: &'static [Button],
}

impl StateView {
	pub fn button(&self, id: ButtonId) -> Option<&Button> {
		self.buttons.iter().find(|button| button.id == id)
	}

	pub fn default_button(&self) -> Option<&Button> {
		self.buttons.iter().find(|button| button.default)
	}
}

pub static START_VIEW: StateView = StateView {
	model: START_MODEL,
	view: START_FORM_VIEW,
	buttons: &[
		Button {
			id: ButtonId::Cancel,
			label: "Cancel",
			state: WizardState::End,
			icon: "tryton-cancel",
			default: false,
		},
		Button {
			id: ButtonId::Print,
			label: "Print",
			state: WizardState::Print,
			icon: "tryton-print",
			default: true,
		},
	],
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartForm {
	pub book: Option<BookId>,
}

/// What the report collaborator should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrintAction {
	pub model: &'static str,
}

impl Default for PrintAction {
	fn default() -> Self {
		PrintAction { model: BOOK_MODEL }
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintData {
	pub library: BookId,
}

impl PrintData {
	pub fn to_value(&self) -> Result<serde_json::Value> {
		Ok(serde_json::to_value(self)?)
	}
}

#[derive(Debug, Clone, Default)]
pub struct PrintLibraryReport {
	state: WizardState,
	pub start: StartForm,
}

impl PrintLibraryReport {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn start_view() -> &'static StateView {
		&START_VIEW
	}

	pub fn state(&self) -> WizardState {
		self.state
	}

	pub fn select(&mut self, book: BookId) -> &mut Self {
		self.start.book = Some(book);
		self
	}

	/// Submits the start form. `None` takes the default button.
	pub fn press(&mut self, button: Option<ButtonId>) -> Result<WizardState> {
		let view = Self::start_view();
		let pressed = match button {
			Some(id) => view.button(id),
			None => view.default_button(),
		};
		let Some(pressed) = pressed else {
			return Err(Error::InvalidTransition {
				from: self.state,
				button: button.unwrap_or(ButtonId::Print),
			});
		};
		if self.state != WizardState::Start {
			return Err(Error::InvalidTransition {
				from: self.state,
				button: pressed.id,
			});
		}
		debug!(button = %pressed.id, to = %pressed.state, "wizard button");
		self.state = pressed.state;
		Ok(self.state)
	}

	/// Builds the report action for the selected book. Only valid in
	/// `print_`. Fails with [`Error::InvalidSelection`] when nothing is
	/// selected or the book is gone.
	pub async fn do_print<S: Store + ?Sized>(&self, store: &S) -> Result<(PrintAction, PrintData)> {
		if self.state != WizardState::Print {
			return Err(Error::InvalidTransition {
				from: self.state,
				button: ButtonId::Print,
			});
		}
		let id = self.start.book.ok_or(Error::InvalidSelection)?;
		let book = store.get_book(id).await?.ok_or(Error::InvalidSelection)?;
		Ok((PrintAction::default(), PrintData { library: book.id }))
	}

	pub fn transition_print(&mut self) -> WizardState {
		self.state = WizardState::End;
		self.state
	}

	/// One round trip of the start form: press, then print and finish if
	/// the button led to `print_`. A print failure leaves the wizard in
	/// `print_`.
	pub async fn run<S: Store + ?Sized>(
		&mut self,
		store: &S,
		button: Option<ButtonId>,
	) -> Result<Option<(PrintAction, PrintData)>> {
		if self.press(button)? != WizardState::Print {
			info!("print report cancelled");
			return Ok(None);
		}
		let printed = match self.do_print(store).await {
			Ok(printed) => printed,
			Err(err) => {
				warn!(book = ?self.start.book, %err, "print report failed");
				return Err(err);
			}
		};
		self.transition_print();
		info!(book = printed.1.library, "print report handed off");
		Ok(Some(printed))
	}
}
