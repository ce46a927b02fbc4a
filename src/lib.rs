// library system: books, renters, and the print report wizard

pub mod config;
pub mod error;
pub mod library;
pub mod library_rent;
pub mod logging;
pub mod registry;
pub mod sql;
pub mod store;
pub mod types;
pub mod wizard;

pub use config::Config;
pub use error::{Error, Result, ValidationKind};
pub use library_rent::{give_back, is_available, rent, rented_books_of};
pub use registry::Registry;
pub use sql::Db;
pub use store::{MemoryStore, Store};
pub use types::{Book, BookId, NewBook, NewParty, Party, PartyId};
pub use wizard::{ButtonId, PrintAction, PrintData, PrintLibraryReport, WizardState};
