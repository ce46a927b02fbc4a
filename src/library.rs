// base book model: bibliographic fields only, no rental state

use crate::error::Result;
use crate::registry::{FieldDescriptor, ModelDescriptor, ModelKind, Registry};
use crate::types::BOOK_MODEL;

pub const MODULE: &str = "library";

pub fn register(registry: &mut Registry) -> Result<()> {
	registry.register_model(
		MODULE,
		ModelDescriptor::new(BOOK_MODEL, "Book", ModelKind::Sql)
			.field(FieldDescriptor::char("title", "Title").required())
			.field(FieldDescriptor::char("isbn", "ISBN"))
			.field(FieldDescriptor::char("subject", "Subject"))
			.field(FieldDescriptor::text("abstract", "Abstract")),
	)
}
