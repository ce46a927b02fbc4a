//! Explicit model/wizard pool.
//!
//! Each module contributes descriptors through its own `register` function
//! and the application calls them in dependency order. Registering a model
//! name that is already present as an *extension* merges the new fields in;
//! registering it as a base model twice is an error.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::types::PARTY_MODEL;
use crate::wizard::StateView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
	Char,
	Text,
	Boolean,
	Many2One { target: &'static str },
	One2Many { target: &'static str, field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
	pub name: &'static str,
	pub label: &'static str,
	pub kind: FieldKind,
	pub required: bool,
	/// false for computed fields and reverse relations
	pub stored: bool,
	pub depends: &'static [&'static str],
}

impl FieldDescriptor {
	fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
		FieldDescriptor {
			name,
			label,
			kind,
			required: false,
			stored: true,
			depends: &[],
		}
	}

	pub fn char(name: &'static str, label: &'static str) -> Self {
		Self::new(name, label, FieldKind::Char)
	}

	pub fn text(name: &'static str, label: &'static str) -> Self {
		Self::new(name, label, FieldKind::Text)
	}

	pub fn boolean(name: &'static str, label: &'static str) -> Self {
		Self::new(name, label, FieldKind::Boolean)
	}

	pub fn many2one(name: &'static str, label: &'static str, target: &'static str) -> Self {
		Self::new(name, label, FieldKind::Many2One { target })
	}

	pub fn one2many(
		name: &'static str,
		label: &'static str,
		target: &'static str,
		field: &'static str,
	) -> Self {
		let mut reverse = Self::new(name, label, FieldKind::One2Many { target, field });
		reverse.stored = false;
		reverse
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Computed from `depends` on every read.
	pub fn function(mut self, depends: &'static [&'static str]) -> Self {
		self.stored = false;
		self.depends = depends;
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
	/// persisted records
	Sql,
	/// form-only, never stored
	View,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
	pub name: &'static str,
	pub description: &'static str,
	pub kind: ModelKind,
	pub fields: Vec<FieldDescriptor>,
	pub modules: Vec<&'static str>,
	extension: bool,
}

impl ModelDescriptor {
	pub fn new(name: &'static str, description: &'static str, kind: ModelKind) -> Self {
		ModelDescriptor {
			name,
			description,
			kind,
			fields: Vec::new(),
			modules: Vec::new(),
			extension: false,
		}
	}

	/// Adds fields to a model some earlier module registered.
	pub fn extension(name: &'static str) -> Self {
		ModelDescriptor {
			extension: true,
			..Self::new(name, "", ModelKind::Sql)
		}
	}

	pub fn field(mut self, field: FieldDescriptor) -> Self {
		self.fields.push(field);
		self
	}

	pub fn get_field(&self, name: &str) -> Option<&FieldDescriptor> {
		self.fields.iter().find(|field| field.name == name)
	}

	pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
		self.fields.iter().filter(|field| field.required)
	}

	fn merge(&mut self, module: &'static str, extension: ModelDescriptor) {
		for field in extension.fields {
			match self.fields.iter_mut().find(|f| f.name == field.name) {
				Some(existing) => *existing = field,
				None => self.fields.push(field),
			}
		}
		self.modules.push(module);
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardDescriptor {
	pub name: &'static str,
	pub description: &'static str,
	pub start: &'static StateView,
	pub module: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
	models: BTreeMap<&'static str, ModelDescriptor>,
	wizards: BTreeMap<&'static str, WizardDescriptor>,
	modules: Vec<&'static str>,
}

impl Registry {
	pub fn new() -> Self {
		Self::default()
	}

	/// party, library and library_rent, in that order.
	pub fn assemble() -> Result<Self> {
		let mut registry = Registry::new();
		register_party(&mut registry)?;
		crate::library::register(&mut registry)?;
		crate::library_rent::register(&mut registry)?;
		Ok(registry)
	}

	pub fn register_model(&mut self, module: &'static str, mut model: ModelDescriptor) -> Result<()> {
		self.note_module(module);
		if let Some(base) = self.models.get_mut(model.name) {
			if !model.extension {
				return Err(Error::Registry(format!("{module} registers {} twice", model.name)));
			}
			debug!(module, model = model.name, fields = model.fields.len(), "model extended");
			base.merge(module, model);
			return Ok(());
		}
		if model.extension {
			return Err(Error::Registry(format!(
				"{module} extends {} which is not registered",
				model.name
			)));
		}
		debug!(module, model = model.name, "model registered");
		model.modules.push(module);
		self.models.insert(model.name, model);
		Ok(())
	}

	pub fn register_wizard(&mut self, module: &'static str, wizard: WizardDescriptor) -> Result<()> {
		self.note_module(module);
		if !self.models.contains_key(wizard.start.model) {
			return Err(Error::Registry(format!(
				"wizard {} needs form model {}",
				wizard.name, wizard.start.model
			)));
		}
		if self.wizards.contains_key(wizard.name) {
			return Err(Error::Registry(format!("{module} registers {} twice", wizard.name)));
		}
		debug!(module, wizard = wizard.name, "wizard registered");
		self.wizards.insert(wizard.name, WizardDescriptor { module, ..wizard });
		Ok(())
	}

	pub fn model(&self, name: &str) -> Option<&ModelDescriptor> {
		self.models.get(name)
	}

	pub fn wizard(&self, name: &str) -> Option<&WizardDescriptor> {
		self.wizards.get(name)
	}

	pub fn models(&self) -> impl Iterator<Item = &ModelDescriptor> {
		self.models.values()
	}

	pub fn modules(&self) -> &[&'static str] {
		&self.modules
	}

	fn note_module(&mut self, module: &'static str) {
		if !self.modules.contains(&module) {
			self.modules.push(module);
		}
	}
}

/// Parties come from the host's `party` module; only the bits the rental
/// extension touches are described.
pub fn register_party(registry: &mut Registry) -> Result<()> {
	registry.register_model(
		"party",
		ModelDescriptor::new(PARTY_MODEL, "Party", ModelKind::Sql)
			.field(FieldDescriptor::char("name", "Name").required()),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::BOOK_MODEL;
	use crate::wizard::{START_MODEL, WIZARD_NAME};

	#[test]
	fn assembled_book_has_base_and_rental_fields() {
		let registry = Registry::assemble().unwrap();
		let book = registry.model(BOOK_MODEL).unwrap();
		let names: Vec<_> = book.fields.iter().map(|f| f.name).collect();
		assert_eq!(names, ["title", "isbn", "subject", "abstract", "renter", "available"]);
		assert_eq!(book.modules, ["library", "library_rent"]);

		let required: Vec<_> = book.required_fields().map(|f| f.name).collect();
		assert_eq!(required, ["title"]);

		let available = book.get_field("available").unwrap();
		assert!(!available.stored);
		assert_eq!(available.depends, ["renter"]);
		assert_eq!(
			book.get_field("renter").unwrap().kind,
			FieldKind::Many2One { target: PARTY_MODEL }
		);
	}

	#[test]
	fn party_gets_reverse_view() {
		let registry = Registry::assemble().unwrap();
		let party = registry.model(PARTY_MODEL).unwrap();
		let rented = party.get_field("rented_books").unwrap();
		assert_eq!(rented.kind, FieldKind::One2Many { target: BOOK_MODEL, field: "renter" });
		assert!(!rented.stored);
		assert!(party.get_field("name").unwrap().required);
	}

	#[test]
	fn wizard_is_registered_with_its_form() {
		let registry = Registry::assemble().unwrap();
		let wizard = registry.wizard(WIZARD_NAME).unwrap();
		assert_eq!(wizard.module, "library_rent");
		assert_eq!(wizard.start.model, START_MODEL);
		assert_eq!(registry.model(START_MODEL).unwrap().kind, ModelKind::View);
		assert_eq!(registry.modules(), ["party", "library", "library_rent"]);
	}

	#[test]
	fn extension_without_base_fails() {
		let mut registry = Registry::new();
		register_party(&mut registry).unwrap();
		let err = crate::library_rent::register(&mut registry).unwrap_err();
		assert!(matches!(err, Error::Registry(_)));
	}

	#[test]
	fn base_model_twice_fails() {
		let mut registry = Registry::new();
		crate::library::register(&mut registry).unwrap();
		assert!(crate::library::register(&mut registry).is_err());
	}

	#[test]
	fn extension_replaces_same_named_field() {
		let mut registry = Registry::new();
		registry
			.register_model(
				"base",
				ModelDescriptor::new("demo.thing", "Thing", ModelKind::Sql)
					.field(FieldDescriptor::char("code", "Code")),
			)
			.unwrap();
		registry
			.register_model(
				"ext",
				ModelDescriptor::extension("demo.thing").field(FieldDescriptor::char("code", "Code").required()),
			)
			.unwrap();
		let thing = registry.model("demo.thing").unwrap();
		assert_eq!(thing.fields.len(), 1);
		assert!(thing.fields[0].required);
		assert_eq!(registry.models().count(), 1);
	}
}
