use library_rent::{
	give_back, is_available, logging, rent, rented_books_of, ButtonId, Config, Db, Error, MemoryStore,
	NewBook, NewParty, PrintLibraryReport, Store, WizardState,
};

async fn memory_db() -> Db {
	Db::open(&Config::in_memory()).await.unwrap()
}

async fn availability_tracks_renter<S: Store>(store: &S) {
	let ada = store.create_party(NewParty::named("Ada")).await.unwrap();
	let book = store.create_book(NewBook::titled("Middlemarch")).await.unwrap();
	assert!(is_available(&book));
	assert_eq!(is_available(&book), is_available(&book));

	store.set_renter(book.id, Some(ada.id)).await.unwrap();
	let book = store.get_book(book.id).await.unwrap().unwrap();
	assert!(!is_available(&book));
	assert_eq!(book.renter, Some(ada.id));

	store.set_renter(book.id, None).await.unwrap();
	let book = store.get_book(book.id).await.unwrap().unwrap();
	assert!(is_available(&book));
}

async fn rented_books_is_live<S: Store>(store: &S) {
	let ada = store.create_party(NewParty::named("Ada")).await.unwrap();
	let bob = store.create_party(NewParty::named("Bob")).await.unwrap();
	let emma = store.create_book(NewBook::titled("Emma")).await.unwrap();
	let dune = store.create_book(NewBook::titled("Dune")).await.unwrap();

	assert!(rented_books_of(store, ada.id).await.unwrap().is_empty());

	rent(store, emma.id, ada.id).await.unwrap();
	rent(store, dune.id, ada.id).await.unwrap();
	let mut held: Vec<_> = rented_books_of(store, ada.id)
		.await
		.unwrap()
		.into_iter()
		.map(|book| book.id)
		.collect();
	held.sort();
	assert_eq!(held, vec![emma.id, dune.id]);
	assert!(rented_books_of(store, bob.id).await.unwrap().is_empty());

	give_back(store, emma.id).await.unwrap();
	let held = rented_books_of(store, ada.id).await.unwrap();
	assert_eq!(held.len(), 1);
	assert_eq!(held[0].id, dune.id);

	// plain field edits move the book too
	let mut dune = store.get_book(dune.id).await.unwrap().unwrap();
	dune.renter = Some(bob.id);
	store.update_book(&dune).await.unwrap();
	assert!(rented_books_of(store, ada.id).await.unwrap().is_empty());
	assert_eq!(rented_books_of(store, bob.id).await.unwrap(), vec![dune]);
}

async fn second_renter_is_refused<S: Store>(store: &S) {
	let ada = store.create_party(NewParty::named("Ada")).await.unwrap();
	let bob = store.create_party(NewParty::named("Bob")).await.unwrap();
	let book = store.create_book(NewBook::titled("Howards End")).await.unwrap();

	rent(store, book.id, ada.id).await.unwrap();
	let err = rent(store, book.id, bob.id).await.unwrap_err();
	assert!(matches!(err, Error::AlreadyRented { renter, .. } if renter == ada.id));
	assert!(rented_books_of(store, bob.id).await.unwrap().is_empty());

	give_back(store, book.id).await.unwrap();
	assert_eq!(rent(store, book.id, bob.id).await.unwrap().renter, Some(bob.id));
}

async fn title_is_required<S: Store>(store: &S) {
	let err = store.create_book(NewBook::titled("")).await.unwrap_err();
	assert!(matches!(err, Error::Validation { field: "title", .. }));

	let book = store.create_book(NewBook::titled("Beloved")).await.unwrap();
	assert!(book.isbn.is_none() && book.subject.is_none() && book.r#abstract.is_none());
	assert!(is_available(&book));
}

async fn wizard_round_trip<S: Store>(store: &S) {
	let b1 = store.create_book(NewBook::titled("B1")).await.unwrap();

	let mut cancelled = PrintLibraryReport::new();
	cancelled.select(b1.id);
	assert_eq!(cancelled.run(store, Some(ButtonId::Cancel)).await.unwrap(), None);
	assert_eq!(cancelled.state(), WizardState::End);

	let mut printed = PrintLibraryReport::new();
	printed.select(b1.id);
	assert_eq!(printed.press(None).unwrap(), WizardState::Print);
	let (_, data) = printed.do_print(store).await.unwrap();
	assert_eq!(data.to_value().unwrap(), serde_json::json!({ "library": b1.id }));
	assert_eq!(printed.transition_print(), WizardState::End);
}

async fn deleting_party_frees_books<S: Store>(store: &S) {
	let ada = store.create_party(NewParty::named("Ada")).await.unwrap();
	let book = store.create_book(NewBook::titled("Ulysses")).await.unwrap();
	rent(store, book.id, ada.id).await.unwrap();

	store.delete_party(ada.id).await.unwrap();

	assert!(is_available(&store.get_book(book.id).await.unwrap().unwrap()));
	assert!(store.get_party(ada.id).await.unwrap().is_none());
}

#[tokio::test]
async fn memory_store() {
	logging::init_test();
	let store = MemoryStore::new();
	availability_tracks_renter(&store).await;
	rented_books_is_live(&store).await;
	second_renter_is_refused(&store).await;
	title_is_required(&store).await;
	wizard_round_trip(&store).await;
	deleting_party_frees_books(&store).await;
}

#[tokio::test]
async fn sqlite_store() {
	logging::init_test();
	let db = memory_db().await;
	availability_tracks_renter(&db).await;
	rented_books_is_live(&db).await;
	second_renter_is_refused(&db).await;
	title_is_required(&db).await;
	wizard_round_trip(&db).await;
	deleting_party_frees_books(&db).await;
}

#[tokio::test]
async fn store_behind_trait_object() {
	let store: Box<dyn Store> = Box::new(MemoryStore::new());
	let book = store.create_book(NewBook::titled("Emma")).await.unwrap();
	let mut wizard = PrintLibraryReport::new();
	wizard.select(book.id);
	let (_, data) = wizard.run(store.as_ref(), None).await.unwrap().unwrap();
	assert_eq!(data.library, book.id);
}

#[tokio::test]
async fn file_database_survives_reopen() {
	let dir = tempfile::tempdir().unwrap();
	let url = format!("sqlite://{}", dir.path().join("library.db").display());
	let config = Config::default().with_database_url(url);

	let db = Db::open(&config).await.unwrap();
	let ada = db.create_party(NewParty::named("Ada")).await.unwrap();
	let book = db
		.create_book(NewBook::titled("Persuasion").isbn("9780141439686"))
		.await
		.unwrap();
	rent(&db, book.id, ada.id).await.unwrap();
	db.close().await;

	let db = Db::open(&config).await.unwrap();
	let book = db.get_book(book.id).await.unwrap().unwrap();
	assert_eq!(book.isbn.as_deref(), Some("9780141439686"));
	assert!(!is_available(&book));
	assert_eq!(rented_books_of(&db, ada.id).await.unwrap(), vec![book]);
}
