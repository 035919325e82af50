//! Sample schema and data
//!
//! A small blog-shaped dataset used by the demo server and the test
//! suites: authors and posts on the direct backend, articles on the search
//! backend.

use chrono::NaiveDate;

use crate::executor::MemoryStore;
use crate::record::{FieldValue, Record};
use crate::schema::{
    BackendKind, EnumVariant, FieldDescriptor, RecordType, RegistryBuilder, SchemaRegistry,
};

fn permalink(record: &Record) -> FieldValue {
    FieldValue::str(format!("/posts/{}", record.id))
}

/// Build the sample registry.
pub fn sample_registry() -> SchemaRegistry {
    RegistryBuilder::new()
        .register(
            RecordType::new("authors", BackendKind::Direct)
                .field(
                    FieldDescriptor::string("name")
                        .indexed()
                        .help("Author's display name."),
                )
                .field(FieldDescriptor::string("country").indexed())
                .field(FieldDescriptor::boolean("active").indexed())
                .field(FieldDescriptor::date("joined").indexed())
                .field(
                    FieldDescriptor::reverse("posts", "posts", "author")
                        .help("Posts written by this author."),
                )
                .field(FieldDescriptor::computed_attr("display_name", "name"))
                .recurse_on_single(&["posts"]),
        )
        .register(
            RecordType::new("posts", BackendKind::Direct)
                .field(FieldDescriptor::string("title").indexed().help("Post title."))
                .field(FieldDescriptor::string("slug"))
                .field(
                    FieldDescriptor::enumeration(
                        "status",
                        vec![
                            EnumVariant::new(1, "ACTIVE").with_label("Active"),
                            EnumVariant::new(2, "CLOSED").with_label("Closed"),
                        ],
                    )
                    .indexed(),
                )
                .field(FieldDescriptor::datetime("created").indexed())
                .field(FieldDescriptor::float("score"))
                .field(FieldDescriptor::string("summary").nullable())
                .field(
                    FieldDescriptor::reference("author", "authors")
                        .indexed()
                        .help("The post's author, as an integer id."),
                )
                .field(FieldDescriptor::computed_fn("permalink", permalink))
                .unique_together(&["author", "slug"])
                .recurse_on(&["author"]),
        )
        .register(
            RecordType::new("articles", BackendKind::Search)
                .field(FieldDescriptor::string("title").search_indexed())
                .field(FieldDescriptor::string("body").search_indexed())
                .field(FieldDescriptor::datetime("published").search_indexed()),
        )
        .build()
        .expect("sample registry is valid")
}

/// Build the sample store matching [`sample_registry`].
pub fn sample_store() -> MemoryStore {
    let mut store = MemoryStore::new();

    let authors = [
        (1, "Ada", "UK", true, (1995, 3, 10)),
        (2, "Grace", "US", true, (1998, 7, 2)),
        (3, "Linus", "FI", false, (2001, 11, 24)),
    ];
    for (id, name, country, active, (y, m, d)) in authors {
        let joined = NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date");
        store.insert(
            "authors",
            Record::new(id)
                .with("name", name)
                .with("country", country)
                .with("active", active)
                .with("joined", joined),
        );
    }

    let posts = [
        (1, "Engines of logic", "engines", 1, "2020-01-15T09:30:00", 4.5, 1),
        (2, "Notes on compiling", "compiling", 1, "2020-02-20T14:00:00", 3.8, 2),
        (3, "Debugging stories", "debugging", 2, "2020-03-05T11:15:00", 4.9, 2),
        (4, "Kernel musings", "kernel", 1, "2020-04-12T08:45:00", 4.1, 3),
        (5, "On distributed state", "distributed", 2, "2020-06-30T17:20:00", 2.7, 1),
    ];
    for (id, title, slug, status, created, score, author) in posts {
        let created = chrono::NaiveDateTime::parse_from_str(created, "%Y-%m-%dT%H:%M:%S")
            .expect("valid fixture datetime");
        store.insert(
            "posts",
            Record::new(id)
                .with("title", title)
                .with("slug", slug)
                .with("status", status as i64)
                .with("created", created)
                .with("score", score)
                .with("summary", FieldValue::Null)
                .with("author", author as i64),
        );
    }

    let articles = [
        (1, "Rust ownership in practice", "Borrowing, lifetimes, and moves.", "2021-01-10T00:00:00"),
        (2, "Async runtimes compared", "Executors, reactors, and rust tasks.", "2021-02-14T00:00:00"),
        (3, "Query planning basics", "Predicates and indexes.", "2021-03-01T00:00:00"),
    ];
    for (id, title, body, published) in articles {
        let published = chrono::NaiveDateTime::parse_from_str(published, "%Y-%m-%dT%H:%M:%S")
            .expect("valid fixture datetime");
        store.insert(
            "articles",
            Record::new(id)
                .with("title", title)
                .with("body", body)
                .with("published", published),
        );
    }

    store
}
