use crate::texts;
use dbal_core::{Adapter, Driver, Parameters, Value, params};
use indoc::indoc;
use std::sync::{LazyLock, Mutex};

static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub fn books<A: Adapter>(driver: &Driver<A>) {
    let _lock = MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    // Setup
    driver
        .execute("DROP TABLE IF EXISTS books", ())
        .expect("Failed to drop the books table")
        .expect("The adapter failed to drop the books table");
    driver
        .execute(
            indoc! {"
                CREATE TABLE books (
                    id INTEGER PRIMARY KEY,
                    title VARCHAR(255) NOT NULL,
                    author VARCHAR(255),
                    year INTEGER
                )
            "},
            (),
        )
        .expect("Failed to create the books table")
        .expect("The adapter failed to create the books table");

    // Insert
    let mut insert = driver
        .prepare("INSERT INTO books (id, title, author, year) VALUES (?, ?, ?, ?)")
        .expect("Failed to prepare the insert")
        .expect("The adapter refused the insert");
    let books: [(i64, &str, Option<&str>, i64); 4] = [
        (1, "Harry Potter and the Philosopher's Stone", Some("J.K. Rowling"), 1997),
        (2, "The Hobbit", Some("J.R.R. Tolkien"), 1937),
        (3, "The Two Towers", Some("J.R.R. Tolkien"), 1954),
        (4, "Beowulf", None, 1000),
    ];
    for (id, title, author, year) in books {
        let result = insert
            .execute(Parameters::new().bind(id).bind(title).bind(author).bind(year))
            .expect("Failed to insert a book")
            .expect("The adapter failed to insert a book");
        assert_eq!(result.affected_rows(), 1);
    }
    assert_eq!(driver.last_insert_id(None).as_deref(), Some("4"));

    // Select
    let mut result = driver
        .query("SELECT title FROM books WHERE year > ? ORDER BY year", [1900])
        .expect("Failed to select books")
        .expect("The adapter failed to select books");
    assert_eq!(
        texts(&result.fetch_col("title", 0).unwrap()),
        [
            "The Hobbit",
            "The Two Towers",
            "Harry Potter and the Philosopher's Stone"
        ]
    );
    let mut result = driver
        .query("SELECT author FROM books WHERE id = ?", [4])
        .unwrap()
        .unwrap();
    assert_eq!(result.fetch_col("author", 1).unwrap(), [Value::Null]);

    #[cfg(not(feature = "disable-named-parameters"))]
    {
        let mut result = driver
            .query(
                "SELECT id FROM books WHERE author = :author AND year < :year ORDER BY id",
                params! { ":author" => "J.R.R. Tolkien", "year" => 1950 },
            )
            .expect("Failed to select with named parameters")
            .expect("The adapter failed to select with named parameters");
        assert_eq!(texts(&result.fetch_col("id", 0).unwrap()), ["2"]);
    }

    // Rows
    let mut result = driver
        .query("SELECT id, title FROM books ORDER BY id", ())
        .unwrap()
        .unwrap();
    let rows = result.fetch_all().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].names(), ["id", "title"]);
    assert_eq!(
        rows[3].get_column("title"),
        Some(&Value::from("Beowulf"))
    );

    // Update and delete
    let updated = driver
        .execute(
            "UPDATE books SET year = year + 1 WHERE author = ?",
            params!["J.R.R. Tolkien"],
        )
        .expect("Failed to update the books")
        .expect("The adapter failed to update the books");
    assert_eq!(updated, 2);
    let deleted = driver
        .execute("DELETE FROM books WHERE year < ?", [1950])
        .expect("Failed to delete the books")
        .expect("The adapter failed to delete the books");
    assert_eq!(deleted, 2);
    let mut result = driver
        .query("SELECT COUNT(*) AS total FROM books", ())
        .unwrap()
        .unwrap();
    assert_eq!(texts(&result.fetch_col("total", 1).unwrap()), ["2"]);
}
