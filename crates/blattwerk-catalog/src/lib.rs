// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Persistent notebook catalog backed by SQLite.
//
// The catalog stores notebook metadata and the geometry descriptors
// (notebook types) they reference, never any image data. Page images live
// on disk under the page store; the assembled PDFs wherever the notebook's
// path points.

use std::path::Path;

use rusqlite::{Connection, params};
use tracing::{debug, info, instrument};

use blattwerk_core::error::{BlattwerkError, Result};
use blattwerk_core::{Notebook, NotebookType};

/// SQLite schema for notebook types.
const CREATE_TABLE_TYPE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS notebook_type (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT UNIQUE NOT NULL,
        page_width INTEGER NOT NULL,
        page_height INTEGER NOT NULL,
        pages_paired INTEGER NOT NULL DEFAULT 0
    )
"#;

/// SQLite schema for notebooks.
const CREATE_TABLE_NOTEBOOK_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS notebook (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT UNIQUE NOT NULL,
        type_id INTEGER NOT NULL,
        path TEXT NOT NULL,
        total_pages INTEGER NOT NULL DEFAULT 0,
        first_page_number INTEGER NOT NULL DEFAULT 1,
        FOREIGN KEY(type_id) REFERENCES notebook_type(id)
    )
"#;

const INSERT_TYPE_SQL: &str = r#"
    INSERT INTO notebook_type(title, page_width, page_height, pages_paired)
    VALUES (?1, ?2, ?3, ?4)
"#;

const INSERT_NOTEBOOK_SQL: &str = r#"
    INSERT INTO notebook(title, type_id, path, total_pages, first_page_number)
    VALUES (?1, (SELECT id FROM notebook_type WHERE title = ?2), ?3, ?4, ?5)
"#;

const UPDATE_NOTEBOOK_SQL: &str = r#"
    UPDATE notebook
    SET title = ?1, path = ?2, total_pages = ?3, first_page_number = ?4
    WHERE id = ?5
"#;

/// Persistent catalog of notebooks and their types.
///
/// All methods are synchronous; `rusqlite` wraps a single open connection.
pub struct Catalog {
    conn: Connection,
}

impl Catalog {
    /// Open (or create) the catalog database at the given path.
    ///
    /// Applies WAL journal mode and creates the tables on first use.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path.as_ref())
            .map_err(|e| BlattwerkError::Database(format!("open: {e}")))?;

        // WAL survives unclean shutdowns more gracefully than the default
        // rollback journal.
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| BlattwerkError::Database(format!("WAL pragma: {e}")))?;

        Self::create_tables(&conn)?;
        info!("catalog database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (useful for tests).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| BlattwerkError::Database(format!("open in-memory: {e}")))?;
        Self::create_tables(&conn)?;
        debug!("in-memory catalog database opened");
        Ok(Self { conn })
    }

    fn create_tables(conn: &Connection) -> Result<()> {
        conn.execute_batch(CREATE_TABLE_TYPE_SQL)
            .map_err(|e| BlattwerkError::Database(format!("create notebook_type: {e}")))?;
        conn.execute_batch(CREATE_TABLE_NOTEBOOK_SQL)
            .map_err(|e| BlattwerkError::Database(format!("create notebook: {e}")))?;
        Ok(())
    }

    // -- Notebook types -------------------------------------------------------

    /// Insert a new type. Types are immutable once created; a duplicate
    /// title is a database error. The type's id is filled in on success.
    #[instrument(skip_all, fields(title = kind.title()))]
    pub fn save_type(&self, kind: &mut NotebookType) -> Result<()> {
        self.conn
            .execute(
                INSERT_TYPE_SQL,
                params![
                    kind.title(),
                    kind.page_width_mm(),
                    kind.page_height_mm(),
                    kind.pages_paired(),
                ],
            )
            .map_err(|e| BlattwerkError::Database(format!("save type: {e}")))?;
        kind.set_id(self.conn.last_insert_rowid());
        debug!(id = kind.id(), "notebook type saved");
        Ok(())
    }

    pub fn type_exists(&self, title: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM notebook_type WHERE title = ?1",
                params![title],
                |row| row.get(0),
            )
            .map_err(|e| BlattwerkError::Database(format!("type exists: {e}")))?;
        Ok(count > 0)
    }

    pub fn get_type_by_title(&self, title: &str) -> Result<Option<NotebookType>> {
        self.query_type("SELECT * FROM notebook_type WHERE title = ?1", title)
    }

    fn get_type_by_id(&self, id: i64) -> Result<Option<NotebookType>> {
        self.query_type("SELECT * FROM notebook_type WHERE id = ?1", id)
    }

    fn query_type<P: rusqlite::ToSql>(&self, sql: &str, param: P) -> Result<Option<NotebookType>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| BlattwerkError::Database(format!("prepare type query: {e}")))?;
        let mut rows = stmt
            .query(params![param])
            .map_err(|e| BlattwerkError::Database(format!("query type: {e}")))?;

        match rows
            .next()
            .map_err(|e| BlattwerkError::Database(format!("read type row: {e}")))?
        {
            Some(row) => Ok(Some(Self::type_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn type_from_row(row: &rusqlite::Row<'_>) -> Result<NotebookType> {
        let map = |e: rusqlite::Error| BlattwerkError::Database(format!("type column: {e}"));
        let id: i64 = row.get(0).map_err(map)?;
        let title: String = row.get(1).map_err(map)?;
        let width: i32 = row.get(2).map_err(map)?;
        let height: i32 = row.get(3).map_err(map)?;
        let paired: bool = row.get(4).map_err(map)?;

        let mut kind = NotebookType::new(&title, width, height);
        kind.set_id(id);
        kind.set_pages_paired(paired);
        Ok(kind)
    }

    /// All types, ordered by title.
    pub fn get_types(&self) -> Result<Vec<NotebookType>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM notebook_type ORDER BY title")
            .map_err(|e| BlattwerkError::Database(format!("prepare types: {e}")))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| BlattwerkError::Database(format!("query types: {e}")))?;

        let mut types = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| BlattwerkError::Database(format!("read type row: {e}")))?
        {
            types.push(Self::type_from_row(row)?);
        }
        Ok(types)
    }

    pub fn get_type_titles(&self) -> Result<Vec<String>> {
        self.titles("SELECT title FROM notebook_type ORDER BY title")
    }

    /// Delete a type by title. Fails while any notebook still references it.
    #[instrument(skip(self))]
    pub fn delete_type_by_title(&self, title: &str) -> Result<()> {
        let in_use: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM notebook
                 WHERE type_id = (SELECT id FROM notebook_type WHERE title = ?1)",
                params![title],
                |row| row.get(0),
            )
            .map_err(|e| BlattwerkError::Database(format!("type usage: {e}")))?;
        if in_use > 0 {
            return Err(BlattwerkError::Database(format!(
                "type '{title}' is used by {in_use} notebook(s)"
            )));
        }
        self.conn
            .execute(
                "DELETE FROM notebook_type WHERE title = ?1",
                params![title],
            )
            .map_err(|e| BlattwerkError::Database(format!("delete type: {e}")))?;
        Ok(())
    }

    // -- Notebooks ------------------------------------------------------------

    /// Insert a new notebook or update an already-persisted one (total
    /// pages, first page number, title, path). The notebook's id is filled
    /// in after an insert.
    #[instrument(skip_all, fields(notebook = notebook.title()))]
    pub fn save_notebook(&self, notebook: &mut Notebook) -> Result<()> {
        if notebook.id() < 0 {
            self.conn
                .execute(
                    INSERT_NOTEBOOK_SQL,
                    params![
                        notebook.title(),
                        notebook.kind().title(),
                        notebook.path().to_string_lossy().into_owned(),
                        notebook.total_pages(),
                        notebook.first_page_number(),
                    ],
                )
                .map_err(|e| BlattwerkError::Database(format!("save notebook: {e}")))?;
            notebook.set_id(self.conn.last_insert_rowid());
        } else {
            self.conn
                .execute(
                    UPDATE_NOTEBOOK_SQL,
                    params![
                        notebook.title(),
                        notebook.path().to_string_lossy().into_owned(),
                        notebook.total_pages(),
                        notebook.first_page_number(),
                        notebook.id(),
                    ],
                )
                .map_err(|e| BlattwerkError::Database(format!("update notebook: {e}")))?;
        }
        debug!(id = notebook.id(), "notebook saved");
        Ok(())
    }

    pub fn notebook_exists(&self, title: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM notebook WHERE title = ?1",
                params![title],
                |row| row.get(0),
            )
            .map_err(|e| BlattwerkError::Database(format!("notebook exists: {e}")))?;
        Ok(count > 0)
    }

    pub fn get_notebook_by_title(&self, title: &str) -> Result<Option<Notebook>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM notebook WHERE title = ?1")
            .map_err(|e| BlattwerkError::Database(format!("prepare notebook: {e}")))?;
        let mut rows = stmt
            .query(params![title])
            .map_err(|e| BlattwerkError::Database(format!("query notebook: {e}")))?;

        match rows
            .next()
            .map_err(|e| BlattwerkError::Database(format!("read notebook row: {e}")))?
        {
            Some(row) => Ok(Some(self.notebook_from_row(row)?)),
            None => Ok(None),
        }
    }

    /// All notebooks, ordered by title, each with its type joined in.
    pub fn get_notebooks(&self) -> Result<Vec<Notebook>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM notebook ORDER BY title")
            .map_err(|e| BlattwerkError::Database(format!("prepare notebooks: {e}")))?;
        let mut rows = stmt
            .query([])
            .map_err(|e| BlattwerkError::Database(format!("query notebooks: {e}")))?;

        // Collect the raw rows first, then resolve each notebook's type
        // with follow-up queries.
        let mut raw = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| BlattwerkError::Database(format!("read notebook row: {e}")))?
        {
            raw.push(Self::notebook_columns(row)?);
        }

        raw.into_iter()
            .map(|columns| self.notebook_from_columns(columns))
            .collect()
    }

    pub fn get_notebook_titles(&self) -> Result<Vec<String>> {
        self.titles("SELECT title FROM notebook ORDER BY title")
    }

    #[instrument(skip(self))]
    pub fn delete_notebook_by_title(&self, title: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM notebook WHERE title = ?1", params![title])
            .map_err(|e| BlattwerkError::Database(format!("delete notebook: {e}")))?;
        Ok(())
    }

    // -- Row plumbing ---------------------------------------------------------

    fn titles(&self, sql: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| BlattwerkError::Database(format!("prepare titles: {e}")))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| BlattwerkError::Database(format!("query titles: {e}")))?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| BlattwerkError::Database(format!("read title row: {e}")))
    }

    fn notebook_columns(row: &rusqlite::Row<'_>) -> Result<(i64, String, i64, String, i64, i32)> {
        let map = |e: rusqlite::Error| BlattwerkError::Database(format!("notebook column: {e}"));
        Ok((
            row.get(0).map_err(map)?,
            row.get(1).map_err(map)?,
            row.get(2).map_err(map)?,
            row.get(3).map_err(map)?,
            row.get(4).map_err(map)?,
            row.get(5).map_err(map)?,
        ))
    }

    fn notebook_from_row(&self, row: &rusqlite::Row<'_>) -> Result<Notebook> {
        self.notebook_from_columns(Self::notebook_columns(row)?)
    }

    fn notebook_from_columns(
        &self,
        (id, title, type_id, path, total_pages, first_page): (i64, String, i64, String, i64, i32),
    ) -> Result<Notebook> {
        let kind = self.get_type_by_id(type_id)?.ok_or_else(|| {
            BlattwerkError::Database(format!("notebook '{title}' references missing type {type_id}"))
        })?;

        let mut notebook = Notebook::new(&title, kind, path);
        notebook.set_id(id);
        notebook.set_total_pages(total_pages);
        notebook.set_first_page_number(first_page);
        Ok(notebook)
    }
}
