//! Base SQLite du catalogue
//!
//! Ce module héberge [`Store`], l'implémentation concrète du store local :
//! tables d'entités, table d'association `group_members` et table
//! `scope_state` portant le drapeau de complétude de chaque portée.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use ampmodel::{Author, AuthorsScope, Completeness, Country, Group, HandleFilter, Scope, Track};

use crate::countries::COUNTRIES;
use crate::error::Result;

/// Store SQLite du catalogue
///
/// Gère la persistance des entités et de l'état de complétude :
/// - upserts idempotents par identité (jamais de doublon sur ré-insertion)
/// - lectures par portée, en ordre stable (par id)
/// - drapeau de complétude par portée, posé uniquement après une
///   énumération distante intégralement persistée
///
/// La connexion est protégée par un mutex : les écritures de portées
/// différentes ne se gênent que le temps d'une instruction, et un lecteur
/// n'observe jamais une portée comme complète pendant que sa récupération
/// écrit encore.
#[derive(Debug)]
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Ouvre (ou crée) la base au chemin donné
    ///
    /// # Arguments
    ///
    /// * `path` - Chemin vers le fichier de base de données SQLite
    ///
    /// # Exemple
    ///
    /// ```rust,no_run
    /// use ampstore::Store;
    /// use std::path::Path;
    ///
    /// let store = Store::open(Path::new("catalog.db")).unwrap();
    /// ```
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Opening catalog store");
        Self::init(conn)
    }

    /// Ouvre une base en mémoire (tests)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    /// Ouvre la base au chemin indiqué par la configuration
    pub fn from_config(config: &ampconfig::Config) -> Result<Self> {
        let path = config.get_database_path()?;
        Self::open(&path)
    }

    /// Crée le schéma s'il n'existe pas et sème la table des pays
    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS groups (
                 id INTEGER PRIMARY KEY,
                 name TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS countries (
                 id INTEGER PRIMARY KEY,
                 name TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS authors (
                 id INTEGER PRIMARY KEY,
                 handle TEXT NOT NULL,
                 real_name TEXT,
                 country_id INTEGER
             );
             CREATE TABLE IF NOT EXISTS tracks (
                 id INTEGER PRIMARY KEY,
                 author_id INTEGER NOT NULL,
                 filename TEXT NOT NULL,
                 title TEXT,
                 size_bytes INTEGER
             );
             CREATE TABLE IF NOT EXISTS group_members (
                 group_id INTEGER NOT NULL,
                 author_id INTEGER NOT NULL,
                 PRIMARY KEY (group_id, author_id)
             );
             CREATE TABLE IF NOT EXISTS scope_state (
                 key TEXT PRIMARY KEY,
                 complete INTEGER NOT NULL DEFAULT 0,
                 marked_at TEXT
             );
             CREATE INDEX IF NOT EXISTS idx_authors_country ON authors (country_id);
             CREATE INDEX IF NOT EXISTS idx_tracks_author ON tracks (author_id);",
        )?;

        // Semer la table fixe des pays sans écraser l'existant
        {
            let mut stmt =
                conn.prepare("INSERT OR IGNORE INTO countries (id, name) VALUES (?1, ?2)")?;
            for (id, name) in COUNTRIES {
                stmt.execute(params![id, name])?;
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // ============ Lectures ============

    /// Récupère tous les groupes connus, par id croissant
    pub fn groups(&self) -> Result<Vec<Group>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, name FROM groups ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Group {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Récupère la table des pays, par id croissant
    pub fn countries(&self) -> Result<Vec<Country>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT id, name FROM countries ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Country {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Récupère les auteurs connus pour une portée, par id croissant
    ///
    /// # Arguments
    ///
    /// * `scope` - Portée d'auteurs : filtre de handle, pays ou groupe
    pub fn authors(&self, scope: &AuthorsScope) -> Result<Vec<Author>> {
        let conn = self.conn.lock().unwrap();
        let (sql, param): (&str, Option<String>) = match scope {
            AuthorsScope::ByHandle(HandleFilter::Letter(letter)) => (
                "SELECT id, handle, real_name, country_id FROM authors
                 WHERE handle LIKE ?1 ORDER BY id",
                Some(format!("{letter}%")),
            ),
            AuthorsScope::ByHandle(HandleFilter::NonLetter) => (
                "SELECT id, handle, real_name, country_id FROM authors
                 WHERE handle NOT GLOB '[a-zA-Z]*' ORDER BY id",
                None,
            ),
            AuthorsScope::ByCountry(id) => (
                "SELECT id, handle, real_name, country_id FROM authors
                 WHERE country_id = ?1 ORDER BY id",
                Some(id.to_string()),
            ),
            AuthorsScope::ByGroup(id) => (
                "SELECT a.id, a.handle, a.real_name, a.country_id FROM authors a
                 JOIN group_members m ON m.author_id = a.id
                 WHERE m.group_id = ?1 ORDER BY a.id",
                Some(id.to_string()),
            ),
        };

        let mut stmt = conn.prepare(sql)?;
        let rows = match param {
            Some(p) => stmt.query_map([p], author_from_row)?,
            None => stmt.query_map([], author_from_row)?,
        }
        .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Récupère les pistes connues d'un auteur, par id croissant
    pub fn tracks(&self, author_id: u32) -> Result<Vec<Track>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, author_id, filename, title, size_bytes FROM tracks
             WHERE author_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map([author_id], |row| {
                Ok(Track {
                    id: row.get(0)?,
                    author_id: row.get(1)?,
                    filename: row.get(2)?,
                    title: row.get(3)?,
                    size_bytes: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    // ============ Écritures ============

    /// Ajoute ou remplace un groupe
    pub fn add_group(&self, group: &Group) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO groups (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![group.id, group.name],
        )?;
        Ok(())
    }

    /// Ajoute ou remplace un pays
    pub fn add_country(&self, country: &Country) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO countries (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name",
            params![country.id, country.name],
        )?;
        Ok(())
    }

    /// Ajoute ou met à jour un auteur
    ///
    /// Le nom réel et le pays déjà connus ne sont jamais écrasés par des
    /// valeurs absentes : les pages distantes ne portent pas toutes les
    /// mêmes colonnes.
    pub fn add_author(&self, author: &Author) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO authors (id, handle, real_name, country_id) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 handle = excluded.handle,
                 real_name = COALESCE(excluded.real_name, real_name),
                 country_id = COALESCE(excluded.country_id, country_id)",
            params![author.id, author.handle, author.real_name, author.country_id],
        )?;
        Ok(())
    }

    /// Enregistre l'appartenance d'un auteur à un groupe
    pub fn add_group_member(&self, group_id: u32, author_id: u32) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO group_members (group_id, author_id) VALUES (?1, ?2)",
            params![group_id, author_id],
        )?;
        Ok(())
    }

    /// Ajoute ou met à jour une piste
    pub fn add_track(&self, track: &Track) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tracks (id, author_id, filename, title, size_bytes)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                 author_id = excluded.author_id,
                 filename = excluded.filename,
                 title = COALESCE(excluded.title, title),
                 size_bytes = COALESCE(excluded.size_bytes, size_bytes)",
            params![
                track.id,
                track.author_id,
                track.filename,
                track.title,
                track.size_bytes
            ],
        )?;
        Ok(())
    }

    // ============ Complétude ============

    /// Retourne l'état de complétude d'une portée
    ///
    /// `Complete` seulement si le drapeau a été posé ; sinon `Partial`
    /// quand des lignes existent déjà pour la portée, `Absent` sinon.
    pub fn completeness(&self, scope: &Scope) -> Result<Completeness> {
        let conn = self.conn.lock().unwrap();
        let complete: Option<bool> = conn
            .query_row(
                "SELECT complete FROM scope_state WHERE key = ?1",
                [scope.key()],
                |row| row.get(0),
            )
            .optional()?;

        if complete == Some(true) {
            return Ok(Completeness::Complete);
        }
        if Self::has_rows(&conn, scope)? {
            Ok(Completeness::Partial)
        } else {
            Ok(Completeness::Absent)
        }
    }

    /// Marque une portée comme complète
    ///
    /// N'est appelé qu'après une énumération distante terminée sans
    /// erreur et intégralement persistée pour cette portée exacte.
    pub fn mark_complete(&self, scope: &Scope) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO scope_state (key, complete, marked_at) VALUES (?1, 1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                 complete = 1,
                 marked_at = excluded.marked_at",
            params![scope.key(), Utc::now().to_rfc3339()],
        )?;
        debug!(scope = %scope, "Scope marked complete");
        Ok(())
    }

    /// Révoque explicitement la complétude d'une portée
    ///
    /// Réservé aux invalidations futures (TTL, montée de version du
    /// catalogue) : aucune lecture ne révoque jamais le drapeau.
    pub fn invalidate(&self, scope: &Scope) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM scope_state WHERE key = ?1", [scope.key()])?;
        debug!(scope = %scope, "Scope invalidated");
        Ok(())
    }

    /// Existe-t-il au moins une ligne persistée pour cette portée ?
    fn has_rows(conn: &Connection, scope: &Scope) -> rusqlite::Result<bool> {
        let (sql, param): (&str, Option<String>) = match scope {
            Scope::Groups => ("SELECT EXISTS (SELECT 1 FROM groups)", None),
            Scope::Authors(AuthorsScope::ByHandle(HandleFilter::Letter(letter))) => (
                "SELECT EXISTS (SELECT 1 FROM authors WHERE handle LIKE ?1)",
                Some(format!("{letter}%")),
            ),
            Scope::Authors(AuthorsScope::ByHandle(HandleFilter::NonLetter)) => (
                "SELECT EXISTS (SELECT 1 FROM authors WHERE handle NOT GLOB '[a-zA-Z]*')",
                None,
            ),
            Scope::Authors(AuthorsScope::ByCountry(id)) => (
                "SELECT EXISTS (SELECT 1 FROM authors WHERE country_id = ?1)",
                Some(id.to_string()),
            ),
            Scope::Authors(AuthorsScope::ByGroup(id)) => (
                "SELECT EXISTS (SELECT 1 FROM group_members WHERE group_id = ?1)",
                Some(id.to_string()),
            ),
            Scope::AuthorTracks(id) => (
                "SELECT EXISTS (SELECT 1 FROM tracks WHERE author_id = ?1)",
                Some(id.to_string()),
            ),
        };
        match param {
            Some(p) => conn.query_row(sql, [p], |row| row.get(0)),
            None => conn.query_row(sql, [], |row| row.get(0)),
        }
    }
}

fn author_from_row(row: &Row<'_>) -> rusqlite::Result<Author> {
    Ok(Author {
        id: row.get(0)?,
        handle: row.get(1)?,
        real_name: row.get(2)?,
        country_id: row.get(3)?,
    })
}
