//! Frontière du store local
//!
//! [`LocalStore`] est l'interface de persistance consommée par le
//! catalogue cachant : toute base clé/valeur ou relationnelle offrant ces
//! opérations avec l'atomicité décrite est conforme. [`crate::Store`]
//! (SQLite) en est l'implémentation de référence.

use ampmodel::{Author, AuthorsScope, Completeness, Country, Group, Scope, Track};

use crate::error::Result;
use crate::Store;

/// Interface de persistance du catalogue
///
/// Les lectures ne touchent jamais le réseau ; les écritures sont
/// idempotentes par identité ; `mark_complete` n'est appelé qu'après une
/// énumération distante intégralement persistée pour la portée exacte.
pub trait LocalStore: Send + Sync {
    /// État de complétude d'une portée
    fn completeness(&self, scope: &Scope) -> Result<Completeness>;

    /// Pose le drapeau de complétude d'une portée
    fn mark_complete(&self, scope: &Scope) -> Result<()>;

    /// Lignes connues pour la portée « tous les groupes »
    fn read_groups(&self) -> Result<Vec<Group>>;

    /// Table des pays
    fn read_countries(&self) -> Result<Vec<Country>>;

    /// Lignes connues pour une portée d'auteurs
    fn read_authors(&self, scope: &AuthorsScope) -> Result<Vec<Author>>;

    /// Pistes connues d'un auteur
    fn read_tracks(&self, author_id: u32) -> Result<Vec<Track>>;

    /// Upsert d'un groupe
    fn add_group(&self, group: &Group) -> Result<()>;

    /// Upsert d'un pays
    fn add_country(&self, country: &Country) -> Result<()>;

    /// Upsert d'un auteur
    fn add_author(&self, author: &Author) -> Result<()>;

    /// Enregistre une appartenance groupe → auteur
    fn add_group_member(&self, group_id: u32, author_id: u32) -> Result<()>;

    /// Upsert d'une piste
    fn add_track(&self, track: &Track) -> Result<()>;
}

impl LocalStore for crate::Store {
    fn completeness(&self, scope: &Scope) -> Result<Completeness> {
        Store::completeness(self, scope)
    }

    fn mark_complete(&self, scope: &Scope) -> Result<()> {
        Store::mark_complete(self, scope)
    }

    fn read_groups(&self) -> Result<Vec<Group>> {
        self.groups()
    }

    fn read_countries(&self) -> Result<Vec<Country>> {
        self.countries()
    }

    fn read_authors(&self, scope: &AuthorsScope) -> Result<Vec<Author>> {
        self.authors(scope)
    }

    fn read_tracks(&self, author_id: u32) -> Result<Vec<Track>> {
        self.tracks(author_id)
    }

    fn add_group(&self, group: &Group) -> Result<()> {
        Store::add_group(self, group)
    }

    fn add_country(&self, country: &Country) -> Result<()> {
        Store::add_country(self, country)
    }

    fn add_author(&self, author: &Author) -> Result<()> {
        Store::add_author(self, author)
    }

    fn add_group_member(&self, group_id: u32, author_id: u32) -> Result<()> {
        Store::add_group_member(self, group_id, author_id)
    }

    fn add_track(&self, track: &Track) -> Result<()> {
        Store::add_track(self, track)
    }
}
