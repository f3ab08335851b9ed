//! Cœur du catalogue cachant
//!
//! [`CachingCatalog`] applique, pour chaque portée énumérable, la
//! décision servir-local / récupérer-distant, possède les transitions de
//! complétude et garantit qu'au plus une récupération distante par
//! portée est en vol à un instant donné.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, warn};

use ampmodel::{
    Author, AuthorsScope, AuthorsVisitor, Country, FoundTracksVisitor, Group, GroupsVisitor,
    HandleFilter, Scope, Track, TracksVisitor,
};
use ampremote::RemoteSource;
use ampstore::{LocalStore, StoreError};

use crate::error::Result;

/// Verrous de récupération, un par portée
///
/// Sémantique « comparer puis démarrer » : le verrou d'une portée est
/// pris avant de décider de lancer une récupération distante, et l'état
/// du store est relu après acquisition — un appelant qui a attendu un
/// prédécesseur victorieux est servi localement sans second appel
/// réseau. Les entrées ne sont jamais évincées : l'espace des portées
/// est borné par le catalogue lui-même.
#[derive(Debug, Default)]
struct ScopeGuards {
    guards: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ScopeGuards {
    fn guard(&self, scope: &Scope) -> Arc<AsyncMutex<()>> {
        let mut guards = self.guards.lock().unwrap();
        guards.entry(scope.key()).or_default().clone()
    }
}

/// Catalogue cachant, générique sur ses deux collaborateurs
///
/// La construction est une injection de dépendances explicite : aucun
/// registre global, l'appelant fournit la source distante et le store.
pub struct CachingCatalog<R, S> {
    remote: R,
    store: S,
    guards: ScopeGuards,
}

impl<R: RemoteSource, S: LocalStore> CachingCatalog<R, S> {
    /// Construit le catalogue à partir de ses deux collaborateurs
    pub fn new(remote: R, store: S) -> Self {
        Self {
            remote,
            store,
            guards: ScopeGuards::default(),
        }
    }

    /// Accès au store local (lectures annexes de la façade)
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Interroge tous les groupes
    pub async fn query_groups(&self, visitor: &mut dyn GroupsVisitor) -> Result<()> {
        let scope = Scope::Groups;
        if self.store.completeness(&scope)?.is_complete() {
            debug!(scope = %scope, "Serving scope from local store");
            return self.serve_groups(visitor);
        }

        let _guard = self.guards.guard(&scope).lock_owned().await;
        if self.store.completeness(&scope)?.is_complete() {
            debug!(scope = %scope, "Scope completed by a concurrent caller");
            return self.serve_groups(visitor);
        }

        debug!(scope = %scope, "Fetching scope from remote");
        let mut sink = GroupsSink {
            store: &self.store,
            inner: visitor,
            failure: None,
        };
        self.remote.query_groups(&mut sink).await?;
        if let Some(err) = sink.failure {
            warn!(scope = %scope, "Store failed during fetch, scope stays incomplete");
            return Err(err.into());
        }
        self.store.mark_complete(&scope)?;
        Ok(())
    }

    /// Interroge les auteurs par filtre de handle
    pub async fn query_authors_by_handle(
        &self,
        filter: &HandleFilter,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        self.query_authors(AuthorsQuery::ByHandle(filter), visitor)
            .await
    }

    /// Interroge les auteurs d'un pays
    pub async fn query_authors_by_country(
        &self,
        country: &Country,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        self.query_authors(AuthorsQuery::ByCountry(country), visitor)
            .await
    }

    /// Interroge les auteurs membres d'un groupe
    pub async fn query_authors_by_group(
        &self,
        group: &Group,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        self.query_authors(AuthorsQuery::ByGroup(group), visitor)
            .await
    }

    /// Chemin commun des trois portées d'auteurs
    async fn query_authors(
        &self,
        query: AuthorsQuery<'_>,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        let authors_scope = query.scope();
        let scope = Scope::Authors(authors_scope);
        if self.store.completeness(&scope)?.is_complete() {
            debug!(scope = %scope, "Serving scope from local store");
            return self.serve_authors(&authors_scope, visitor);
        }

        let _guard = self.guards.guard(&scope).lock_owned().await;
        if self.store.completeness(&scope)?.is_complete() {
            debug!(scope = %scope, "Scope completed by a concurrent caller");
            return self.serve_authors(&authors_scope, visitor);
        }

        debug!(scope = %scope, "Fetching scope from remote");
        // L'entité qui paramètre la portée est elle-même persistée
        match query {
            AuthorsQuery::ByCountry(country) => self.store.add_country(country)?,
            AuthorsQuery::ByGroup(group) => self.store.add_group(group)?,
            AuthorsQuery::ByHandle(_) => {}
        }

        let mut sink = AuthorsSink {
            store: &self.store,
            inner: visitor,
            membership: match query {
                AuthorsQuery::ByGroup(group) => Some(group.id),
                _ => None,
            },
            implied_country: match query {
                AuthorsQuery::ByCountry(country) => Some(country.id),
                _ => None,
            },
            failure: None,
        };
        match query {
            AuthorsQuery::ByHandle(filter) => {
                self.remote.query_authors_by_handle(filter, &mut sink).await?
            }
            AuthorsQuery::ByCountry(country) => {
                self.remote
                    .query_authors_by_country(country, &mut sink)
                    .await?
            }
            AuthorsQuery::ByGroup(group) => {
                self.remote.query_authors_by_group(group, &mut sink).await?
            }
        }
        if let Some(err) = sink.failure {
            warn!(scope = %scope, "Store failed during fetch, scope stays incomplete");
            return Err(err.into());
        }
        self.store.mark_complete(&scope)?;
        Ok(())
    }

    /// Interroge les pistes d'un auteur
    pub async fn query_tracks(
        &self,
        author: &Author,
        visitor: &mut dyn TracksVisitor,
    ) -> Result<()> {
        let scope = Scope::AuthorTracks(author.id);
        if self.store.completeness(&scope)?.is_complete() {
            debug!(scope = %scope, "Serving scope from local store");
            return self.serve_tracks(author.id, visitor);
        }

        let _guard = self.guards.guard(&scope).lock_owned().await;
        if self.store.completeness(&scope)?.is_complete() {
            debug!(scope = %scope, "Scope completed by a concurrent caller");
            return self.serve_tracks(author.id, visitor);
        }

        debug!(scope = %scope, "Fetching scope from remote");
        self.store.add_author(author)?;
        let mut sink = TracksSink {
            store: &self.store,
            inner: visitor,
            failure: None,
        };
        self.remote.query_tracks(author, &mut sink).await?;
        if let Some(err) = sink.failure {
            warn!(scope = %scope, "Store failed during fetch, scope stays incomplete");
            return Err(err.into());
        }
        self.store.mark_complete(&scope)?;
        Ok(())
    }

    /// Recherche de pistes par sous-chaîne
    ///
    /// Jamais de portée ni de complétude : l'espace des sous-chaînes est
    /// non borné. Toujours un appel distant vif ; chaque paire rencontrée
    /// est persistée de manière opportuniste ; aucun repli local en cas
    /// d'échec distant.
    pub async fn find_tracks(
        &self,
        query: &str,
        visitor: &mut dyn FoundTracksVisitor,
    ) -> Result<()> {
        debug!(query, "Searching tracks on remote");
        let mut sink = FoundTracksSink {
            store: &self.store,
            inner: visitor,
            failure: None,
        };
        self.remote.find_tracks(query, &mut sink).await?;
        if let Some(err) = sink.failure {
            return Err(err.into());
        }
        Ok(())
    }

    // ============ Service local ============

    fn serve_groups(&self, visitor: &mut dyn GroupsVisitor) -> Result<()> {
        let rows = self.store.read_groups()?;
        visitor.set_count_hint(rows.len());
        for row in rows {
            visitor.accept(row);
        }
        Ok(())
    }

    fn serve_authors(
        &self,
        scope: &AuthorsScope,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        let rows = self.store.read_authors(scope)?;
        visitor.set_count_hint(rows.len());
        for row in rows {
            visitor.accept(row);
        }
        Ok(())
    }

    fn serve_tracks(&self, author_id: u32, visitor: &mut dyn TracksVisitor) -> Result<()> {
        let rows = self.store.read_tracks(author_id)?;
        visitor.set_count_hint(rows.len());
        for row in rows {
            visitor.accept(row);
        }
        Ok(())
    }
}

/// Paramètres d'une requête d'auteurs
#[derive(Clone, Copy)]
enum AuthorsQuery<'a> {
    ByHandle(&'a HandleFilter),
    ByCountry(&'a Country),
    ByGroup(&'a Group),
}

impl AuthorsQuery<'_> {
    fn scope(&self) -> AuthorsScope {
        match self {
            Self::ByHandle(filter) => AuthorsScope::ByHandle(**filter),
            Self::ByCountry(country) => AuthorsScope::ByCountry(country.id),
            Self::ByGroup(group) => AuthorsScope::ByGroup(group.id),
        }
    }
}

// ============ Visiteurs internes ============
//
// Chaque visiteur interne persiste l'entité à l'arrivée puis la
// retransmet au visiteur de l'appelant, indication de total comprise.
// Un échec du store est mémorisé (première erreur) sans interrompre le
// flux : les livraisons déjà faites ne sont pas rétractées, et l'échec
// est rapporté à la fin de l'énumération, ce qui supprime aussi le
// marquage de complétude.

struct GroupsSink<'a, S: LocalStore> {
    store: &'a S,
    inner: &'a mut dyn GroupsVisitor,
    failure: Option<StoreError>,
}

impl<S: LocalStore> GroupsVisitor for GroupsSink<'_, S> {
    fn set_count_hint(&mut self, count: usize) {
        self.inner.set_count_hint(count);
    }

    fn accept(&mut self, group: Group) {
        if self.failure.is_none() {
            if let Err(err) = self.store.add_group(&group) {
                self.failure = Some(err);
            }
        }
        self.inner.accept(group);
    }
}

struct AuthorsSink<'a, S: LocalStore> {
    store: &'a S,
    inner: &'a mut dyn AuthorsVisitor,
    /// Groupe dont la portée implique l'appartenance
    membership: Option<u32>,
    /// Pays impliqué par la portée quand la ligne ne le porte pas
    implied_country: Option<u32>,
    failure: Option<StoreError>,
}

impl<S: LocalStore> AuthorsVisitor for AuthorsSink<'_, S> {
    fn set_count_hint(&mut self, count: usize) {
        self.inner.set_count_hint(count);
    }

    fn accept(&mut self, mut author: Author) {
        if author.country_id.is_none() {
            author.country_id = self.implied_country;
        }
        if self.failure.is_none() {
            let written = self.store.add_author(&author).and_then(|()| {
                match self.membership {
                    Some(group_id) => self.store.add_group_member(group_id, author.id),
                    None => Ok(()),
                }
            });
            if let Err(err) = written {
                self.failure = Some(err);
            }
        }
        self.inner.accept(author);
    }
}

struct TracksSink<'a, S: LocalStore> {
    store: &'a S,
    inner: &'a mut dyn TracksVisitor,
    failure: Option<StoreError>,
}

impl<S: LocalStore> TracksVisitor for TracksSink<'_, S> {
    fn set_count_hint(&mut self, count: usize) {
        self.inner.set_count_hint(count);
    }

    fn accept(&mut self, track: Track) {
        if self.failure.is_none() {
            if let Err(err) = self.store.add_track(&track) {
                self.failure = Some(err);
            }
        }
        self.inner.accept(track);
    }
}

struct FoundTracksSink<'a, S: LocalStore> {
    store: &'a S,
    inner: &'a mut dyn FoundTracksVisitor,
    failure: Option<StoreError>,
}

impl<S: LocalStore> FoundTracksVisitor for FoundTracksSink<'_, S> {
    fn set_count_hint(&mut self, count: usize) {
        self.inner.set_count_hint(count);
    }

    fn accept(&mut self, author: Author, track: Track) {
        if self.failure.is_none() {
            let written = self
                .store
                .add_author(&author)
                .and_then(|()| self.store.add_track(&track));
            if let Err(err) = written {
                self.failure = Some(err);
            }
        }
        self.inner.accept(author, track);
    }
}
