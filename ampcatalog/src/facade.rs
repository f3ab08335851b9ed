//! Façade publique du catalogue
//!
//! [`Catalog`] est la surface de requête que tous les appelants
//! utilisent : les cinq formes de requête, transmises telles quelles au
//! catalogue cachant avec la portée dérivée des arguments, plus la table
//! des pays servie localement. Aucun autre état.

use std::sync::Arc;

use tracing::info;

use ampmodel::{
    Author, AuthorsVisitor, Country, FoundTracksVisitor, Group, GroupsVisitor, HandleFilter,
    TracksVisitor,
};
use ampremote::{AlwaysConnected, Connectivity, RemoteCatalog};
use ampstore::{LocalStore, Store};

use crate::caching::CachingCatalog;
use crate::error::Result;

/// Surface de requête publique du catalogue AMP
pub struct Catalog {
    inner: CachingCatalog<RemoteCatalog, Store>,
}

impl Catalog {
    /// Câble une source distante et un store déjà construits
    ///
    /// # Arguments
    ///
    /// * `remote` - Source distante configurée
    /// * `store` - Store local ouvert
    pub fn new(remote: RemoteCatalog, store: Store) -> Self {
        info!("Catalog assembled");
        Self {
            inner: CachingCatalog::new(remote, store),
        }
    }

    /// Construit le catalogue complet depuis la configuration
    ///
    /// La politique de connectivité par défaut est permissive ; les
    /// hôtes disposant d'un service de joignabilité passent le leur via
    /// [`Catalog::from_config_with_policy`].
    pub fn from_config(config: &ampconfig::Config) -> Result<Self> {
        Self::from_config_with_policy(config, Arc::new(AlwaysConnected))
    }

    /// Construit le catalogue depuis la configuration avec une politique
    /// de connectivité explicite
    pub fn from_config_with_policy(
        config: &ampconfig::Config,
        connectivity: Arc<dyn Connectivity>,
    ) -> Result<Self> {
        let remote = RemoteCatalog::from_config(config, connectivity)?;
        let store = Store::from_config(config)?;
        Ok(Self::new(remote, store))
    }

    /// Interroge tous les groupes
    pub async fn query_groups(&self, visitor: &mut dyn GroupsVisitor) -> Result<()> {
        self.inner.query_groups(visitor).await
    }

    /// Interroge les auteurs par filtre de handle (lettre ou `0-9`)
    pub async fn query_authors_by_handle(
        &self,
        filter: &HandleFilter,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        self.inner.query_authors_by_handle(filter, visitor).await
    }

    /// Interroge les auteurs d'un pays
    pub async fn query_authors_by_country(
        &self,
        country: &Country,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        self.inner.query_authors_by_country(country, visitor).await
    }

    /// Interroge les auteurs membres d'un groupe
    pub async fn query_authors_by_group(
        &self,
        group: &Group,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        self.inner.query_authors_by_group(group, visitor).await
    }

    /// Interroge les pistes d'un auteur
    pub async fn query_tracks(
        &self,
        author: &Author,
        visitor: &mut dyn TracksVisitor,
    ) -> Result<()> {
        self.inner.query_tracks(author, visitor).await
    }

    /// Recherche des pistes par sous-chaîne (toujours distant)
    pub async fn find_tracks(
        &self,
        query: &str,
        visitor: &mut dyn FoundTracksVisitor,
    ) -> Result<()> {
        self.inner.find_tracks(query, visitor).await
    }

    /// Table des pays, servie localement
    ///
    /// Le service distant n'expose pas de liste de pays : la table fixe
    /// est embarquée par le store.
    pub fn countries(&self) -> Result<Vec<Country>> {
        Ok(self.inner.store().read_countries()?)
    }
}
