//! Remote source boundary
//!
//! [`RemoteSource`] is the interface the caching layer consumes: the
//! five query shapes, each streaming entities to a visitor, each either
//! completing the enumeration or failing as a whole. [`RemoteCatalog`]
//! is the production implementation; tests substitute their own.

use async_trait::async_trait;

use ampmodel::{
    Author, AuthorsVisitor, Country, FoundTracksVisitor, Group, GroupsVisitor, HandleFilter,
    TracksVisitor,
};

use crate::client::RemoteCatalog;
use crate::error::Result;

/// Network-facing side of the catalogue
///
/// Ordering of `accept` calls is unspecified; the count hint is advisory
/// and delivered at most once. A failure after partial streaming leaves
/// the visitor with an incomplete subset — the adapter offers no
/// transactionality.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Queries all groups
    async fn query_groups(&self, visitor: &mut dyn GroupsVisitor) -> Result<()>;

    /// Queries authors by handle filter (a letter, or `0-9` for
    /// non-letter handles)
    async fn query_authors_by_handle(
        &self,
        filter: &HandleFilter,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()>;

    /// Queries the authors of a country
    async fn query_authors_by_country(
        &self,
        country: &Country,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()>;

    /// Queries the member authors of a group
    async fn query_authors_by_group(
        &self,
        group: &Group,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()>;

    /// Queries an author's tracks
    async fn query_tracks(&self, author: &Author, visitor: &mut dyn TracksVisitor) -> Result<()>;

    /// Finds tracks whose filename or title contains the query substring
    async fn find_tracks(&self, query: &str, visitor: &mut dyn FoundTracksVisitor) -> Result<()>;
}

#[async_trait]
impl RemoteSource for RemoteCatalog {
    async fn query_groups(&self, visitor: &mut dyn GroupsVisitor) -> Result<()> {
        RemoteCatalog::query_groups(self, visitor).await
    }

    async fn query_authors_by_handle(
        &self,
        filter: &HandleFilter,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        RemoteCatalog::query_authors_by_handle(self, filter, visitor).await
    }

    async fn query_authors_by_country(
        &self,
        country: &Country,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        RemoteCatalog::query_authors_by_country(self, country.id, visitor).await
    }

    async fn query_authors_by_group(
        &self,
        group: &Group,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        RemoteCatalog::query_authors_by_group(self, group.id, visitor).await
    }

    async fn query_tracks(&self, author: &Author, visitor: &mut dyn TracksVisitor) -> Result<()> {
        RemoteCatalog::query_tracks(self, author.id, visitor).await
    }

    async fn find_tracks(&self, query: &str, visitor: &mut dyn FoundTracksVisitor) -> Result<()> {
        RemoteCatalog::find_tracks(self, query, visitor).await
    }
}
