//! # ampcatalog - Catalogue cachant AMP
//!
//! Cette crate est l'orchestrateur du moteur de catalogue : elle décide,
//! requête par requête, de servir depuis le store local, de récupérer
//! depuis la source distante, ou les deux, et possède les transitions de
//! complétude des portées ainsi que la dé-duplication des récupérations
//! en vol.
//!
//! ## Vue d'ensemble
//!
//! - [`CachingCatalog`] : l'algorithme central, générique sur les deux
//!   collaborateurs ([`RemoteSource`](ampremote::RemoteSource) et
//!   [`LocalStore`](ampstore::LocalStore)), injectés explicitement à la
//!   construction
//! - [`Catalog`] : la façade publique — les cinq formes de requête plus
//!   la table des pays — qui câble la source distante concrète et le
//!   store SQLite
//!
//! ## Algorithme par portée énumérable
//!
//! 1. Lire l'état de la portée dans le store local
//! 2. Si complète : servir les lignes stockées (ordre stable), envoyer
//!    le nombre exact en indication, aucun accès réseau
//! 3. Sinon : récupérer la portée exacte depuis la source distante à
//!    travers un visiteur interne qui persiste chaque entité à l'arrivée
//!    puis la retransmet ; si l'énumération aboutit sans erreur, marquer
//!    la portée complète ; sinon propager l'échec — les lignes déjà
//!    persistées restent, la portée reste non complète et le prochain
//!    appel re-récupère tout (les upserts idempotents rendent la
//!    re-livraison inoffensive)
//!
//! La recherche ([`Catalog::find_tracks`]) ne consulte ni ne pose jamais
//! de complétude : toujours un appel distant vif, avec persistance
//! opportuniste de chaque paire (auteur, piste) rencontrée.
//!
//! ## Structure des modules
//!
//! ```text
//! ampcatalog/
//! ├── src/
//! │   ├── lib.rs       # Module principal (ce fichier)
//! │   ├── caching.rs   # CachingCatalog et dé-duplication en vol
//! │   ├── facade.rs    # Façade publique
//! │   └── error.rs     # Gestion des erreurs
//! ```
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use ampcatalog::Catalog;
//! use ampconfig::Config;
//! use ampmodel::Author;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("")?;
//!     let catalog = Catalog::from_config(&config)?;
//!
//!     let mut authors: Vec<Author> = Vec::new();
//!     catalog.query_authors_by_handle(&"a".parse()?, &mut authors).await?;
//!     for author in &authors {
//!         println!("{} ({:?})", author.handle, author.real_name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod caching;
pub mod error;
pub mod facade;

pub use caching::CachingCatalog;
pub use error::{CatalogError, Result};
pub use facade::Catalog;
