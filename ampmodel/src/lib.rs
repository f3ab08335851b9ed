//! # ampmodel - Modèle de données du catalogue AMP
//!
//! Cette crate définit les types valeur échangés entre la source distante,
//! le store local et les appelants du catalogue :
//! - Les entités : [`Group`], [`Country`], [`Author`], [`Track`]
//! - Les portées de requête ([`Scope`]) qui indexent l'état du cache
//! - Le filtre de handle ([`HandleFilter`]) : une lettre ou la sentinelle `0-9`
//! - Les visiteurs ([`GroupsVisitor`], [`AuthorsVisitor`], [`TracksVisitor`],
//!   [`FoundTracksVisitor`]) par lesquels les résultats sont poussés un à un
//!
//! Les entités sont immuables une fois récupérées : l'identité (`id`) est
//! stable et globalement unique par genre d'entité, et une ré-récupération
//! du même id ne crée jamais de doublon (upsert idempotent côté store).
//!
//! ## Structure des modules
//!
//! ```text
//! ampmodel/
//! ├── src/
//! │   ├── lib.rs       # Module principal (ce fichier)
//! │   ├── models.rs    # Entités du catalogue
//! │   ├── scope.rs     # Portées de requête et complétude
//! │   └── visitor.rs   # Contrats de visiteurs
//! ```

pub mod models;
pub mod scope;
pub mod visitor;

pub use models::{Author, Country, Group, Track};
pub use scope::{
    AuthorsScope, Completeness, HandleFilter, ParseHandleFilterError, Scope, NON_LETTER_FILTER,
};
pub use visitor::{AuthorsVisitor, FoundTracksVisitor, GroupsVisitor, TracksVisitor};
