//! Gestion des erreurs du catalogue cachant

use thiserror::Error;

/// Type Result personnalisé pour ampcatalog
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Erreurs d'une opération du catalogue
///
/// La taxonomie des collaborateurs est conservée telle quelle : une
/// erreur distante (transport ou réponse malformée) signifie « la
/// récupération de cette portée a échoué », une erreur du store signifie
/// que la persistance locale a échoué — jamais silencieusement
/// assimilée à une portée complète.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Échec de la récupération distante (transport ou parsing)
    #[error("remote fetch failed: {0}")]
    Remote(#[from] ampremote::RemoteError),

    /// Échec du store local
    #[error("local store failed: {0}")]
    Store(#[from] ampstore::StoreError),
}
