//! Gestion des erreurs du store local

use thiserror::Error;

/// Type Result personnalisé pour ampstore
pub type Result<T> = std::result::Result<T, StoreError>;

/// Erreurs du moteur de persistance
///
/// Une erreur du store est toujours propagée à l'appelant : une portée
/// n'est jamais considérée complète par défaut quand la persistance
/// échoue.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Erreur SQLite (E/S disque, corruption, contrainte)
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Erreur de configuration (anyhow)
    #[error("configuration error: {0}")]
    Config(#[from] anyhow::Error),
}
