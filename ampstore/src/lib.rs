//! # ampstore - Store local du catalogue AMP
//!
//! Cette crate fournit l'adaptateur de persistance du catalogue : une base
//! SQLite qui conserve les entités récupérées du service distant ainsi que
//! l'état de complétude de chaque portée de requête.
//!
//! ## Vue d'ensemble
//!
//! - Écritures idempotentes par identité (`INSERT .. ON CONFLICT DO UPDATE`) :
//!   ré-insérer une entité déjà connue ne crée jamais de doublon
//! - Drapeau de complétude par portée : une portée marquée complète peut
//!   être servie sans aucun accès réseau
//! - Associations (appartenance aux groupes) enregistrées à côté des
//!   lignes d'auteurs quand la portée les implique
//! - Table des pays fixe, embarquée au premier démarrage : le service
//!   distant n'expose pas de liste de pays
//! - Aucune éviction : le cache est append-mostly, borné par la taille du
//!   catalogue distant
//!
//! Les lectures ne touchent jamais le réseau et ne bloquent que sur les
//! E/S locales. L'accès concurrent est sérialisé par un mutex sur la
//! connexion, comme pour les autres caches SQLite du projet.

mod countries;

pub mod db;
pub mod error;
pub mod store_trait;

pub use db::Store;
pub use error::{Result, StoreError};
pub use store_trait::LocalStore;
