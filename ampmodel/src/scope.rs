//! Portées de requête et état de complétude du cache
//!
//! Une [`Scope`] identifie une requête énumérable (« les auteurs dont le
//! handle commence par A ») et indexe l'état du cache local : un ensemble
//! de lignes déjà persistées plus un drapeau de complétude. La recherche
//! par sous-chaîne n'est volontairement pas une portée : son espace de
//! requêtes est non borné et ses résultats ne sont jamais marqués complets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinelle du filtre de handle : auteurs dont le handle ne commence
/// pas par une lettre
pub const NON_LETTER_FILTER: &str = "0-9";

/// Filtre de handle : une partition de l'espace des auteurs, pas une
/// recherche par sous-chaîne
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleFilter {
    /// Les auteurs dont le handle commence par cette lettre (A..Z)
    Letter(char),
    /// Les auteurs dont le handle ne commence pas par une lettre (`0-9`)
    NonLetter,
}

/// Erreur de parsing d'un filtre de handle
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid handle filter: {0:?} (expected a single letter or \"0-9\")")]
pub struct ParseHandleFilterError(pub String);

impl HandleFilter {
    /// Construit un filtre depuis une lettre, normalisée en majuscule
    pub fn letter(letter: char) -> Result<Self, ParseHandleFilterError> {
        if letter.is_ascii_alphabetic() {
            Ok(Self::Letter(letter.to_ascii_uppercase()))
        } else {
            Err(ParseHandleFilterError(letter.to_string()))
        }
    }
}

impl FromStr for HandleFilter {
    type Err = ParseHandleFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == NON_LETTER_FILTER {
            return Ok(Self::NonLetter);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::letter(c),
            _ => Err(ParseHandleFilterError(s.to_string())),
        }
    }
}

impl fmt::Display for HandleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Letter(c) => write!(f, "{c}"),
            Self::NonLetter => f.write_str(NON_LETTER_FILTER),
        }
    }
}

/// Portée d'une requête d'auteurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorsScope {
    /// Auteurs par filtre de handle
    ByHandle(HandleFilter),
    /// Auteurs d'un pays
    ByCountry(u32),
    /// Auteurs membres d'un groupe
    ByGroup(u32),
}

/// Portée d'une requête énumérable du catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    /// Tous les groupes
    Groups,
    /// Auteurs selon une sous-portée
    Authors(AuthorsScope),
    /// Pistes d'un auteur
    AuthorTracks(u32),
}

impl Scope {
    /// Clé textuelle stable de la portée, utilisée par la table de
    /// complétude du store local
    pub fn key(&self) -> String {
        match self {
            Self::Groups => "groups".to_string(),
            Self::Authors(AuthorsScope::ByHandle(filter)) => {
                format!("authors:handle:{filter}")
            }
            Self::Authors(AuthorsScope::ByCountry(id)) => format!("authors:country:{id}"),
            Self::Authors(AuthorsScope::ByGroup(id)) => format!("authors:group:{id}"),
            Self::AuthorTracks(id) => format!("tracks:author:{id}"),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// État de complétude d'une portée dans le store local
///
/// `Partial` et `Absent` sont traités à l'identique pour la décision de
/// re-récupération : seule `Complete` autorise un service purement local.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Completeness {
    /// Aucune ligne connue pour cette portée
    Absent,
    /// Des lignes existent mais l'énumération distante n'a jamais abouti
    Partial,
    /// Le store détient la réponse distante entière pour cette portée
    Complete,
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}
