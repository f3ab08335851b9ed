//! Structures de données pour représenter les entités du catalogue AMP

use serde::{Deserialize, Serialize};

/// Représente un groupe (équipe de production) du catalogue
///
/// Relation plusieurs-à-plusieurs avec [`Author`] : l'appartenance est
/// enregistrée par le store local lorsqu'une portée par groupe est parcourue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    /// Identifiant unique du groupe
    pub id: u32,
    /// Nom du groupe
    pub name: String,
}

impl Group {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Représente un pays d'origine d'auteurs
///
/// Le service distant n'expose pas de liste de pays : la table est fixe
/// et embarquée par le store local.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Identifiant unique du pays
    pub id: u32,
    /// Nom du pays
    pub name: String,
}

impl Country {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Représente un auteur du catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Identifiant unique de l'auteur
    pub id: u32,
    /// Pseudonyme (handle) de l'auteur
    pub handle: String,
    /// Nom réel (optionnel, absent de certaines pages)
    #[serde(default)]
    pub real_name: Option<String>,
    /// Référence vers le pays d'origine, si connue
    ///
    /// Renseignée quand la portée qui a produit la ligne l'implique
    /// (auteurs par pays) ou quand la page distante la porte. Un upsert
    /// n'écrase jamais un pays connu par une valeur inconnue.
    #[serde(default)]
    pub country_id: Option<u32>,
}

impl Author {
    pub fn new(id: u32, handle: impl Into<String>) -> Self {
        Self {
            id,
            handle: handle.into(),
            real_name: None,
            country_id: None,
        }
    }

    pub fn with_real_name(mut self, real_name: impl Into<String>) -> Self {
        self.real_name = Some(real_name.into());
        self
    }

    pub fn with_country(mut self, country_id: u32) -> Self {
        self.country_id = Some(country_id);
        self
    }
}

/// Représente une piste (module) d'un auteur
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Identifiant unique de la piste
    pub id: u32,
    /// Référence vers l'auteur
    pub author_id: u32,
    /// Nom de fichier du module
    pub filename: String,
    /// Titre (optionnel, seules certaines pages le portent)
    #[serde(default)]
    pub title: Option<String>,
    /// Taille en octets (optionnelle)
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

impl Track {
    pub fn new(id: u32, author_id: u32, filename: impl Into<String>) -> Self {
        Self {
            id,
            author_id,
            filename: filename.into(),
            title: None,
            size_bytes: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }
}
