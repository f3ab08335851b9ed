//! Contrats de visiteurs pour la livraison en flux des résultats
//!
//! Chaque opération du catalogue pousse ses résultats un à un vers un
//! visiteur fourni par l'appelant. Le contrat est identique pour toutes
//! les opérations :
//! - `accept` est appelé zéro ou plusieurs fois, dans un ordre non
//!   spécifié sur lequel l'appelant ne doit pas compter ;
//! - `set_count_hint` est appelé au plus une fois, avec un total
//!   purement indicatif (affichage de progression, pas de correction).
//!
//! Les visiteurs sont `Send` : une récupération distante peut traverser
//! des points d'attente en les détenant. Les rappels s'exécutent de
//! manière synchrone sur le contexte d'exécution qui possède la
//! récupération.

use crate::models::{Author, Group, Track};

/// Visiteur de groupes
pub trait GroupsVisitor: Send {
    /// Indication facultative du nombre total d'éléments
    fn set_count_hint(&mut self, _count: usize) {}

    /// Reçoit un groupe
    fn accept(&mut self, group: Group);
}

/// Visiteur d'auteurs
pub trait AuthorsVisitor: Send {
    /// Indication facultative du nombre total d'éléments
    fn set_count_hint(&mut self, _count: usize) {}

    /// Reçoit un auteur
    fn accept(&mut self, author: Author);
}

/// Visiteur de pistes
pub trait TracksVisitor: Send {
    /// Indication facultative du nombre total d'éléments
    fn set_count_hint(&mut self, _count: usize) {}

    /// Reçoit une piste
    fn accept(&mut self, track: Track);
}

/// Visiteur de résultats de recherche : paires (auteur, piste)
pub trait FoundTracksVisitor: Send {
    /// Indication facultative du nombre total d'éléments
    fn set_count_hint(&mut self, _count: usize) {}

    /// Reçoit une paire (auteur, piste)
    fn accept(&mut self, author: Author, track: Track);
}

// Collecteurs de commodité : un Vec accumule le flux tel quel.

impl GroupsVisitor for Vec<Group> {
    fn accept(&mut self, group: Group) {
        self.push(group);
    }
}

impl AuthorsVisitor for Vec<Author> {
    fn accept(&mut self, author: Author) {
        self.push(author);
    }
}

impl TracksVisitor for Vec<Track> {
    fn accept(&mut self, track: Track) {
        self.push(track);
    }
}

impl FoundTracksVisitor for Vec<(Author, Track)> {
    fn accept(&mut self, author: Author, track: Track) {
        self.push((author, track));
    }
}
