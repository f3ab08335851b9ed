//! Table fixe des pays
//!
//! Le service distant n'expose aucune liste de pays : comme dans le
//! navigateur d'origine, la table est embarquée et les identifiants sont
//! les positions dans cette table fixe. Elle est semée dans la base au
//! premier démarrage et servie localement par [`crate::Store::countries`].

/// Liste fixe (id, nom) des pays du catalogue
pub(crate) const COUNTRIES: &[(u32, &str)] = &[
    (1, "Australia"),
    (2, "Austria"),
    (3, "Belgium"),
    (4, "Brazil"),
    (5, "Canada"),
    (6, "Croatia"),
    (7, "Czech Republic"),
    (8, "Denmark"),
    (9, "Estonia"),
    (10, "Finland"),
    (11, "France"),
    (12, "Germany"),
    (13, "Greece"),
    (14, "Hungary"),
    (15, "Ireland"),
    (16, "Israel"),
    (17, "Italy"),
    (18, "Japan"),
    (19, "Latvia"),
    (20, "Lithuania"),
    (21, "Netherlands"),
    (22, "New Zealand"),
    (23, "Norway"),
    (24, "Poland"),
    (25, "Portugal"),
    (26, "Romania"),
    (27, "Russia"),
    (28, "Slovakia"),
    (29, "Slovenia"),
    (30, "Spain"),
    (31, "Sweden"),
    (32, "Switzerland"),
    (33, "Ukraine"),
    (34, "United Kingdom"),
    (35, "USA"),
];
