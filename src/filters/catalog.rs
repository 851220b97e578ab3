//! Choices offered by the filter panel. The service uses Spanish genre names.

pub const CERTIFICATIONS: &[&str] = &[
    "G", "PG", "PG-13", "R", "NC-17", "TV-G", "TV-PG", "TV-14", "TV-MA",
];

pub const GENRES: &[&str] = &[
    "Acción",
    "Aventura",
    "Animación",
    "Documental",
    "Familia",
    "Fantasía",
    "Música",
    "Ciencia ficción",
    "Película de TV",
    "Crimen",
    "Drama",
    "Historia",
    "Terror",
    "Misterio",
    "Romance",
    "Suspense",
    "Bélica",
    "Western",
    "Comedia",
];

pub fn is_known_genre(name: &str) -> bool {
    GENRES.contains(&name)
}

pub fn is_known_certification(code: &str) -> bool {
    CERTIFICATIONS.contains(&code)
}
