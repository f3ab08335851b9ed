//! Exemple de navigation basique dans le catalogue
//!
//! Cet exemple montre comment :
//! - Assembler le catalogue depuis la configuration
//! - Lister les auteurs dont le handle commence par une lettre
//! - Lister les pistes d'un auteur (servies localement au second appel)
//! - Rechercher des pistes par sous-chaîne

use ampcatalog::Catalog;
use ampconfig::Config;
use ampmodel::{Author, Track};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialiser le logging
    tracing_subscriber::fmt::init();

    println!("=== ampcat - Exemple de navigation basique ===\n");

    let config = Config::load("")?;
    let catalog = Catalog::from_config(&config)?;

    println!("--- Pays connus ---");
    let countries = catalog.countries()?;
    println!("✓ {} pays\n", countries.len());

    println!("--- Auteurs en 'A' ---");
    let filter = "a".parse()?;
    let mut authors: Vec<Author> = Vec::new();
    catalog.query_authors_by_handle(&filter, &mut authors).await?;
    println!("✓ {} auteur(s)\n", authors.len());

    for author in authors.iter().take(5) {
        match &author.real_name {
            Some(real_name) => println!("  {} ({})", author.handle, real_name),
            None => println!("  {}", author.handle),
        }
    }

    // Lister les pistes du premier auteur
    if let Some(first) = authors.first() {
        println!("\n--- Pistes de {} ---", first.handle);
        let mut tracks: Vec<Track> = Vec::new();
        catalog.query_tracks(first, &mut tracks).await?;
        for track in tracks.iter().take(5) {
            match track.size_bytes {
                Some(size) => println!("  {} ({} octets)", track.filename, size),
                None => println!("  {}", track.filename),
            }
        }

        // Second appel : servi depuis le store local, sans réseau
        let mut cached: Vec<Track> = Vec::new();
        catalog.query_tracks(first, &mut cached).await?;
        println!("✓ {} piste(s), re-servies localement", cached.len());
    }

    println!("\n--- Recherche ---");
    let mut found: Vec<(Author, Track)> = Vec::new();
    catalog.find_tracks("intro", &mut found).await?;
    println!("✓ {} résultat(s)", found.len());
    for (author, track) in found.iter().take(5) {
        println!("  {} - {}", author.handle, track.filename);
    }

    Ok(())
}
