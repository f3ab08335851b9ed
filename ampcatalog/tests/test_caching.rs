//! Tests des propriétés du catalogue cachant : barrière de complétude,
//! au-plus-une-récupération-en-vol, recherche sans complétude, cache
//! réutilisable après échec, propagation des erreurs du store.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ampcatalog::{CachingCatalog, CatalogError};
use ampmodel::{
    Author, AuthorsScope, AuthorsVisitor, Completeness, Country, FoundTracksVisitor, Group,
    GroupsVisitor, HandleFilter, Scope, Track, TracksVisitor,
};
use ampremote::{RemoteError, RemoteSource};
use ampstore::{LocalStore, Store, StoreError};

/// Source distante simulée
///
/// Compte ses invocations, peut retarder chaque appel (pour élargir la
/// fenêtre de course des tests concurrents) et peut faire échouer ses
/// premiers appels après avoir déjà poussé `fail_after` entités.
#[derive(Default)]
struct MockRemote {
    groups: Vec<Group>,
    authors: Vec<Author>,
    tracks: Vec<Track>,
    found: Vec<(Author, Track)>,
    hint_override: Option<usize>,
    delay: Duration,
    fail_after: usize,
    failures_left: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl MockRemote {
    fn new() -> Self {
        Self::default()
    }

    fn calls_handle(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    /// Comptabilise l'appel et décide s'il doit échouer
    async fn begin(&self) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn hint(&self, len: usize) -> usize {
        self.hint_override.unwrap_or(len)
    }
}

#[async_trait]
impl RemoteSource for MockRemote {
    async fn query_groups(&self, visitor: &mut dyn GroupsVisitor) -> ampremote::Result<()> {
        let fail = self.begin().await;
        visitor.set_count_hint(self.hint(self.groups.len()));
        let limit = if fail { self.fail_after } else { self.groups.len() };
        for group in self.groups.iter().take(limit) {
            visitor.accept(group.clone());
        }
        if fail {
            return Err(RemoteError::Status(500));
        }
        Ok(())
    }

    async fn query_authors_by_handle(
        &self,
        _filter: &HandleFilter,
        visitor: &mut dyn AuthorsVisitor,
    ) -> ampremote::Result<()> {
        let fail = self.begin().await;
        visitor.set_count_hint(self.hint(self.authors.len()));
        let limit = if fail { self.fail_after } else { self.authors.len() };
        for author in self.authors.iter().take(limit) {
            visitor.accept(author.clone());
        }
        if fail {
            return Err(RemoteError::Status(500));
        }
        Ok(())
    }

    async fn query_authors_by_country(
        &self,
        _country: &Country,
        visitor: &mut dyn AuthorsVisitor,
    ) -> ampremote::Result<()> {
        self.query_authors_by_handle(&HandleFilter::NonLetter, visitor)
            .await
    }

    async fn query_authors_by_group(
        &self,
        _group: &Group,
        visitor: &mut dyn AuthorsVisitor,
    ) -> ampremote::Result<()> {
        self.query_authors_by_handle(&HandleFilter::NonLetter, visitor)
            .await
    }

    async fn query_tracks(
        &self,
        _author: &Author,
        visitor: &mut dyn TracksVisitor,
    ) -> ampremote::Result<()> {
        let fail = self.begin().await;
        visitor.set_count_hint(self.hint(self.tracks.len()));
        let limit = if fail { self.fail_after } else { self.tracks.len() };
        for track in self.tracks.iter().take(limit) {
            visitor.accept(track.clone());
        }
        if fail {
            return Err(RemoteError::Status(500));
        }
        Ok(())
    }

    async fn find_tracks(
        &self,
        _query: &str,
        visitor: &mut dyn FoundTracksVisitor,
    ) -> ampremote::Result<()> {
        let fail = self.begin().await;
        visitor.set_count_hint(self.hint(self.found.len()));
        let limit = if fail { self.fail_after } else { self.found.len() };
        for (author, track) in self.found.iter().take(limit) {
            visitor.accept(author.clone(), track.clone());
        }
        if fail {
            return Err(RemoteError::Status(500));
        }
        Ok(())
    }
}

/// Visiteur enregistreur : entités et indication de total
struct Recording<T> {
    items: Vec<T>,
    hint: Option<usize>,
}

impl<T> Default for Recording<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            hint: None,
        }
    }
}

impl AuthorsVisitor for Recording<Author> {
    fn set_count_hint(&mut self, count: usize) {
        self.hint = Some(count);
    }

    fn accept(&mut self, author: Author) {
        self.items.push(author);
    }
}

impl TracksVisitor for Recording<Track> {
    fn set_count_hint(&mut self, count: usize) {
        self.hint = Some(count);
    }

    fn accept(&mut self, track: Track) {
        self.items.push(track);
    }
}

fn sample_authors() -> Vec<Author> {
    vec![
        Author::new(1, "abba").with_real_name("Agnetha"),
        Author::new(2, "ace"),
    ]
}

fn sample_tracks() -> Vec<Track> {
    vec![
        Track::new(10, 1, "mod.intro").with_size(12 * 1024),
        Track::new(11, 1, "mod.loader"),
        Track::new(12, 1, "mod.end"),
    ]
}

// Scénario de la spécification : premier appel distant, second servi
// localement avec le même contenu.
#[tokio::test]
async fn test_completeness_gate_authors_by_letter() {
    let remote = MockRemote {
        authors: sample_authors(),
        ..MockRemote::new()
    };
    let calls = remote.calls_handle();
    let catalog = CachingCatalog::new(remote, Store::open_in_memory().unwrap());
    let filter = HandleFilter::Letter('A');
    let scope = Scope::Authors(AuthorsScope::ByHandle(filter));

    let mut first = Recording::<Author>::default();
    catalog
        .query_authors_by_handle(&filter, &mut first)
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.hint, Some(2));
    assert_eq!(first.items, sample_authors());
    assert_eq!(
        catalog.store().completeness(&scope).unwrap(),
        Completeness::Complete
    );

    // Second appel : zéro accès réseau, mêmes entités depuis le store
    let mut second = Recording::<Author>::default();
    catalog
        .query_authors_by_handle(&filter, &mut second)
        .await
        .unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.hint, Some(2));
    assert_eq!(second.items, sample_authors());
}

#[tokio::test]
async fn test_groups_are_cached_after_one_fetch() {
    let remote = MockRemote {
        groups: vec![Group::new(5, "The Silents"), Group::new(9, "Razor 1911")],
        ..MockRemote::new()
    };
    let calls = remote.calls_handle();
    let catalog = CachingCatalog::new(remote, Store::open_in_memory().unwrap());

    let mut first: Vec<Group> = Vec::new();
    catalog.query_groups(&mut first).await.unwrap();
    let mut second: Vec<Group> = Vec::new();
    catalog.query_groups(&mut second).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first, second);
    assert_eq!(
        catalog.store().completeness(&Scope::Groups).unwrap(),
        Completeness::Complete
    );
}

// Propriété centrale sous concurrence : N appelants simultanés sur une
// même portée non complète → exactement une invocation distante, et
// chaque visiteur observe l'ensemble entier.
#[tokio::test]
async fn test_at_most_one_fetch_in_flight_per_scope() {
    let remote = MockRemote {
        authors: sample_authors(),
        delay: Duration::from_millis(50),
        ..MockRemote::new()
    };
    let calls = remote.calls_handle();
    let catalog = Arc::new(CachingCatalog::new(
        remote,
        Store::open_in_memory().unwrap(),
    ));
    let filter = HandleFilter::Letter('A');

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let catalog = catalog.clone();
        tasks.push(tokio::spawn(async move {
            let mut sink: Vec<Author> = Vec::new();
            catalog
                .query_authors_by_handle(&filter, &mut sink)
                .await
                .unwrap();
            sink
        }));
    }

    for task in tasks {
        let mut seen = task.await.unwrap();
        seen.sort_by_key(|author| author.id);
        assert_eq!(seen, sample_authors());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

// Les verrous sont par portée : deux portées distinctes ne partagent
// pas leur dé-duplication.
#[tokio::test]
async fn test_distinct_scopes_fetch_independently() {
    let remote = MockRemote {
        authors: sample_authors(),
        delay: Duration::from_millis(20),
        ..MockRemote::new()
    };
    let calls = remote.calls_handle();
    let catalog = Arc::new(CachingCatalog::new(
        remote,
        Store::open_in_memory().unwrap(),
    ));

    let a = {
        let catalog = catalog.clone();
        tokio::spawn(async move {
            let mut sink: Vec<Author> = Vec::new();
            catalog
                .query_authors_by_handle(&HandleFilter::Letter('A'), &mut sink)
                .await
                .unwrap();
        })
    };
    let b = {
        let catalog = catalog.clone();
        tokio::spawn(async move {
            let mut sink: Vec<Author> = Vec::new();
            catalog
                .query_authors_by_country(&Country::new(31, "Sweden"), &mut sink)
                .await
                .unwrap();
        })
    };
    a.await.unwrap();
    b.await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// Un attendant dont le prédécesseur a échoué refait la récupération
// lui-même : toujours au plus une en vol à la fois.
#[tokio::test]
async fn test_waiter_retries_after_predecessor_failure() {
    let remote = MockRemote {
        authors: sample_authors(),
        delay: Duration::from_millis(30),
        fail_after: 0,
        failures_left: Arc::new(AtomicUsize::new(1)),
        ..MockRemote::new()
    };
    let calls = remote.calls_handle();
    let catalog = Arc::new(CachingCatalog::new(
        remote,
        Store::open_in_memory().unwrap(),
    ));
    let filter = HandleFilter::Letter('A');

    let mut tasks = Vec::new();
    for _ in 0..2 {
        let catalog = catalog.clone();
        tasks.push(tokio::spawn(async move {
            let mut sink: Vec<Author> = Vec::new();
            let outcome = catalog.query_authors_by_handle(&filter, &mut sink).await;
            (outcome.is_ok(), sink)
        }));
    }

    let mut outcomes = Vec::new();
    for task in tasks {
        outcomes.push(task.await.unwrap());
    }

    // Un échec, un succès ; le succès a vu l'ensemble entier
    assert_eq!(outcomes.iter().filter(|(ok, _)| *ok).count(), 1);
    let (_, seen) = outcomes.into_iter().find(|(ok, _)| *ok).unwrap();
    assert_eq!(seen, sample_authors());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        catalog
            .store()
            .completeness(&Scope::Authors(AuthorsScope::ByHandle(filter)))
            .unwrap(),
        Completeness::Complete
    );
}

// Scénario de la spécification : échec après une piste livrée, puis
// nouvelle tentative intégrale sans doublon.
#[tokio::test]
async fn test_failure_leaves_cache_reusable() {
    let remote = MockRemote {
        tracks: sample_tracks(),
        fail_after: 1,
        failures_left: Arc::new(AtomicUsize::new(1)),
        ..MockRemote::new()
    };
    let calls = remote.calls_handle();
    let catalog = CachingCatalog::new(remote, Store::open_in_memory().unwrap());
    let author = Author::new(1, "abba");
    let scope = Scope::AuthorTracks(1);

    let mut first = Recording::<Track>::default();
    let err = catalog.query_tracks(&author, &mut first).await.unwrap_err();
    assert!(matches!(err, CatalogError::Remote(RemoteError::Status(500))));
    // Une piste livrée avant l'échec, non rétractée
    assert_eq!(first.items.len(), 1);
    assert_ne!(
        catalog.store().completeness(&scope).unwrap(),
        Completeness::Complete
    );

    // La nouvelle tentative re-livre tout, sans doublon de la piste déjà vue
    let mut second = Recording::<Track>::default();
    catalog.query_tracks(&author, &mut second).await.unwrap();
    assert_eq!(second.items, sample_tracks());
    assert_eq!(catalog.store().read_tracks(1).unwrap(), sample_tracks());
    assert_eq!(
        catalog.store().completeness(&scope).unwrap(),
        Completeness::Complete
    );

    // Et la portée est désormais servie localement
    let mut third = Recording::<Track>::default();
    catalog.query_tracks(&author, &mut third).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// La recherche n'est jamais une portée : aucun drapeau posé, mais
// chaque paire rencontrée est persistée.
#[tokio::test]
async fn test_search_never_completes_a_scope() {
    let author = Author::new(1, "abba");
    let track = Track::new(10, 1, "mod.intro");
    let remote = MockRemote {
        found: vec![(author.clone(), track.clone())],
        ..MockRemote::new()
    };
    let calls = remote.calls_handle();
    let catalog = CachingCatalog::new(remote, Store::open_in_memory().unwrap());

    let mut found: Vec<(Author, Track)> = Vec::new();
    catalog.find_tracks("intro", &mut found).await.unwrap();
    assert_eq!(found, vec![(author.clone(), track.clone())]);

    // Les paires sont dans le store, mais aucune portée n'est complète
    assert_eq!(catalog.store().read_tracks(1).unwrap(), vec![track]);
    assert_ne!(
        catalog.store().completeness(&Scope::AuthorTracks(1)).unwrap(),
        Completeness::Complete
    );

    // Chaque recherche repart au distant
    let mut again: Vec<(Author, Track)> = Vec::new();
    catalog.find_tracks("intro", &mut again).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

// La portée par groupe enregistre le groupe et les appartenances, puis
// se sert localement.
#[tokio::test]
async fn test_group_scope_records_membership() {
    let remote = MockRemote {
        authors: sample_authors(),
        ..MockRemote::new()
    };
    let calls = remote.calls_handle();
    let catalog = CachingCatalog::new(remote, Store::open_in_memory().unwrap());
    let group = Group::new(5, "The Silents");

    let mut first: Vec<Author> = Vec::new();
    catalog
        .query_authors_by_group(&group, &mut first)
        .await
        .unwrap();

    // Le groupe paramètre est persisté avec les appartenances
    assert_eq!(catalog.store().read_groups().unwrap(), vec![group.clone()]);
    assert_eq!(
        catalog
            .store()
            .read_authors(&AuthorsScope::ByGroup(5))
            .unwrap(),
        sample_authors()
    );

    let mut second: Vec<Author> = Vec::new();
    catalog
        .query_authors_by_group(&group, &mut second)
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(second, sample_authors());
}

// La portée par pays renseigne la référence pays des lignes qui ne la
// portent pas.
#[tokio::test]
async fn test_country_scope_fills_implied_country() {
    let remote = MockRemote {
        authors: sample_authors(),
        ..MockRemote::new()
    };
    let catalog = CachingCatalog::new(remote, Store::open_in_memory().unwrap());
    let sweden = Country::new(31, "Sweden");

    let mut seen = Recording::<Author>::default();
    catalog
        .query_authors_by_country(&sweden, &mut seen)
        .await
        .unwrap();

    assert!(seen.items.iter().all(|a| a.country_id == Some(31)));
    assert_eq!(
        catalog
            .store()
            .read_authors(&AuthorsScope::ByCountry(31))
            .unwrap()
            .len(),
        2
    );
}

// L'indication de total distante est transmise telle quelle pendant la
// récupération ; le service local envoie le compte exact.
#[tokio::test]
async fn test_count_hint_forwarded_verbatim() {
    let remote = MockRemote {
        authors: sample_authors(),
        hint_override: Some(42),
        ..MockRemote::new()
    };
    let catalog = CachingCatalog::new(remote, Store::open_in_memory().unwrap());
    let filter = HandleFilter::Letter('A');

    let mut live = Recording::<Author>::default();
    catalog
        .query_authors_by_handle(&filter, &mut live)
        .await
        .unwrap();
    assert_eq!(live.hint, Some(42));

    let mut replay = Recording::<Author>::default();
    catalog
        .query_authors_by_handle(&filter, &mut replay)
        .await
        .unwrap();
    assert_eq!(replay.hint, Some(2));
}

/// Store dont les écritures d'auteurs échouent : l'erreur doit remonter
/// et la portée ne doit jamais passer complète.
struct FailingStore {
    inner: Store,
}

impl LocalStore for FailingStore {
    fn completeness(&self, scope: &Scope) -> ampstore::Result<Completeness> {
        self.inner.completeness(scope)
    }

    fn mark_complete(&self, scope: &Scope) -> ampstore::Result<()> {
        self.inner.mark_complete(scope)
    }

    fn read_groups(&self) -> ampstore::Result<Vec<Group>> {
        self.inner.groups()
    }

    fn read_countries(&self) -> ampstore::Result<Vec<Country>> {
        self.inner.countries()
    }

    fn read_authors(&self, scope: &AuthorsScope) -> ampstore::Result<Vec<Author>> {
        self.inner.authors(scope)
    }

    fn read_tracks(&self, author_id: u32) -> ampstore::Result<Vec<Track>> {
        self.inner.tracks(author_id)
    }

    fn add_group(&self, group: &Group) -> ampstore::Result<()> {
        self.inner.add_group(group)
    }

    fn add_country(&self, country: &Country) -> ampstore::Result<()> {
        self.inner.add_country(country)
    }

    fn add_author(&self, _author: &Author) -> ampstore::Result<()> {
        Err(StoreError::Config(anyhow::anyhow!("disk full")))
    }

    fn add_group_member(&self, group_id: u32, author_id: u32) -> ampstore::Result<()> {
        self.inner.add_group_member(group_id, author_id)
    }

    fn add_track(&self, track: &Track) -> ampstore::Result<()> {
        self.inner.add_track(track)
    }
}

#[tokio::test]
async fn test_store_failure_is_propagated_not_swallowed() {
    let remote = MockRemote {
        authors: sample_authors(),
        ..MockRemote::new()
    };
    let store = FailingStore {
        inner: Store::open_in_memory().unwrap(),
    };
    let catalog = CachingCatalog::new(remote, store);
    let filter = HandleFilter::Letter('A');
    let scope = Scope::Authors(AuthorsScope::ByHandle(filter));

    let mut seen = Recording::<Author>::default();
    let err = catalog
        .query_authors_by_handle(&filter, &mut seen)
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Store(_)));
    // Les livraisons déjà faites ne sont pas rétractées
    assert_eq!(seen.items.len(), 2);
    // Et la portée n'est surtout pas considérée complète
    assert_ne!(
        catalog.store().completeness(&scope).unwrap(),
        Completeness::Complete
    );
}
