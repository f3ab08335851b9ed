//! HTTP client for the amp.dascene.net catalogue
//!
//! [`RemoteCatalog`] maps each logical query onto the catalogue's CGI
//! endpoints, walks paginated listings (`position` offset) and streams
//! parsed entities to the supplied visitor. It holds no cache state.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use ampmodel::{
    AuthorsVisitor, FoundTracksVisitor, GroupsVisitor, HandleFilter, TracksVisitor,
};

use crate::connectivity::Connectivity;
use crate::error::{RemoteError, Result};
use crate::parse;

/// Default base URL of the catalogue
const DEFAULT_BASE_URL: &str = "https://amp.dascene.net";
/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = "ampcat/0.1";
/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote source over the AMP catalogue
pub struct RemoteCatalog {
    client: reqwest::Client,
    base_url: String,
    connectivity: Arc<dyn Connectivity>,
}

impl RemoteCatalog {
    /// Creates a catalogue client with default options
    ///
    /// # Arguments
    ///
    /// * `connectivity` - Reachability policy consulted before each request
    pub fn new(connectivity: Arc<dyn Connectivity>) -> Result<Self> {
        Self::with_options(
            DEFAULT_BASE_URL,
            DEFAULT_USER_AGENT,
            DEFAULT_TIMEOUT,
            connectivity,
        )
    }

    /// Creates a catalogue client with explicit options
    pub fn with_options(
        base_url: &str,
        user_agent: &str,
        timeout: Duration,
        connectivity: Arc<dyn Connectivity>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            connectivity,
        })
    }

    /// Creates a catalogue client from the configuration
    pub fn from_config(
        config: &ampconfig::Config,
        connectivity: Arc<dyn Connectivity>,
    ) -> Result<Self> {
        Self::with_options(
            &config.get_remote_base_url(),
            &config.get_user_agent(),
            config.get_http_timeout(),
            connectivity,
        )
    }

    /// Fetches one page, connectivity checked first
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.connectivity.check_connection()?;
        debug!(url, "Fetching catalogue page");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(url, status = status.as_u16(), "Remote request failed");
            return Err(RemoteError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// Streams all groups to the visitor
    pub async fn query_groups(&self, visitor: &mut dyn GroupsVisitor) -> Result<()> {
        let mut position = 0;
        let mut first = true;
        loop {
            let url = format!(
                "{}/newresult.php?request=groupslist&position={position}",
                self.base_url
            );
            let html = self.fetch_page(&url).await?;
            let page = parse::groups_page(&html)?;
            if first {
                if let Some(count) = page.count_hint {
                    visitor.set_count_hint(count);
                }
                first = false;
            }
            for group in page.rows {
                visitor.accept(group);
            }
            match Self::advance(position, page.next_position)? {
                Some(next) => position = next,
                None => return Ok(()),
            }
        }
    }

    /// Streams the authors of one listing to the visitor
    async fn query_author_listing(
        &self,
        query: String,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        let mut position = 0;
        let mut first = true;
        loop {
            let url = format!("{}/{query}&position={position}", self.base_url);
            let html = self.fetch_page(&url).await?;
            let page = parse::authors_page(&html)?;
            if first {
                if let Some(count) = page.count_hint {
                    visitor.set_count_hint(count);
                }
                first = false;
            }
            for author in page.rows {
                visitor.accept(author);
            }
            match Self::advance(position, page.next_position)? {
                Some(next) => position = next,
                None => return Ok(()),
            }
        }
    }

    /// Streams the authors matching a handle filter
    pub async fn query_authors_by_handle(
        &self,
        filter: &HandleFilter,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        self.query_author_listing(format!("newresult.php?request=list&search={filter}"), visitor)
            .await
    }

    /// Streams the authors of a country
    pub async fn query_authors_by_country(
        &self,
        country_id: u32,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        self.query_author_listing(
            format!("newresult.php?request=country&search={country_id}"),
            visitor,
        )
        .await
    }

    /// Streams the member authors of a group
    pub async fn query_authors_by_group(
        &self,
        group_id: u32,
        visitor: &mut dyn AuthorsVisitor,
    ) -> Result<()> {
        self.query_author_listing(
            format!("newresult.php?request=groupid&search={group_id}"),
            visitor,
        )
        .await
    }

    /// Streams the tracks of an author
    pub async fn query_tracks(
        &self,
        author_id: u32,
        visitor: &mut dyn TracksVisitor,
    ) -> Result<()> {
        let url = format!(
            "{}/detail.php?detail=modules&view={author_id}",
            self.base_url
        );
        let html = self.fetch_page(&url).await?;
        let (tracks, hint) = parse::author_tracks_page(&html, author_id)?;
        if let Some(count) = hint {
            visitor.set_count_hint(count);
        }
        for track in tracks {
            visitor.accept(track);
        }
        Ok(())
    }

    /// Streams (author, track) pairs matching a search substring
    pub async fn find_tracks(
        &self,
        query: &str,
        visitor: &mut dyn FoundTracksVisitor,
    ) -> Result<()> {
        let mut position = 0;
        let mut first = true;
        let encoded = urlencode(query);
        loop {
            let url = format!(
                "{}/newresult.php?request=module&search={encoded}&position={position}",
                self.base_url
            );
            let html = self.fetch_page(&url).await?;
            let page = parse::found_tracks_page(&html)?;
            if first {
                if let Some(count) = page.count_hint {
                    visitor.set_count_hint(count);
                }
                first = false;
            }
            for (author, track) in page.rows {
                visitor.accept(author, track);
            }
            match Self::advance(position, page.next_position)? {
                Some(next) => position = next,
                None => return Ok(()),
            }
        }
    }

    /// Validates a next-page offset; a non-advancing link would loop forever
    fn advance(current: u32, next: Option<u32>) -> Result<Option<u32>> {
        match next {
            Some(next) if next <= current => Err(RemoteError::Parse(format!(
                "next page offset {next} does not advance past {current}"
            ))),
            other => Ok(other),
        }
    }
}

/// Minimal percent-encoding for the search query parameter
fn urlencode(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for byte in query.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    impl Connectivity for Offline {
        fn has_connection(&self) -> bool {
            false
        }
    }

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("space harrier"), "space+harrier");
        assert_eq!(urlencode("c64&amiga"), "c64%26amiga");
        assert_eq!(urlencode("plain-1.mod"), "plain-1.mod");
    }

    #[test]
    fn test_advance_rejects_non_advancing_offsets() {
        assert!(matches!(
            RemoteCatalog::advance(50, Some(50)),
            Err(RemoteError::Parse(_))
        ));
        assert_eq!(RemoteCatalog::advance(0, Some(50)).unwrap(), Some(50));
        assert_eq!(RemoteCatalog::advance(50, None).unwrap(), None);
    }

    #[test]
    fn test_unreachable_surfaces_before_any_request() {
        let catalog = RemoteCatalog::new(Arc::new(Offline)).unwrap();
        let mut sink: Vec<ampmodel::Group> = Vec::new();
        let err = tokio_test::block_on(catalog.query_groups(&mut sink)).unwrap_err();
        assert!(matches!(err, RemoteError::Unreachable));
        assert!(sink.is_empty());
    }
}
