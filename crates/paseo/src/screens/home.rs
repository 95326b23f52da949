//! Entry screen: landing page and the route to search.

use tracing::info;

use crate::result::PaseoResult;
use crate::session::PageSession;

/// The landing page of the site under test.
pub struct HomeScreen<'a, S: PageSession + ?Sized> {
    session: &'a S,
    base_url: String,
    search_path: String,
}

impl<S: PageSession + ?Sized> std::fmt::Debug for HomeScreen<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HomeScreen")
            .field("base_url", &self.base_url)
            .field("search_path", &self.search_path)
            .finish_non_exhaustive()
    }
}

impl<'a, S: PageSession + ?Sized> HomeScreen<'a, S> {
    /// Create a home screen for the given site
    pub fn new(
        session: &'a S,
        base_url: impl Into<String>,
        search_path: impl Into<String>,
    ) -> Self {
        Self {
            session,
            base_url: base_url.into(),
            search_path: search_path.into(),
        }
    }

    /// Open the landing page
    pub async fn open(&self) -> PaseoResult<()> {
        info!(url = %self.base_url, "opening home");
        self.session.navigate(&self.base_url).await
    }

    /// Go straight to the search route; faster and more reliable than
    /// hunting for the search icon in a shifting layout
    pub async fn navigate_to_search(&self) -> PaseoResult<()> {
        let url = format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.search_path
        );
        info!(%url, "navigating to search");
        self.session.navigate(&url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::FakeSession;

    #[tokio::test]
    async fn test_open_and_search_route() {
        let session = FakeSession::new("about:blank");
        let home = HomeScreen::new(&session, "https://m.example.tv", "/search");

        home.open().await.unwrap();
        home.navigate_to_search().await.unwrap();

        assert_eq!(
            session.navigations(),
            vec!["https://m.example.tv", "https://m.example.tv/search"]
        );
    }

    #[tokio::test]
    async fn test_trailing_slash_collapsed() {
        let session = FakeSession::new("about:blank");
        let home = HomeScreen::new(&session, "https://m.example.tv/", "/search");
        home.navigate_to_search().await.unwrap();
        assert_eq!(session.navigations(), vec!["https://m.example.tv/search"]);
    }
}
