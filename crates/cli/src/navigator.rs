//! Login redirects for a terminal session

use fundraiser_http::client::navigation::Navigator;
use tracing::warn;

/// Navigator that reports the page a command stands in for.
///
/// A terminal cannot change pages, so a redirect becomes a hint on stderr.
#[derive(Debug, Clone)]
pub struct TerminalNavigator {
    page: String,
}

impl TerminalNavigator {
    pub fn new(page: impl Into<String>) -> Self {
        Self { page: page.into() }
    }
}

impl Navigator for TerminalNavigator {
    fn current_path(&self) -> String {
        self.page.clone()
    }

    fn redirect(&self, path: &str) {
        warn!(from = %self.page, to = %path, "Session expired");
        eprintln!("Your session has expired. Run `fundraiser login` to sign in again.");
    }
}
