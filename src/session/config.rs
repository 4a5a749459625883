//! Run session configuration

/// Configuration for a run session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period before a version search is sent, in milliseconds
    pub search_debounce_ms: u64,

    /// Whether a successful submission closes the session
    pub close_on_submit: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 300,
            close_on_submit: true,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_debounce(mut self, debounce_ms: u64) -> Self {
        self.search_debounce_ms = debounce_ms;
        self
    }

    pub fn with_close_on_submit(mut self, close_on_submit: bool) -> Self {
        self.close_on_submit = close_on_submit;
        self
    }

    pub fn search_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.search_debounce_ms)
    }
}
