//! Application state shared across all route handlers.
//!
//! Built once at startup and passed to handlers via axum's `State` extractor.

use std::sync::Arc;

use ifw_core::error::Result;
use ifw_core::types::InjectionMethod;
use ifw_inject::Dispatcher;

use crate::auth::TokenAuthority;
use crate::page::PageConfig;

/// Shared application state. All fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub authority: Arc<TokenAuthority>,
    pub dispatcher: Arc<Dispatcher>,
    /// Injection method of the active profile.
    pub method: InjectionMethod,
    /// `index.html` with the page settings embedded, rendered once.
    pub page_html: Arc<str>,
}

impl AppState {
    pub fn new(
        authority: TokenAuthority,
        dispatcher: Dispatcher,
        method: InjectionMethod,
        page: PageConfig,
    ) -> Result<Self> {
        let page_html = page.render()?;
        Ok(Self {
            authority: Arc::new(authority),
            dispatcher: Arc::new(dispatcher),
            method,
            page_html: page_html.into(),
        })
    }
}
