//! Page registry: request paths to page factories.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use click_core::{normalize_path, Page};
use indexmap::IndexMap;

use crate::config::PageConfig;
use crate::error::{Result, ServerError};

/// Creates a fresh page instance for each request.
pub type PageFactory = Arc<dyn Fn() -> Box<dyn Page> + Send + Sync>;

fn boxed<P, F>(factory: F) -> PageFactory
where
    P: Page,
    F: Fn() -> P + Send + Sync + 'static,
{
    Arc::new(move || Box::new(factory()) as Box<dyn Page>)
}

/// A resolved route.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRoute {
    /// Normalized request path.
    pub path: String,
    /// Factory name.
    pub page: String,
    /// Headers added to the page's responses.
    pub headers: BTreeMap<String, String>,
    /// Template override.
    pub template: Option<String>,
}

/// Named page factories and the routes that use them.
#[derive(Default)]
pub struct PageRegistry {
    factories: HashMap<String, PageFactory>,
    routes: IndexMap<String, PageRoute>,
    not_found: Option<PageFactory>,
    error: Option<PageFactory>,
}

impl PageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named page factory, replacing any previous one.
    pub fn register<P, F>(&mut self, name: impl Into<String>, factory: F)
    where
        P: Page,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), boxed(factory));
    }

    /// Check if a factory is registered under `name`.
    pub fn has_factory(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Add a route. The path must be unused and the factory registered.
    pub fn add_route(&mut self, config: &PageConfig) -> Result<()> {
        let path = normalize_path(&config.path);
        if self.routes.contains_key(&path) {
            return Err(ServerError::DuplicateRoute(path));
        }
        if !self.has_factory(&config.page) {
            return Err(ServerError::UnknownPageFactory {
                path,
                page: config.page.clone(),
            });
        }
        tracing::debug!(path = %path, page = %config.page, "route added");
        self.routes.insert(
            path.clone(),
            PageRoute {
                path,
                page: config.page.clone(),
                headers: config.headers.clone(),
                template: config.template.clone(),
            },
        );
        Ok(())
    }

    /// Register a factory and route `path` to it in one step.
    pub fn mount<P, F>(&mut self, path: &str, factory: F) -> Result<()>
    where
        P: Page,
        F: Fn() -> P + Send + Sync + 'static,
    {
        let path = normalize_path(path);
        self.register(path.clone(), factory);
        self.add_route(&PageConfig::new(path.clone(), path))
    }

    /// Set the page shown for unknown paths.
    pub fn set_not_found<P, F>(&mut self, factory: F)
    where
        P: Page,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.not_found = Some(boxed(factory));
    }

    /// Set the page shown when processing fails.
    pub fn set_error<P, F>(&mut self, factory: F)
    where
        P: Page,
        F: Fn() -> P + Send + Sync + 'static,
    {
        self.error = Some(boxed(factory));
    }

    /// Look up the route for a path.
    pub fn route(&self, path: &str) -> Option<&PageRoute> {
        self.routes.get(&normalize_path(path))
    }

    /// Routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &PageRoute> {
        self.routes.values()
    }

    /// Create the page for a path, with its path and template set.
    pub fn create(&self, path: &str) -> Option<(Box<dyn Page>, &PageRoute)> {
        let route = self.route(path)?;
        let factory = self.factories.get(&route.page)?;
        let mut page = factory();
        page.state_mut().set_path(route.path.clone());
        if let Some(template) = &route.template {
            page.state_mut().set_template(template.clone());
        }
        Some((page, route))
    }

    /// Create the custom not-found page, if one is set.
    pub fn create_not_found(&self, path: &str) -> Option<Box<dyn Page>> {
        let factory = self.not_found.as_ref()?;
        let mut page = factory();
        page.state_mut().set_path(normalize_path(path));
        Some(page)
    }

    /// Create the custom error page, if one is set.
    pub fn create_error(&self, path: &str) -> Option<Box<dyn Page>> {
        let factory = self.error.as_ref()?;
        let mut page = factory();
        page.state_mut().set_path(normalize_path(path));
        Some(page)
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl std::fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut factories: Vec<&String> = self.factories.keys().collect();
        factories.sort();
        f.debug_struct("PageRegistry")
            .field("factories", &factories)
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .field("not_found", &self.not_found.is_some())
            .field("error", &self.error.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use click_core::PageState;

    #[derive(Default)]
    struct BlankPage {
        state: PageState,
    }

    impl Page for BlankPage {
        fn state(&self) -> &PageState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut PageState {
            &mut self.state
        }
    }

    #[test]
    fn test_mount_and_create() {
        let mut registry = PageRegistry::new();
        registry.mount("home.htm", BlankPage::default).unwrap();

        let (page, route) = registry.create("/home.htm").unwrap();
        assert_eq!(route.path, "/home.htm");
        assert_eq!(page.state().path(), Some("/home.htm"));
        assert_eq!(page.state().template(), Some("/home.htm"));
        assert_eq!(page.name(), "BlankPage");
        assert!(registry.create("/other.htm").is_none());
    }

    #[test]
    fn test_named_factory_routes() {
        let mut registry = PageRegistry::new();
        registry.register("blank", BlankPage::default);
        registry
            .add_route(&PageConfig::new("/a.htm", "blank").with_template("shared"))
            .unwrap();
        registry.add_route(&PageConfig::new("/b.htm", "blank")).unwrap();

        let (page, _) = registry.create("/a.htm").unwrap();
        assert_eq!(page.state().template(), Some("shared"));
        assert_eq!(
            registry.routes().map(|r| r.path.as_str()).collect::<Vec<_>>(),
            vec!["/a.htm", "/b.htm"]
        );
    }

    #[test]
    fn test_route_errors() {
        let mut registry = PageRegistry::new();
        registry.mount("/a.htm", BlankPage::default).unwrap();

        assert!(matches!(
            registry.mount("a.htm", BlankPage::default),
            Err(ServerError::DuplicateRoute(_))
        ));
        assert!(matches!(
            registry.add_route(&PageConfig::new("/c.htm", "missing")),
            Err(ServerError::UnknownPageFactory { page, .. }) if page == "missing"
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_special_pages() {
        let mut registry = PageRegistry::new();
        assert!(registry.create_not_found("/x").is_none());

        registry.set_not_found(BlankPage::default);
        registry.set_error(BlankPage::default);

        let page = registry.create_not_found("x.htm").unwrap();
        assert_eq!(page.state().path(), Some("/x.htm"));
        assert!(registry.create_error("/y.htm").is_some());
    }
}
