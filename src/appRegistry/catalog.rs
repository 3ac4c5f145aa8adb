// Registered application entry points, keyed by identifier

use std::collections::HashMap;

use crate::error::AppError;
use crate::state::window::WindowSurface;

use super::builtin;

/// Free-form load parameters passed through to the application
pub type LoadParams = serde_json::Value;

/// Application entry point. `load` must accept `None` params.
pub trait Application {
    fn load(&self, params: Option<&LoadParams>) -> Result<WindowSurface, AppError>;
}

impl<F> Application for F
where
    F: Fn(Option<&LoadParams>) -> Result<WindowSurface, AppError>,
{
    fn load(&self, params: Option<&LoadParams>) -> Result<WindowSurface, AppError> {
        self(params)
    }
}

#[derive(Default)]
pub struct Catalog {
    entries: HashMap<String, Box<dyn Application>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the applications shipped in this crate
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register("about", builtin::About);
        catalog.register("notes", builtin::Notes);
        catalog
    }

    /// Bind an identifier, replacing any earlier binding
    pub fn register(&mut self, identifier: impl Into<String>, app: impl Application + 'static) {
        self.entries.insert(identifier.into(), Box::new(app));
    }

    pub fn get(&self, identifier: &str) -> Option<&dyn Application> {
        self.entries.get(identifier).map(|app| app.as_ref())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
