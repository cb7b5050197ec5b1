//! Registry of build and run methods
//!
//! Two parallel registries are kept, one per [`MethodRole`]. Every entry is
//! classified once, when it is added, and its template is checked against the
//! arity its classification demands.

mod defaults;
mod entry;

pub use defaults::{DEFAULT_BUILD_METHODS, DEFAULT_RUN_METHODS};
pub use entry::{
    BUILD_FILE_MARKER, DISTRIBUTED_MARKER, MethodEntry, MethodRole, NO_DISTRIBUTED_QUALIFIER,
    PORTABLE_SOURCE_MARKER, ProcessKind, TemplateShape,
};

use crate::command::template::placeholder_count;
use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// Ordered build and run method registries
#[derive(Debug, Clone, Default)]
pub struct MethodCatalog {
    build: Vec<MethodEntry>,
    run: Vec<MethodEntry>,
}

impl MethodCatalog {
    /// An empty catalog
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in catalog
    pub fn new() -> Self {
        let mut catalog = Self::empty();
        for (name, template) in DEFAULT_BUILD_METHODS {
            catalog
                .build
                .push(MethodEntry::new(*name, *template, MethodRole::Build));
        }
        for (name, template) in DEFAULT_RUN_METHODS {
            catalog
                .run
                .push(MethodEntry::new(*name, *template, MethodRole::Run));
        }
        catalog
    }

    /// Process-wide built-in catalog, created on first use
    pub fn builtin() -> &'static MethodCatalog {
        static BUILTIN: OnceLock<MethodCatalog> = OnceLock::new();
        BUILTIN.get_or_init(MethodCatalog::new)
    }

    /// Built-in catalog with user templates layered on top.
    ///
    /// A name already present has its template replaced; a new name is
    /// appended and classified like any built-in entry.
    pub fn with_overrides(
        build: &BTreeMap<String, String>,
        run: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let mut catalog = Self::new();
        for (name, template) in build {
            catalog.register(MethodEntry::new(name.as_str(), template.as_str(), MethodRole::Build))?;
        }
        for (name, template) in run {
            catalog.register(MethodEntry::new(name.as_str(), template.as_str(), MethodRole::Run))?;
        }
        Ok(catalog)
    }

    /// Add or replace an entry after checking its template arity
    pub fn register(&mut self, entry: MethodEntry) -> Result<()> {
        check_arity(&entry)?;
        let registry = match entry.role {
            MethodRole::Build => &mut self.build,
            MethodRole::Run => &mut self.run,
        };
        if let Some(existing) = registry.iter_mut().find(|e| e.name == entry.name) {
            debug!("Overriding {} method '{}'", entry.role.label(), entry.name);
            *existing = entry;
        } else {
            debug!("Registering {} method '{}'", entry.role.label(), entry.name);
            registry.push(entry);
        }
        Ok(())
    }

    /// Check every entry's template against its classification
    pub fn validate(&self) -> Result<()> {
        self.build.iter().chain(&self.run).try_for_each(check_arity)
    }

    pub fn lookup(&self, role: MethodRole, name: &str) -> Result<&MethodEntry> {
        self.methods(role)
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| Error::UnknownMethod {
                catalog: role.label(),
                name: name.to_string(),
            })
    }

    pub fn lookup_build(&self, name: &str) -> Result<&MethodEntry> {
        self.lookup(MethodRole::Build, name)
    }

    pub fn lookup_run(&self, name: &str) -> Result<&MethodEntry> {
        self.lookup(MethodRole::Run, name)
    }

    pub fn methods(&self, role: MethodRole) -> &[MethodEntry] {
        match role {
            MethodRole::Build => &self.build,
            MethodRole::Run => &self.run,
        }
    }

    pub fn build_methods(&self) -> &[MethodEntry] {
        &self.build
    }

    pub fn run_methods(&self) -> &[MethodEntry] {
        &self.run
    }
}

fn check_arity(entry: &MethodEntry) -> Result<()> {
    let placeholders = placeholder_count(&entry.template);
    match entry.expected_arity() {
        Some(expected) if expected == placeholders => Ok(()),
        expected => Err(Error::TemplateMismatch {
            method: entry.name.clone(),
            placeholders,
            values: expected.unwrap_or(0),
        }),
    }
}
