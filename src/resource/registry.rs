//! Resource Registry
//!
//! Maps kind names and aliases to [`ResourceDescriptor`]s. A registry is built
//! once with [`RegistryBuilder`] and never changes afterwards, so it can be
//! shared freely between concurrent commands.

use super::column::{Columns, Extract};
use super::descriptor::{KindOperations, ResourceDescriptor};
use super::kinds;
use crate::api::Kind;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::marker::PhantomData;

/// Aliases are matched case-insensitively and ignoring surrounding whitespace
pub fn normalize_alias(alias: &str) -> String {
    alias.trim().to_lowercase()
}

/// Everything needed to register one kind
///
/// The kind name, list kind and namespaced flag come from `K`; aliases and
/// columns are supplied here.
pub struct Registration<K> {
    aliases: Vec<String>,
    default_columns: Vec<&'static str>,
    wide_columns: Vec<&'static str>,
    columns: Columns<K>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> Registration<K> {
    pub fn new() -> Self {
        Self {
            aliases: Vec::new(),
            default_columns: Vec::new(),
            wide_columns: Vec::new(),
            columns: Columns::new(),
            _kind: PhantomData,
        }
    }

    pub fn aliases(mut self, aliases: &[&str]) -> Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    pub fn default_columns(mut self, headers: &[&'static str]) -> Self {
        self.default_columns = headers.to_vec();
        self
    }

    pub fn wide_columns(mut self, headers: &[&'static str]) -> Self {
        self.wide_columns = headers.to_vec();
        self
    }

    pub fn column(mut self, header: &'static str, extract: Extract<K>) -> Self {
        self.columns = self.columns.column(header, extract);
        self
    }

    /// Validate and turn into a descriptor
    fn into_descriptor(self) -> Result<ResourceDescriptor> {
        let invalid = |message: String| Error::InvalidDescriptor {
            kind: K::KIND,
            message,
        };

        if self.default_columns.is_empty() {
            return Err(invalid("no default columns".to_string()));
        }
        for header in self.default_columns.iter().chain(&self.wide_columns) {
            if !self.columns.contains(header) {
                return Err(invalid(format!("column {} has no extraction rule", header)));
            }
        }

        let mut aliases = vec![normalize_alias(K::KIND)];
        for alias in &self.aliases {
            let alias = normalize_alias(alias);
            if alias.is_empty() {
                return Err(invalid("empty alias".to_string()));
            }
            if !aliases.contains(&alias) {
                aliases.push(alias);
            }
        }

        // Wide output falls back to the default set when none is given.
        let wide_columns = if self.wide_columns.is_empty() {
            self.default_columns.clone()
        } else {
            self.wide_columns
        };

        Ok(ResourceDescriptor::new(
            K::KIND,
            K::LIST_KIND,
            K::NAMESPACED,
            aliases,
            self.default_columns,
            wide_columns,
            Box::new(KindOperations::<K>::new(self.columns)),
        ))
    }
}

impl<K: Kind> Default for Registration<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collects registrations during startup
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    descriptors: Vec<ResourceDescriptor>,
    by_alias: HashMap<String, usize>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kind
    ///
    /// Fails without changing the builder if any alias is already claimed by
    /// another kind or the registration is inconsistent.
    pub fn register<K: Kind>(&mut self, registration: Registration<K>) -> Result<&mut Self> {
        let descriptor = registration.into_descriptor()?;

        for alias in descriptor.aliases() {
            if let Some(&index) = self.by_alias.get(alias) {
                return Err(Error::DuplicateAlias {
                    alias: alias.clone(),
                    existing: self.descriptors[index].kind(),
                    new: descriptor.kind(),
                });
            }
        }

        let index = self.descriptors.len();
        for alias in descriptor.aliases() {
            self.by_alias.insert(alias.clone(), index);
        }
        tracing::debug!(
            "registered {} with aliases {:?}",
            descriptor.kind(),
            descriptor.aliases()
        );
        self.descriptors.push(descriptor);

        Ok(self)
    }

    pub fn build(self) -> Registry {
        Registry {
            descriptors: self.descriptors,
            by_alias: self.by_alias,
        }
    }
}

/// Immutable table from alias to descriptor
#[derive(Debug)]
pub struct Registry {
    descriptors: Vec<ResourceDescriptor>,
    by_alias: HashMap<String, usize>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry with every built-in kind
    ///
    /// Panics if the built-in registrations conflict; that is a build defect,
    /// not something a user can cause.
    pub fn with_defaults() -> Self {
        let mut builder = Self::builder();
        kinds::register_all(&mut builder)
            .unwrap_or_else(|e| panic!("Invalid built-in resource registration: {}", e));
        builder.build()
    }

    /// Find the descriptor for a kind name or alias
    pub fn lookup(&self, alias_or_kind: &str) -> Result<&ResourceDescriptor> {
        self.by_alias
            .get(&normalize_alias(alias_or_kind))
            .map(|&index| &self.descriptors[index])
            .ok_or_else(|| Error::UnknownKind(alias_or_kind.trim().to_string()))
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.descriptors.iter()
    }

    /// Canonical kind names in registration order
    pub fn kinds(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.kind()).collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
