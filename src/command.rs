//! CLI commands
//!
//! Glue between parsed arguments and the dispatch layer. Multi-resource
//! commands keep going after a per-resource failure and report it; fatal
//! dispatch errors stop everything.

use crate::api::ResourceObject;
use crate::client::Client;
use crate::context::Context;
use crate::error::Error;
use crate::output::{self, Group, Output};
use crate::resource::{ResourceDescriptor, Registry};
use anyhow::{bail, Context as _, Result};
use futures::future::try_join_all;
use tokio::io::AsyncReadExt;

/// What to do with each resource read from a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Replace,
    Apply,
    Delete { skip_not_exists: bool },
}

impl Action {
    fn past_tense(&self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Replace => "replaced",
            Self::Apply => "applied",
            Self::Delete { .. } => "deleted",
        }
    }
}

/// Per-resource results of a multi-resource command
#[derive(Debug, Default)]
pub struct Report {
    pub messages: Vec<String>,
    pub failures: Vec<String>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Rendered output of `get` plus the names that could not be fetched
#[derive(Debug, Default)]
pub struct Listing {
    pub text: String,
    pub failures: Vec<String>,
}

impl Listing {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Everything a command needs to talk to the backend
pub struct Session<'a> {
    pub ctx: Context,
    pub registry: &'a Registry,
    pub client: &'a dyn Client,
}

/// Read a file, or stdin when `path` is `-`
pub async fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read stdin")?;
        return Ok(text);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path))
}

impl Session<'_> {
    /// Run `action` on each resource in order
    pub async fn run_all(&self, action: Action, objects: Vec<ResourceObject>) -> Result<Report> {
        let mut report = Report::default();

        for object in objects {
            let label = format!("{}({})", object.kind(), object.name());
            let descriptor = self.registry.lookup(object.kind())?;

            match self.run_one(descriptor, action, object).await {
                Ok(true) => report
                    .messages
                    .push(format!("Successfully {} {}", action.past_tense(), label)),
                Ok(false) => report
                    .messages
                    .push(format!("Skipped {}: does not exist", label)),
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!("{} failed: {}", label, e);
                    report.failures.push(format!("Failed {}: {}", label, e));
                }
            }
        }

        Ok(report)
    }

    /// Returns `false` when a missing resource was skipped
    async fn run_one(
        &self,
        descriptor: &ResourceDescriptor,
        action: Action,
        object: ResourceObject,
    ) -> std::result::Result<bool, Error> {
        let ctx = &self.ctx;
        match action {
            Action::Create => {
                descriptor.create(ctx, self.client, object).await?;
            }
            Action::Replace => {
                let object = self.with_current_version(descriptor, object).await?;
                descriptor.update(ctx, self.client, object).await?;
            }
            Action::Apply => {
                // Server-assigned fields would make the create invalid
                let mut fresh = object.clone();
                let meta = fresh.metadata_mut();
                meta.resource_version = None;
                meta.uid = None;
                meta.creation_timestamp = None;

                match descriptor.create(ctx, self.client, fresh).await {
                    Ok(_) => {}
                    Err(e) if e.is_already_exists() => {
                        let object = self.with_current_version(descriptor, object).await?;
                        descriptor.update(ctx, self.client, object).await?;
                    }
                    Err(e) => return Err(e),
                }
            }
            Action::Delete { skip_not_exists } => {
                match descriptor.delete(ctx, self.client, object).await {
                    Ok(_) => {}
                    Err(e) if skip_not_exists && e.is_not_found() => return Ok(false),
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(true)
    }

    /// Fill in the stored resource version when the document has none
    async fn with_current_version(
        &self,
        descriptor: &ResourceDescriptor,
        mut object: ResourceObject,
    ) -> std::result::Result<ResourceObject, Error> {
        if object.metadata().version().is_some() {
            return Ok(object);
        }

        let meta = object.metadata();
        let query = descriptor.new_object(&meta.name, meta.namespace.as_deref());
        let current = descriptor.get(&self.ctx, self.client, query).await?;
        object.metadata_mut().resource_version = current.metadata().resource_version.clone();
        Ok(object)
    }

    /// Delete named resources of one kind
    pub async fn delete_named(
        &self,
        kind: &str,
        names: &[String],
        namespace: Option<&str>,
        skip_not_exists: bool,
    ) -> Result<Report> {
        if names.is_empty() {
            bail!("delete needs at least one name");
        }

        let descriptor = self.registry.lookup(kind)?;
        let objects = names
            .iter()
            .map(|name| descriptor.new_object(name, namespace))
            .collect();

        self.run_all(Action::Delete { skip_not_exists }, objects)
            .await
    }

    /// Fetch and render resources
    ///
    /// `kinds` is a comma-separated list. Names may only be given with a
    /// single kind; without names every resource of each kind is listed.
    /// Named resources that cannot be fetched are reported per name and the
    /// rest are still rendered.
    pub async fn get(
        &self,
        kinds: &str,
        names: &[String],
        namespace: Option<&str>,
        format: Output,
    ) -> Result<Listing> {
        let descriptors = kinds
            .split(',')
            .filter(|k| !k.trim().is_empty())
            .map(|k| self.registry.lookup(k))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        if descriptors.is_empty() {
            bail!("no resource kind given");
        }
        if descriptors.len() > 1 && !names.is_empty() {
            bail!("names can only be given with a single resource kind");
        }

        let fetched = try_join_all(
            descriptors
                .into_iter()
                .map(|descriptor| self.fetch(descriptor, names, namespace)),
        )
        .await?;

        let mut groups = Vec::with_capacity(fetched.len());
        let mut failures = Vec::new();
        for (group, missing) in fetched {
            groups.push(group);
            failures.extend(missing);
        }

        let found = groups.iter().any(|g| !g.objects.is_empty());
        let text = if names.is_empty() || found {
            output::render(&groups, format)?
        } else {
            String::new()
        };

        Ok(Listing { text, failures })
    }

    /// One kind's objects plus a failure line per name that could not be read
    async fn fetch<'r>(
        &self,
        descriptor: &'r ResourceDescriptor,
        names: &[String],
        namespace: Option<&str>,
    ) -> std::result::Result<(Group<'r>, Vec<String>), Error> {
        let mut failures = Vec::new();

        let objects = if names.is_empty() {
            let query = descriptor.new_object("", namespace);
            descriptor.list(&self.ctx, self.client, query).await?.items
        } else {
            let mut objects = Vec::with_capacity(names.len());
            for name in names {
                let query = descriptor.new_object(name, namespace);
                match descriptor.get(&self.ctx, self.client, query).await {
                    Ok(object) => objects.push(object),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => {
                        tracing::warn!("get {}({}) failed: {}", descriptor.kind(), name, e);
                        failures.push(format!("Failed {}({}): {}", descriptor.kind(), name, e));
                    }
                }
            }
            objects
        };

        Ok((
            Group {
                descriptor,
                objects,
            },
            failures,
        ))
    }
}
