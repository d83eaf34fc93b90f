//! Resource descriptors
//!
//! A [`ResourceDescriptor`] bundles everything the CLI needs to handle one
//! kind: identity, aliases, columns and the five CRUD adapters. The adapters
//! are written once, generically, in [`KindOperations`]; the descriptor only
//! holds them behind the type-erased [`ResourceOperations`] trait.

use super::column::{ColumnSet, Columns};
use crate::api::{Kind, ObjectMeta, ResourceListObject, ResourceObject};
use crate::client::{Client, RequestOptions};
use crate::context::{Context, Interrupted};
use crate::error::{ClientError, Error, Operation, Result};
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;

/// Type-erased CRUD adapters and rendering for one kind
#[async_trait]
pub trait ResourceOperations: Send + Sync {
    async fn create(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject>;

    async fn update(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject>;

    async fn delete(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject>;

    async fn get(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject>;

    async fn list(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceListObject>;

    /// Render one cell of `resource`
    fn render(&self, header: &str, resource: &ResourceObject) -> Result<String>;

    /// Decode a document into this kind
    fn decode(&self, document: serde_yaml::Value) -> std::result::Result<ResourceObject, String>;

    /// An empty resource of this kind with the given metadata
    fn empty(&self, metadata: ObjectMeta) -> ResourceObject;
}

/// The generic adapter bundle, instantiated once per kind
pub struct KindOperations<K> {
    columns: Columns<K>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind> KindOperations<K> {
    pub fn new(columns: Columns<K>) -> Self {
        Self {
            columns,
            _kind: PhantomData,
        }
    }

    fn narrow(resource: ResourceObject) -> Result<K> {
        K::from_object(resource).map_err(|other| {
            tracing::error!(
                "descriptor for {} was handed a {} resource",
                K::KIND,
                other.kind()
            );
            Error::TypeMismatch {
                expected: K::KIND,
                actual: other.kind(),
            }
        })
    }

    fn narrow_ref(resource: &ResourceObject) -> Result<&K> {
        K::from_object_ref(resource).ok_or(Error::TypeMismatch {
            expected: K::KIND,
            actual: resource.kind(),
        })
    }

    /// Namespace option for namespaced kinds
    fn options(resource: &K) -> RequestOptions {
        let namespace = if K::NAMESPACED {
            resource.metadata().namespace.as_deref()
        } else {
            None
        };
        RequestOptions::default().with_namespace(namespace)
    }

    /// Forward one backing call under the context, tagging any failure
    async fn call<T, F>(ctx: &Context, operation: Operation, name: &str, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, ClientError>> + Send,
        T: Send,
    {
        tracing::debug!("{} {}({})", operation, K::KIND, name);

        match ctx.run(fut).await {
            Ok(Ok(out)) => Ok(out),
            Ok(Err(source)) => {
                tracing::warn!("{} {}({}) failed: {}", operation, K::KIND, name, source);
                Err(Error::from_client(operation, K::KIND, source))
            }
            Err(Interrupted::Cancelled) => Err(Error::Cancelled {
                operation,
                kind: K::KIND,
            }),
            Err(Interrupted::DeadlineExceeded) => Err(Error::DeadlineExceeded {
                operation,
                kind: K::KIND,
            }),
        }
    }
}

#[async_trait]
impl<K: Kind> ResourceOperations for KindOperations<K> {
    async fn create(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject> {
        let r = Self::narrow(resource)?;
        let name = r.metadata().name.clone();
        let opts = Self::options(&r);

        let created = Self::call(
            ctx,
            Operation::Create,
            &name,
            K::client(client).create(ctx, r, &opts),
        )
        .await?;

        tracing::info!("created {}({})", K::KIND, name);
        Ok(created.into_object())
    }

    async fn update(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject> {
        let r = Self::narrow(resource)?;
        let name = r.metadata().name.clone();
        let opts = Self::options(&r);

        let updated = Self::call(
            ctx,
            Operation::Update,
            &name,
            K::client(client).update(ctx, r, &opts),
        )
        .await?;

        tracing::info!("updated {}({})", K::KIND, name);
        Ok(updated.into_object())
    }

    async fn delete(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject> {
        let r = Self::narrow(resource)?;
        let meta = r.metadata();
        let opts = Self::options(&r).with_resource_version(meta.version());

        let deleted = Self::call(
            ctx,
            Operation::Delete,
            &meta.name,
            K::client(client).delete(ctx, &meta.name, &opts),
        )
        .await?;

        tracing::info!("deleted {}({})", K::KIND, meta.name);
        Ok(deleted.into_object())
    }

    async fn get(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject> {
        let r = Self::narrow(resource)?;
        let meta = r.metadata();
        let opts = Self::options(&r).with_resource_version(meta.version());

        let found = Self::call(
            ctx,
            Operation::Get,
            &meta.name,
            K::client(client).get(ctx, &meta.name, &opts),
        )
        .await?;

        Ok(found.into_object())
    }

    async fn list(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceListObject> {
        let r = Self::narrow(resource)?;
        let meta = r.metadata();
        let opts = Self::options(&r)
            .with_name(&meta.name)
            .with_resource_version(meta.version());

        let list = Self::call(
            ctx,
            Operation::List,
            &meta.name,
            K::client(client).list(ctx, &opts),
        )
        .await?;

        tracing::debug!("listed {} {} resource(s)", list.items.len(), K::KIND);
        Ok(ResourceListObject::from_typed(list))
    }

    fn render(&self, header: &str, resource: &ResourceObject) -> Result<String> {
        let r = Self::narrow_ref(resource)?;
        Ok(self.columns.render(header, r))
    }

    fn decode(&self, document: serde_yaml::Value) -> std::result::Result<ResourceObject, String> {
        serde_yaml::from_value::<K>(document)
            .map(Kind::into_object)
            .map_err(|e| format!("invalid {}: {}", K::KIND, e))
    }

    fn empty(&self, metadata: ObjectMeta) -> ResourceObject {
        K::from_metadata(metadata).into_object()
    }
}

/// Registered metadata and adapters for one kind; immutable once built
pub struct ResourceDescriptor {
    kind: &'static str,
    list_kind: &'static str,
    namespaced: bool,
    aliases: Vec<String>,
    default_columns: Vec<&'static str>,
    wide_columns: Vec<&'static str>,
    operations: Box<dyn ResourceOperations>,
}

impl std::fmt::Debug for ResourceDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDescriptor")
            .field("kind", &self.kind)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl ResourceDescriptor {
    pub(crate) fn new(
        kind: &'static str,
        list_kind: &'static str,
        namespaced: bool,
        aliases: Vec<String>,
        default_columns: Vec<&'static str>,
        wide_columns: Vec<&'static str>,
        operations: Box<dyn ResourceOperations>,
    ) -> Self {
        Self {
            kind,
            list_kind,
            namespaced,
            aliases,
            default_columns,
            wide_columns,
            operations,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn list_kind(&self) -> &'static str {
        self.list_kind
    }

    pub fn is_namespaced(&self) -> bool {
        self.namespaced
    }

    /// Normalized (lower-case) aliases, canonical kind name included
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn headers(&self, set: ColumnSet) -> &[&'static str] {
        match set {
            ColumnSet::Default => &self.default_columns,
            ColumnSet::Wide => &self.wide_columns,
        }
    }

    /// One table row for `resource` in the chosen column set
    pub fn row(&self, set: ColumnSet, resource: &ResourceObject) -> Result<Vec<String>> {
        self.headers(set)
            .iter()
            .map(|header| self.operations.render(header, resource))
            .collect()
    }

    /// Empty resource of this kind, identified by name (and namespace)
    pub fn new_object(&self, name: &str, namespace: Option<&str>) -> ResourceObject {
        let mut metadata = ObjectMeta::named(name);
        if self.namespaced {
            metadata.namespace = namespace.map(str::to_string);
        }
        self.operations.empty(metadata)
    }

    pub(crate) fn decode(
        &self,
        document: serde_yaml::Value,
    ) -> std::result::Result<ResourceObject, String> {
        self.operations.decode(document)
    }

    pub async fn create(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject> {
        self.operations.create(ctx, client, resource).await
    }

    pub async fn update(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject> {
        self.operations.update(ctx, client, resource).await
    }

    pub async fn delete(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject> {
        self.operations.delete(ctx, client, resource).await
    }

    pub async fn get(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceObject> {
        self.operations.get(ctx, client, resource).await
    }

    pub async fn list(
        &self,
        ctx: &Context,
        client: &dyn Client,
        resource: ResourceObject,
    ) -> Result<ResourceListObject> {
        self.operations.list(ctx, client, resource).await
    }
}
