//! Property variants — *how* a prop gets computed and which partial-reload
//! semantics it participates in.
//!
//! Every entry in a page's property bag is a [`Prop`]:
//!
//! | Variant | First load | Partial reload | Notes |
//! |---------|-----------|----------------|-------|
//! | `Value` | included | included | plain JSON, never awaited |
//! | `Context` | computed | computed | producer receives the live request view |
//! | `Tagged(Optional)` | dropped | included unless denied | |
//! | `Tagged(Deferred)` | dropped, reported in `deferredProps` | included unless denied | grouped for batched follow-up fetches |
//! | `Tagged(Merge)` | computed | computed | client instance-merges instead of replacing |
//! | `Tagged(Always)` | computed | computed, wins over `only`/`except` | |
//!
//! Deferred-group membership is independent of mergeability: a prop can be
//! both deferred and mergeable (`Prop::deferred(..).mergeable()`).
//!
//! # Examples
//!
//! ```ignore
//! use inertia_rs::{Prop, Producer, Props};
//!
//! let mut props = Props::new();
//! props.insert("id".into(), Prop::from(1));
//! props.insert("teams".into(), Prop::optional(Producer::sync(|| vec!["a", "b"])));
//! props.insert("stats".into(), Prop::deferred(Producer::new(|| async { 42 })).in_group("dashboard"));
//! props.insert("feed".into(), Prop::merge(Producer::sync(Vec::<String>::new)));
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::PropError;
use crate::response::RequestContext;

/// Default group name for deferred props.
pub const DEFAULT_DEFER_GROUP: &str = "default";

/// An ordered property bag. Key order is load-bearing: it drives the ordering
/// of resolved props, `deferredProps` groups and `mergeProps`.
pub type Props = IndexMap<String, Prop>;

type ValueFuture = Pin<Box<dyn Future<Output = std::result::Result<Value, PropError>> + Send>>;
type PropFuture = Pin<Box<dyn Future<Output = std::result::Result<Prop, PropError>> + Send>>;

fn boxed_value<F>(fut: F) -> ValueFuture
where
    F: Future<Output = std::result::Result<Value, PropError>> + Send + 'static,
{
    Box::pin(fut)
}

fn boxed_prop<F>(fut: F) -> PropFuture
where
    F: Future<Output = std::result::Result<Prop, PropError>> + Send + 'static,
{
    Box::pin(fut)
}

/// A zero-argument producer of a prop value.
///
/// Producers may be synchronous or asynchronous; the engine always awaits
/// them before inclusion. They are never invoked at construction time.
#[derive(Clone)]
pub struct Producer(Arc<dyn Fn() -> ValueFuture + Send + Sync>);

impl Producer {
    /// Wrap an async producer of any serializable value.
    pub fn new<F, Fut, T>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: Serialize,
    {
        Producer(Arc::new(move || {
            let fut = f();
            boxed_value(async move { serde_json::to_value(fut.await).map_err(PropError::from) })
        }))
    }

    /// Wrap a synchronous producer of any serializable value.
    pub fn sync<F, T>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Serialize,
    {
        Producer(Arc::new(move || {
            let value = serde_json::to_value(f()).map_err(PropError::from);
            boxed_value(std::future::ready(value))
        }))
    }

    /// Wrap a fallible async producer. The error fails the whole render.
    pub fn try_new<F, Fut, T, E>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<T, E>> + Send + 'static,
        T: Serialize,
        E: Into<PropError>,
    {
        Producer(Arc::new(move || {
            let fut = f();
            boxed_value(async move {
                let value = fut.await.map_err(Into::into)?;
                serde_json::to_value(value).map_err(PropError::from)
            })
        }))
    }

    /// Wrap a fallible synchronous producer.
    pub fn try_sync<F, T, E>(f: F) -> Self
    where
        F: Fn() -> std::result::Result<T, E> + Send + Sync + 'static,
        T: Serialize,
        E: Into<PropError>,
    {
        Producer(Arc::new(move || {
            let value = f()
                .map_err(Into::into)
                .and_then(|v| serde_json::to_value(v).map_err(PropError::from));
            boxed_value(std::future::ready(value))
        }))
    }

    pub(crate) fn resolve(&self) -> ValueFuture {
        (self.0)()
    }
}

impl fmt::Debug for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Producer(..)")
    }
}

/// A producer that receives the live request view.
///
/// This is the engine's rendering of a "plain function" prop: it is computed
/// on every render where its key is selected, and it may return either a
/// final value or another [`Prop`], which the engine resolves recursively.
#[derive(Clone)]
pub struct ContextProducer(Arc<dyn Fn(RequestContext) -> PropFuture + Send + Sync>);

impl ContextProducer {
    /// Wrap an async function of the request context.
    pub fn new<F, Fut, P>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = P> + Send + 'static,
        P: Into<Prop>,
    {
        ContextProducer(Arc::new(move |ctx| {
            let fut = f(ctx);
            boxed_prop(async move { Ok(fut.await.into()) })
        }))
    }

    /// Wrap a fallible async function of the request context.
    pub fn try_new<F, Fut, P, E>(f: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<P, E>> + Send + 'static,
        P: Into<Prop>,
        E: Into<PropError>,
    {
        ContextProducer(Arc::new(move |ctx| {
            let fut = f(ctx);
            boxed_prop(async move { fut.await.map(Into::into).map_err(Into::into) })
        }))
    }

    pub(crate) fn call(&self, ctx: RequestContext) -> PropFuture {
        (self.0)(ctx)
    }
}

impl fmt::Debug for ContextProducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContextProducer(..)")
    }
}

/// Resolution policy of a tagged prop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropKind {
    /// Computed only when explicitly requested by a partial reload.
    Optional,
    /// Like `Optional`, plus reported to the client in a named group on the
    /// first load so it knows to fetch it in a follow-up request.
    Deferred,
    /// Resolved eagerly; the client merges the value into existing state.
    Merge,
    /// Resolved unconditionally, even when an allow-list excludes the key.
    Always,
}

/// A producer together with its resolution policy.
#[derive(Clone, Debug)]
pub struct TaggedProp {
    pub(crate) kind: PropKind,
    pub(crate) producer: Producer,
    pub(crate) group: Option<String>,
    pub(crate) merge: bool,
}

/// One property in a page's bag. See the module docs for the variant matrix.
#[derive(Clone, Debug)]
pub enum Prop {
    /// A plain JSON value, passed through unchanged.
    Value(Value),
    /// A function of the live request, resolved on every render.
    Context(ContextProducer),
    /// A producer with partial-reload semantics.
    Tagged(TaggedProp),
}

impl Prop {
    /// A plain value prop.
    pub fn value(value: impl Into<Value>) -> Self {
        Prop::Value(value.into())
    }

    /// A prop computed from the live request view.
    pub fn context(producer: ContextProducer) -> Self {
        Prop::Context(producer)
    }

    /// A prop computed only when a partial reload requests it.
    pub fn optional(producer: Producer) -> Self {
        Prop::Tagged(TaggedProp {
            kind: PropKind::Optional,
            producer,
            group: None,
            merge: false,
        })
    }

    /// Alias of [`Prop::optional`], kept for parity with client-side naming.
    pub fn lazy(producer: Producer) -> Self {
        Self::optional(producer)
    }

    /// A deferred prop in the [`DEFAULT_DEFER_GROUP`] group.
    pub fn deferred(producer: Producer) -> Self {
        Prop::Tagged(TaggedProp {
            kind: PropKind::Deferred,
            producer,
            group: Some(DEFAULT_DEFER_GROUP.to_string()),
            merge: false,
        })
    }

    /// Assign a deferred prop to a named fetch group. No effect on other
    /// variants.
    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        if let Prop::Tagged(tagged) = &mut self {
            if tagged.kind == PropKind::Deferred {
                tagged.group = Some(group.into());
            }
        }
        self
    }

    /// A prop whose value the client merges into existing state.
    pub fn merge(producer: Producer) -> Self {
        Prop::Tagged(TaggedProp {
            kind: PropKind::Merge,
            producer,
            group: None,
            merge: true,
        })
    }

    /// A prop resolved on every request, winning over allow/deny lists.
    pub fn always(producer: Producer) -> Self {
        Prop::Tagged(TaggedProp {
            kind: PropKind::Always,
            producer,
            group: None,
            merge: false,
        })
    }

    /// Flag a deferred or always prop as merge-eligible. Optional props do
    /// not carry merge semantics; on them this is a no-op.
    pub fn mergeable(mut self) -> Self {
        if let Prop::Tagged(tagged) = &mut self {
            if tagged.kind != PropKind::Optional {
                tagged.merge = true;
            }
        }
        self
    }

    /// Excluded from default (non-partial) resolution?
    pub(crate) fn ignored_on_first_load(&self) -> bool {
        matches!(
            self,
            Prop::Tagged(TaggedProp {
                kind: PropKind::Optional | PropKind::Deferred,
                ..
            })
        )
    }

    pub(crate) fn is_always(&self) -> bool {
        matches!(
            self,
            Prop::Tagged(TaggedProp {
                kind: PropKind::Always,
                ..
            })
        )
    }

    pub(crate) fn should_merge(&self) -> bool {
        matches!(self, Prop::Tagged(TaggedProp { merge: true, .. }))
    }

    /// Group name, for deferred props only.
    pub(crate) fn defer_group(&self) -> Option<&str> {
        match self {
            Prop::Tagged(TaggedProp {
                kind: PropKind::Deferred,
                group,
                ..
            }) => Some(group.as_deref().unwrap_or(DEFAULT_DEFER_GROUP)),
            _ => None,
        }
    }
}

impl From<Value> for Prop {
    fn from(value: Value) -> Self {
        Prop::Value(value)
    }
}

impl From<&str> for Prop {
    fn from(value: &str) -> Self {
        Prop::Value(Value::from(value))
    }
}

impl From<String> for Prop {
    fn from(value: String) -> Self {
        Prop::Value(Value::from(value))
    }
}

impl From<i64> for Prop {
    fn from(value: i64) -> Self {
        Prop::Value(Value::from(value))
    }
}

impl From<u64> for Prop {
    fn from(value: u64) -> Self {
        Prop::Value(Value::from(value))
    }
}

impl From<i32> for Prop {
    fn from(value: i32) -> Self {
        Prop::Value(Value::from(value))
    }
}

impl From<f64> for Prop {
    fn from(value: f64) -> Self {
        Prop::Value(Value::from(value))
    }
}

impl From<bool> for Prop {
    fn from(value: bool) -> Self {
        Prop::Value(Value::from(value))
    }
}

impl From<Producer> for Prop {
    fn from(producer: Producer) -> Self {
        // An untagged producer resolves eagerly, like a plain value.
        Prop::Context(ContextProducer(Arc::new(move |_ctx| {
            let fut = producer.resolve();
            boxed_prop(async move { fut.await.map(Prop::Value) })
        })))
    }
}

impl From<ContextProducer> for Prop {
    fn from(producer: ContextProducer) -> Self {
        Prop::Context(producer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_constructors_do_not_invoke_producers() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let _optional = Prop::optional(Producer::sync(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            "x"
        }));
        let _deferred = Prop::deferred(Producer::new(|| async {
            CALLS.fetch_add(1, Ordering::SeqCst);
            "y"
        }));
        assert_eq!(CALLS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_deferred_default_group() {
        let prop = Prop::deferred(Producer::sync(|| 1));
        assert_eq!(prop.defer_group(), Some(DEFAULT_DEFER_GROUP));
    }

    #[test]
    fn test_deferred_named_group() {
        let prop = Prop::deferred(Producer::sync(|| 1)).in_group("dashboard");
        assert_eq!(prop.defer_group(), Some("dashboard"));
    }

    #[test]
    fn test_in_group_ignored_for_other_kinds() {
        let prop = Prop::always(Producer::sync(|| 1)).in_group("dashboard");
        assert_eq!(prop.defer_group(), None);
    }

    #[test]
    fn test_merge_flags() {
        assert!(Prop::merge(Producer::sync(|| 1)).should_merge());
        assert!(!Prop::always(Producer::sync(|| 1)).should_merge());
        assert!(Prop::always(Producer::sync(|| 1)).mergeable().should_merge());
        assert!(Prop::deferred(Producer::sync(|| 1)).mergeable().should_merge());
    }

    #[test]
    fn test_mergeable_is_noop_on_optional() {
        let prop = Prop::optional(Producer::sync(|| 1)).mergeable();
        assert!(!prop.should_merge());
    }

    #[test]
    fn test_first_load_exclusion() {
        assert!(Prop::optional(Producer::sync(|| 1)).ignored_on_first_load());
        assert!(Prop::deferred(Producer::sync(|| 1)).ignored_on_first_load());
        assert!(!Prop::merge(Producer::sync(|| 1)).ignored_on_first_load());
        assert!(!Prop::always(Producer::sync(|| 1)).ignored_on_first_load());
        assert!(!Prop::from("plain").ignored_on_first_load());
    }

    #[test]
    fn test_lazy_is_optional() {
        let prop = Prop::lazy(Producer::sync(|| 1));
        assert!(prop.ignored_on_first_load());
        assert!(!prop.should_merge());
    }
}
