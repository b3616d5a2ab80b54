//! Factory trait for constructing and retiring pooled resources

/// Supplies the pool with new resources and tears down the ones it
/// retires.
///
/// The pool never constructs resources itself; every cache miss is
/// delegated to the factory, and every resource leaving the pool (evicted,
/// discarded, or destroyed along with the pool) is handed back to
/// [`remove`](ResourceFactory::remove).
///
/// Implementations must be shareable across the threads using the pool.
///
/// # Examples
///
/// ```
/// use loosepool::ResourceFactory;
/// use std::convert::Infallible;
///
/// struct Buffers {
///     default_len: usize,
/// }
///
/// impl ResourceFactory for Buffers {
///     type Resource = Vec<u8>;
///     type Args = usize;
///     type Error = Infallible;
///
///     fn create(&self) -> Result<Vec<u8>, Infallible> {
///         Ok(vec![0; self.default_len])
///     }
///
///     fn create_with(&self, len: usize) -> Result<Vec<u8>, Infallible> {
///         Ok(vec![0; len])
///     }
/// }
/// ```
pub trait ResourceFactory: Send + Sync {
    /// The pooled resource type.
    type Resource: Send;

    /// Constructor arguments accepted by [`create_with`](Self::create_with).
    /// Use `()` when parameterized construction is not supported.
    type Args;

    /// Error produced by construction or teardown.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct a fresh resource.
    fn create(&self) -> Result<Self::Resource, Self::Error>;

    /// Construct a fresh resource from caller-supplied arguments.
    ///
    /// The default implementation ignores the arguments and delegates to
    /// [`create`](Self::create). Note that pooled resources handed out on
    /// an acquisition hit were built by whichever call created them, not
    /// by the arguments of the current request.
    fn create_with(&self, args: Self::Args) -> Result<Self::Resource, Self::Error> {
        let _ = args;
        self.create()
    }

    /// Tear down a resource the pool is retiring.
    ///
    /// The default implementation drops it. Errors reported here never
    /// reach pool callers; the pool logs them and moves on.
    fn remove(&self, resource: Self::Resource) -> Result<(), Self::Error> {
        drop(resource);
        Ok(())
    }
}
