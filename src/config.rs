/// Config for a container
/// ## Fields
/// - `validate_scopes`:
///   If `true`, resolving a [`crate::Lifetime::Scoped`] registration from the root container fails
///   with [`crate::ResolveErrorKind::ScopedFromRoot`].
///
///   If `false`, the root container caches scoped instances itself, so they behave like singletons there.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    pub validate_scopes: bool,
}
