//! Repository factory trait

/// A factory for creating repository instances from a shared configuration,
/// usually a [`crate::DbClient`].
pub trait RepositoryFactory<R, C> {
    fn create_repository(&self, config: C) -> R;
}
