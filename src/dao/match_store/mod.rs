pub mod memory;
/// MongoDB backend.
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::MatchEntity;
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for match records.
///
/// Backends only enforce structural integrity (unique id and share code); every
/// business rule lives in the match service, which is the single writer.
pub trait MatchStore: Send + Sync {
    /// Insert a brand-new record; fails with a conflict when the id or share code exists.
    fn insert_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace an existing record wholesale.
    fn save_match(&self, record: MatchEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_match(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    fn find_by_share_code(
        &self,
        code: String,
    ) -> BoxFuture<'static, StorageResult<Option<MatchEntity>>>;
    /// Every record in creation order.
    fn list_matches(&self) -> BoxFuture<'static, StorageResult<Vec<MatchEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
