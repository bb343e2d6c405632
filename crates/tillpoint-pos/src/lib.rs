pub mod cart;
pub mod notify;
pub mod profile;
pub mod restock;
pub mod store;

pub use cart::{finalize_sale, CartSession, LineItem, PendingSale, SaleReceipt};
pub use notify::{DismissScheduler, Level, ManualScheduler, NotificationQueue, TokioScheduler};
pub use profile::ProfileStore;
pub use restock::{commit_restock, RestockReport, RestockSelection};
pub use store::{FileKvStore, KvStore, MemoryKvStore, StoreError};
