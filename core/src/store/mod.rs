pub mod observer;
pub mod task_store;

pub use observer::{StoreEvent, SubscriptionId};
pub use task_store::{Counts, TaskStore};
