pub mod error;
pub mod input;
pub mod model;
pub mod store;
pub mod time;
pub mod view;

pub use error::ValidationError;
pub use input::{expand_key, normalize_metadata, parse_args, parse_filter, parse_priority, ParsedInput, TASK_KEYS};
pub use model::filter::Filter;
pub use model::task::{Priority, Task, TaskId, TaskText};
pub use store::{Counts, StoreEvent, SubscriptionId, TaskStore};
pub use time::{parse_human_date, parse_human_date_from, parse_optional_date, parse_optional_date_from};
pub use view::{EditSession, EditSessions, FormField, RowMode, TaskForm};
