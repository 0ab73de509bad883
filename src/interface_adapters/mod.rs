// Interface adapters: backend HTTP client, envelope normalizer, storage and navigation.

pub mod clients;
pub mod envelope;
pub mod navigation;
pub mod protocol;
pub mod storage;

pub use clients::ApiClient;
pub use navigation::WatchNavigator;
pub use storage::{FileSessionStorage, MemoryStorage, SystemClock};
