// ドリブンアダプター（出力側）
// インメモリ実装とコンソールロガー

pub mod console_logger;
pub mod event_bus;
pub mod memory_store;

pub use console_logger::{ConsoleLogger, LogEntry};
pub use event_bus::{EventBusConfig, InMemoryEventBus};
pub use memory_store::{
    InMemoryBasketRepository, InMemoryCustomerRepository, InMemoryOrderRepository,
    InMemoryProductRepository, InMemoryStore, InMemoryUnitOfWork,
};
