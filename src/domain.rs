// ドメイン層
// 集約・値オブジェクト・ドメインイベントと、外部に依存するポート定義

pub mod error;
pub mod event;
pub mod event_bus;
pub mod handler;
pub mod model;
pub mod port;
pub mod serialization;
