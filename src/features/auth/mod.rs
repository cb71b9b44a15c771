/// 認証機能のモジュール
pub mod secure_storage;
pub mod service;
pub mod session;

pub use secure_storage::*;
pub use service::*;
pub use session::*;
