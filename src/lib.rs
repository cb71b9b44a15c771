//! Billed 経費精算クライアントのコア
//!
//! 表示層（DOM）とは `Presenter` / `Navigator` で、
//! バックエンドとは `Store` / `KeyValueStorage` で分離されている。

pub mod features;
pub mod shared;

pub use features::auth::{LoginService, LogoutService, SessionManager};
pub use features::bills::BillListService;
pub use features::dashboard::AdminTriage;
pub use features::new_bill::NewBillSubmission;
pub use features::store::{HttpStore, MemoryStore, Store};
pub use shared::config::{initialize_application, AppContext};
pub use shared::{AppError, AppResult, NavigationContext, PageState, Presenter, Route};
