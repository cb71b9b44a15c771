// 画面遷移の定義

use std::fmt;
use std::sync::{Arc, Mutex};

/// アプリケーションの画面
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Bills,
    NewBill,
    Dashboard,
}

impl Route {
    pub const ALL: [Route; 4] = [Route::Login, Route::Bills, Route::NewBill, Route::Dashboard];

    /// 画面のパス
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Bills => "#employee/bills",
            Route::NewBill => "#employee/bill/new",
            Route::Dashboard => "#admin/dashboard",
        }
    }

    /// パスから画面を解決する（未知のパスはログイン画面）
    pub fn from_path(path: &str) -> Route {
        Route::ALL
            .into_iter()
            .find(|route| route.path() == path)
            .unwrap_or(Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// 画面遷移を実際に行うコールバック
pub trait Navigator: Send + Sync {
    fn on_navigate(&self, route: Route);
}

impl<F> Navigator for F
where
    F: Fn(Route) + Send + Sync,
{
    fn on_navigate(&self, route: Route) {
        self(route)
    }
}

#[derive(Debug, Clone, Copy)]
struct Locations {
    current: Route,
    previous: Option<Route>,
}

/// 現在の画面と直前の画面を保持するナビゲーションコンテキスト
#[derive(Clone)]
pub struct NavigationContext {
    navigator: Arc<dyn Navigator>,
    locations: Arc<Mutex<Locations>>,
}

impl NavigationContext {
    /// ログイン画面から開始するコンテキストを作成する
    pub fn new(navigator: Arc<dyn Navigator>) -> Self {
        Self {
            navigator,
            locations: Arc::new(Mutex::new(Locations {
                current: Route::Login,
                previous: None,
            })),
        }
    }

    /// 画面を遷移する
    pub fn navigate(&self, route: Route) {
        match self.locations.lock() {
            Ok(mut locations) => {
                locations.previous = Some(locations.current);
                locations.current = route;
            }
            Err(e) => log::error!("画面遷移の記録に失敗しました: {e}"),
        }

        log::debug!("画面遷移: {route}");
        self.navigator.on_navigate(route);
    }

    /// 現在の画面
    pub fn current(&self) -> Route {
        self.locations
            .lock()
            .map(|l| l.current)
            .unwrap_or(Route::Login)
    }

    /// 直前の画面
    pub fn previous(&self) -> Option<Route> {
        self.locations.lock().ok().and_then(|l| l.previous)
    }
}
