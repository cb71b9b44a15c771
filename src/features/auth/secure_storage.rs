/// セッションストレージモジュール
///
/// ブラウザのlocalStorageに相当するキー・バリューストアです。
/// セッション情報とJWTを文字列として保存・取得します。
use crate::shared::errors::{AppError, AppResult};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// ストレージのキー定義
pub struct StorageKeys;

impl StorageKeys {
    /// ログイン中のユーザー情報のキー
    pub const USER: &'static str = "user";
    /// JWTのキー
    pub const JWT: &'static str = "jwt";
}

/// キー・バリューストア
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> AppResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> AppResult<()>;

    fn remove_item(&self, key: &str) -> AppResult<()>;

    fn clear(&self) -> AppResult<()>;
}

/// メモリ上のストレージ
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn items(&self) -> AppResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|e| AppError::session(format!("ストレージのロック取得に失敗しました: {e}")))
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.items()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.items()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.items()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        self.items()?.clear();
        Ok(())
    }
}

/// JSONファイルに保存するストレージ
///
/// 書き込みのたびにファイル全体を保存する
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// ファイルを読み込んでストレージを開く（ファイルがなければ空で開始）
    ///
    /// # 引数
    /// * `path` - 保存先のJSONファイル
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let items = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                HashMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            HashMap::new()
        };

        log::debug!("セッションファイルを開きました: path={path:?}, items={}", items.len());

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// 保存先のパス
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update(&self, f: impl FnOnce(&mut HashMap<String, String>)) -> AppResult<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| AppError::session(format!("ストレージのロック取得に失敗しました: {e}")))?;
        f(&mut items);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&*items)?)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|e| AppError::session(format!("ストレージのロック取得に失敗しました: {e}")))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> AppResult<()> {
        self.update(|items| {
            items.remove(key);
        })
    }

    fn clear(&self) -> AppResult<()> {
        self.update(|items| items.clear())?;
        log::info!("セッションファイルをクリアしました: path={:?}", self.path);
        Ok(())
    }
}
