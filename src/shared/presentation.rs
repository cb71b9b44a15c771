// 表示層とのポート

use crate::shared::errors::AppError;

/// モーダルに表示する内容
#[derive(Debug, Clone, PartialEq)]
pub enum ModalContent {
    /// 請求書の添付ファイル（画像）
    Receipt { file_url: String },
}

/// 表示層が実装するポート
///
/// コアのロジックはDOMやスタイルを直接操作せず、このトレイトを通して指示する
pub trait Presenter: Send + Sync {
    /// 一時的な通知メッセージを表示する
    fn alert(&self, message: &str);

    /// モーダルを表示する
    fn show_modal(&self, content: ModalContent);

    /// サイドパネルの拡大・縮小を切り替える
    fn set_panel_expanded(&self, expanded: bool);

    /// ファイル選択欄の値をクリアする
    fn clear_file_input(&self);
}

/// 画面が描画する状態
#[derive(Debug, Clone, PartialEq)]
pub enum PageState<T> {
    Loading,
    /// エラーページ（メッセージをそのまま表示する）
    Error(String),
    Data(T),
}

impl<T> PageState<T> {
    /// 取得結果から画面の状態を作成する
    pub fn from_result(result: Result<T, AppError>) -> Self {
        match result {
            Ok(data) => PageState::Data(data),
            Err(e) => {
                log::error!("データ取得に失敗しました: {e}");
                PageState::Error(e.to_string())
            }
        }
    }

    /// エラーページに表示するメッセージ
    pub fn error_message(&self) -> Option<&str> {
        match self {
            PageState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_state_from_store_error() {
        let state: PageState<Vec<u8>> = PageState::from_result(Err(AppError::store("Erreur 404")));
        assert_eq!(state.error_message(), Some("Erreur 404"));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_page_state_from_data() {
        let state = PageState::from_result(Ok(vec![1, 2, 3]));
        assert_eq!(state, PageState::Data(vec![1, 2, 3]));
        assert_eq!(state.error_message(), None);
    }
}
