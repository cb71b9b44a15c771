use super::models::{
    validate_file_extension, FileChangeOutcome, NewBillForm, SelectedFile, SubmissionState,
    SubmitOutcome, UploadDraft, INVALID_EXTENSION_MESSAGE, MISSING_FILE_MESSAGE,
    SUBMIT_FAILED_MESSAGE, UPLOAD_FAILED_MESSAGE,
};
use crate::features::auth::session::SessionManager;
use crate::features::bills::models::{Bill, BillStatus, DEFAULT_PCT};
use crate::features::store::{CreatedBill, Store, UploadPayload};
use crate::shared::errors::AppResult;
use crate::shared::navigation::{NavigationContext, Route};
use crate::shared::presentation::Presenter;
use crate::shared::utils::{normalize_separators, parse_int_prefix};
use log::{debug, error, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 新しい請求書の作成画面
///
/// 状態遷移: `Idle -> FileSelected -> Uploaded -> Submitted`
///
/// ハンドラは `&mut self` を取るため、一つの画面で二つのハンドラが同時に走ることはない。
/// ストアの応答を待っている間に画面が破棄された場合（キャンセルトークンが発火済み）、
/// 応答は状態に反映せず画面遷移も行わない。
pub struct NewBillSubmission {
    store: Option<Arc<dyn Store>>,
    sessions: SessionManager,
    presenter: Arc<dyn Presenter>,
    navigation: NavigationContext,
    file_base_url: String,
    state: SubmissionState,
    draft: UploadDraft,
    cancellation: CancellationToken,
}

impl NewBillSubmission {
    /// 作成画面を初期化する
    ///
    /// # 引数
    /// * `store` - コレクションストア（未設定の場合は送信しない）
    /// * `sessions` - ログイン中ユーザーのセッション
    /// * `presenter` - 通知やファイル選択欄の操作先
    /// * `navigation` - 保存後の画面遷移
    /// * `file_base_url` - サーバーがfileUrlを返さない場合のURL合成元
    pub fn new(
        store: Option<Arc<dyn Store>>,
        sessions: SessionManager,
        presenter: Arc<dyn Presenter>,
        navigation: NavigationContext,
        file_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            sessions,
            presenter,
            navigation,
            file_base_url: file_base_url.into(),
            state: SubmissionState::Idle,
            draft: UploadDraft::default(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> SubmissionState {
        self.state
    }

    pub fn draft(&self) -> &UploadDraft {
        &self.draft
    }

    /// 画面の破棄を通知するためのトークン
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// 画面を破棄する（待機中の応答は捨てられる）
    pub fn detach(&self) {
        self.cancellation.cancel();
    }

    /// ファイル選択時の処理
    ///
    /// 拡張子を検証し、問題なければファイルをアップロードして下書きを作成する
    pub async fn handle_change_file(&mut self, file: SelectedFile) -> FileChangeOutcome {
        let file_name = file.file_name().to_string();

        if !validate_file_extension(&file_name) {
            warn!("受け付けられない拡張子のファイルが選択されました: {file_name}");
            self.presenter.alert(INVALID_EXTENSION_MESSAGE);
            self.presenter.clear_file_input();
            return FileChangeOutcome::Rejected;
        }

        let Some(store) = self.store.clone() else {
            warn!("ストアが設定されていないためアップロードしません");
            return FileChangeOutcome::NoStore;
        };

        let previous_state = self.state;
        self.state = SubmissionState::FileSelected;

        let result = match self.sessions.current_email() {
            Ok(email) => {
                let payload = UploadPayload {
                    file_name: file_name.clone(),
                    media_type: file.media_type,
                    content: file.content,
                    email,
                };
                store.bills().create(payload).await
            }
            Err(e) => Err(e),
        };

        if self.cancellation.is_cancelled() {
            debug!("画面が破棄されたためアップロード結果を破棄します");
            self.state = previous_state;
            return FileChangeOutcome::Cancelled;
        }

        match result {
            Ok(created) => {
                self.draft = draft_from_response(created, &file_name, &self.file_base_url);
                self.state = SubmissionState::Uploaded;
                info!(
                    "ファイルをアップロードしました: bill_id={:?}, file_url={:?}",
                    self.draft.bill_id, self.draft.file_url
                );
                FileChangeOutcome::Uploaded
            }
            Err(e) => {
                error!("ファイル付き請求書の作成に失敗しました: {e}");
                self.state = previous_state;
                self.presenter.alert(UPLOAD_FAILED_MESSAGE);
                FileChangeOutcome::UploadFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// フォーム送信時の処理
    ///
    /// 保存が確認できた場合のみ請求書一覧へ移動する
    pub async fn handle_submit(&mut self, form: NewBillForm) -> SubmitOutcome {
        if self.state == SubmissionState::Submitted {
            debug!("送信済みのため再送信を無視します");
            return SubmitOutcome::AlreadySubmitted;
        }

        if !self.draft.is_ready() {
            warn!("ファイルがアップロードされる前に送信されました");
            self.presenter.alert(MISSING_FILE_MESSAGE);
            return SubmitOutcome::MissingFile;
        }

        let Some(store) = self.store.clone() else {
            warn!("ストアが設定されていないため請求書を保存しません");
            return SubmitOutcome::NoStore;
        };

        let bill_id = self.draft.bill_id.clone().unwrap_or_default();
        let result = match self.prepare_update(&form) {
            Ok(data) => store.bills().update(&bill_id, &data).await.map(|_| ()),
            Err(e) => Err(e),
        };

        if self.cancellation.is_cancelled() {
            debug!("画面が破棄されたため保存結果を破棄します");
            return SubmitOutcome::Cancelled;
        }

        match result {
            Ok(()) => {
                info!("請求書を保存しました: id={bill_id}");
                self.state = SubmissionState::Submitted;
                self.navigation.navigate(Route::Bills);
                SubmitOutcome::Submitted
            }
            Err(e) => {
                error!("請求書の保存に失敗しました: id={bill_id}, error={e}");
                self.presenter.alert(SUBMIT_FAILED_MESSAGE);
                SubmitOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn prepare_update(&self, form: &NewBillForm) -> AppResult<String> {
        let email = self.sessions.current_email()?;
        let bill = assemble_bill(form, &email, &self.draft);
        Ok(serde_json::to_string(&bill)?)
    }
}

/// フォームの入力値とアップロード結果から保存する請求書を組み立てる
///
/// 金額は先頭の整数部分のみを使い、数字がない場合はnullとして保存する。
/// TVA率は解釈できない場合に20とする。
pub fn assemble_bill(form: &NewBillForm, email: &str, draft: &UploadDraft) -> Bill {
    Bill {
        id: String::new(),
        email: email.to_string(),
        bill_type: form.expense_type.clone(),
        name: form.name.clone(),
        amount: parse_int_prefix(&form.amount),
        date: form.date.clone(),
        vat: form.vat.clone(),
        pct: parse_int_prefix(&form.pct).unwrap_or(DEFAULT_PCT),
        commentary: form.commentary.clone(),
        comment_admin: None,
        file_url: draft.file_url.clone(),
        file_name: draft.file_name.clone(),
        status: Some(BillStatus::Pending),
    }
}

/// アップロードの応答から下書きを作成する
fn draft_from_response(created: CreatedBill, local_name: &str, file_base_url: &str) -> UploadDraft {
    let file_name = created
        .file_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| local_name.to_string());

    let file_url = match created.file_url.filter(|url| !url.is_empty()) {
        Some(url) => url,
        None => synthesize_file_url(
            file_base_url,
            created.file_path.as_deref().unwrap_or_default(),
            &file_name,
        ),
    };

    UploadDraft {
        file_url: Some(file_url),
        file_name: Some(file_name),
        bill_id: Some(created.key),
    }
}

/// ファイル配信元・サーバー上のパス・ファイル名からURLを合成する
///
/// パス中のバックスラッシュはスラッシュに置き換える
pub fn synthesize_file_url(file_base_url: &str, file_path: &str, file_name: &str) -> String {
    let base = file_base_url.trim_end_matches('/');
    let path = normalize_separators(file_path);
    let path = path.trim_matches('/');

    if path.is_empty() {
        format!("{base}/{file_name}")
    } else {
        format!("{base}/{path}/{file_name}")
    }
}
