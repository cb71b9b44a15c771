use super::format::{compare_raw_dates_desc, format_date, format_status};
use super::models::{Bill, DisplayBill, RawBill};
use crate::features::store::Store;
use crate::shared::errors::AppResult;
use crate::shared::navigation::{NavigationContext, Route};
use crate::shared::presentation::{ModalContent, PageState, Presenter};
use log::{debug, info, warn};
use std::sync::Arc;

/// 一覧に含める請求書の選び方
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BillListPolicy {
    /// name / amount / status が欠けた請求書を除外する
    #[default]
    RequireFields,
    /// すべての請求書を表示する
    All,
}

impl BillListPolicy {
    fn accepts(&self, bill: &RawBill) -> bool {
        match self {
            BillListPolicy::RequireFields => bill.has_required_fields(),
            BillListPolicy::All => true,
        }
    }
}

/// 従業員向けの請求書一覧サービス
pub struct BillListService {
    store: Option<Arc<dyn Store>>,
    presenter: Arc<dyn Presenter>,
    navigation: NavigationContext,
    policy: BillListPolicy,
}

impl BillListService {
    pub fn new(
        store: Option<Arc<dyn Store>>,
        presenter: Arc<dyn Presenter>,
        navigation: NavigationContext,
    ) -> Self {
        Self {
            store,
            presenter,
            navigation,
            policy: BillListPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BillListPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 請求書一覧を取得し、表示用に整形して新しい順に並べる
    ///
    /// # 戻り値
    /// 表示用の請求書一覧。ストアが設定されていない場合はNone
    ///
    /// # エラー
    /// ストアからの取得に失敗した場合はそのまま返す
    pub async fn list_bills(&self) -> AppResult<Option<Vec<DisplayBill>>> {
        let Some(store) = &self.store else {
            debug!("ストアが設定されていないため請求書一覧を取得しません");
            return Ok(None);
        };

        let records = store.bills().list().await?;
        let total = records.len();

        let mut bills: Vec<DisplayBill> = records
            .into_iter()
            .filter(|bill| self.policy.accepts(bill))
            .map(normalize_bill)
            .collect();

        // sort_byは安定ソートなので同じ日付は取得順のまま
        bills.sort_by(|a, b| compare_raw_dates_desc(&a.raw_date, &b.raw_date));

        info!("請求書一覧を表示します: {}件（取得{total}件）", bills.len());
        Ok(Some(bills))
    }

    /// 一覧画面の描画状態を取得する
    pub async fn page_state(&self) -> PageState<Vec<DisplayBill>> {
        PageState::from_result(self.list_bills().await.map(Option::unwrap_or_default))
    }

    /// 添付ファイルをモーダルで表示する
    pub fn show_receipt(&self, file_url: &str) {
        self.presenter.show_modal(ModalContent::Receipt {
            file_url: file_url.to_string(),
        });
    }

    /// 新しい請求書の作成画面に移動する
    pub fn open_new_bill(&self) {
        self.navigation.navigate(Route::NewBill);
    }
}

/// ストアのレコードを表示用の請求書に変換する
///
/// 日付のフォーマットに失敗した場合は元の値を残し、警告のみ出力する
pub fn normalize_bill(raw: RawBill) -> DisplayBill {
    let status_code = raw.status.clone().unwrap_or_default();
    let bill = Bill::from(raw);

    let date = match format_date(&bill.date) {
        Ok(formatted) => formatted,
        Err(e) => {
            warn!("請求書 {} の日付をフォーマットできません: {e}", bill.id);
            bill.date.clone()
        }
    };

    DisplayBill {
        id: bill.id,
        email: bill.email,
        bill_type: bill.bill_type,
        name: bill.name,
        amount: bill.amount,
        date,
        raw_date: bill.date,
        vat: bill.vat,
        pct: bill.pct,
        commentary: bill.commentary,
        comment_admin: bill.comment_admin,
        file_url: bill.file_url,
        file_name: bill.file_name,
        status: format_status(&status_code),
    }
}
