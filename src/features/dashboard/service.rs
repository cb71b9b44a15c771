use super::models::{
    filter_bills, BillCard, BucketState, BucketView, DetailPanel, PersistOutcome, TicketState,
    TriageConfig,
};
use crate::features::auth::session::SessionManager;
use crate::features::bills::models::{Bill, BillStatus};
use crate::features::store::Store;
use crate::shared::errors::AppResult;
use crate::shared::navigation::{NavigationContext, Route};
use crate::shared::presentation::{ModalContent, PageState, Presenter};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// 承認・却下の保存に失敗した場合の通知
pub const UPDATE_FAILED_MESSAGE: &str =
    "Une erreur est survenue lors de la mise à jour de la note de frais. Veuillez réessayer.";

/// カードのクリック先（対象の請求書と、それが表示されている一覧）
#[derive(Debug, Clone)]
struct Binding {
    bucket: BillStatus,
    bill: Bill,
    siblings: Vec<Bill>,
}

/// 管理者向けの請求書の仕分け画面
///
/// バケットとカードの開閉状態はこの画面が個別に持ち、作成時に初期化される
pub struct AdminTriage {
    store: Option<Arc<dyn Store>>,
    sessions: SessionManager,
    presenter: Arc<dyn Presenter>,
    navigation: NavigationContext,
    config: TriageConfig,
    buckets: HashMap<BillStatus, BucketState>,
    bucket_bills: HashMap<BillStatus, Vec<Bill>>,
    tickets: HashMap<String, TicketState>,
    bindings: HashMap<String, Binding>,
    bound_ids: HashMap<BillStatus, Vec<String>>,
    highlighted: Option<String>,
    detail: DetailPanel,
}

impl AdminTriage {
    pub fn new(
        store: Option<Arc<dyn Store>>,
        sessions: SessionManager,
        presenter: Arc<dyn Presenter>,
        navigation: NavigationContext,
        config: TriageConfig,
    ) -> Self {
        Self {
            store,
            sessions,
            presenter,
            navigation,
            config,
            buckets: HashMap::new(),
            bucket_bills: HashMap::new(),
            tickets: HashMap::new(),
            bindings: HashMap::new(),
            bound_ids: HashMap::new(),
            highlighted: None,
            detail: DetailPanel::Placeholder,
        }
    }

    /// ステータスで絞り込む（除外設定とログイン中の管理者を反映する）
    pub fn filter_bills(&self, bills: &[Bill], status: BillStatus) -> Vec<Bill> {
        let current_email = if self.config.exclude_current_user {
            match self.sessions.current() {
                Ok(session) => session.map(|s| s.email),
                Err(e) => {
                    warn!("セッションを読み取れないため管理者自身の請求書を除外できません: {e}");
                    None
                }
            }
        } else {
            None
        };

        filter_bills(bills, status, &self.config, current_email.as_deref())
    }

    /// ステータスごとの一覧を開閉する
    ///
    /// # 引数
    /// * `bills` - すべての請求書
    /// * `status_index` - 1: 審査中, 2: 承認済み, 3: 却下
    ///
    /// # 戻り値
    /// 絞り込んだ請求書（開閉に関わらず返す）
    pub fn show_tickets(&mut self, bills: &[Bill], status_index: u8) -> Vec<Bill> {
        let Some(status) = BillStatus::from_index(status_index) else {
            warn!("不明なステータス番号です: {status_index}");
            return Vec::new();
        };

        let filtered = self.filter_bills(bills, status);
        let state = self.buckets.entry(status).or_default();
        *state = state.toggled();
        let state = *state;

        // 前回このバケットで紐付けたものはすべて外してから紐付け直す
        for id in self.bound_ids.remove(&status).unwrap_or_default() {
            if self.bindings.get(&id).is_some_and(|b| b.bucket == status) {
                self.bindings.remove(&id);
            }
        }
        if state == BucketState::Shown {
            for bill in &filtered {
                self.bindings.insert(
                    bill.id.clone(),
                    Binding {
                        bucket: status,
                        bill: bill.clone(),
                        siblings: filtered.clone(),
                    },
                );
            }
            self.bound_ids
                .insert(status, filtered.iter().map(|b| b.id.clone()).collect());
        }

        debug!(
            "バケット{status_index}（{status}）: {state:?}, {}件",
            filtered.len()
        );
        self.bucket_bills.insert(status, filtered.clone());
        filtered
    }

    /// ステータスごとの一覧の表示内容
    pub fn bucket_view(&self, status: BillStatus) -> BucketView {
        let state = self.buckets.get(&status).copied().unwrap_or_default();
        let cards = match state {
            BucketState::Shown => self
                .bucket_bills
                .get(&status)
                .map(|bills| bills.iter().map(BillCard::from).collect())
                .unwrap_or_default(),
            BucketState::Hidden => Vec::new(),
        };

        BucketView {
            state,
            arrow_rotation: state.arrow_rotation(),
            cards,
        }
    }

    /// 請求書カードの選択・選択解除
    ///
    /// 選択すると他のカードはすべて選択解除され、詳細フォームが表示される
    pub fn edit_ticket(&mut self, bill: &Bill, bills: &[Bill]) -> &DetailPanel {
        let state = self.tickets.get(&bill.id).copied().unwrap_or_default();

        match state {
            TicketState::Collapsed => {
                // 同じ一覧のカードと、別のバケットで選択中のカードを閉じる
                for sibling in bills {
                    self.tickets
                        .insert(sibling.id.clone(), TicketState::Collapsed);
                }
                if let Some(previous) = self.highlighted.take() {
                    self.tickets.insert(previous, TicketState::Collapsed);
                }
                self.tickets.insert(bill.id.clone(), TicketState::Expanded);
                self.highlighted = Some(bill.id.clone());
                self.detail = DetailPanel::Form(bill.clone());
                self.presenter.set_panel_expanded(true);
                debug!(
                    "請求書を選択しました: id={}（一覧{}件のハイライトをリセット）",
                    bill.id,
                    bills.len()
                );
            }
            TicketState::Expanded => {
                self.tickets.insert(bill.id.clone(), TicketState::Collapsed);
                self.highlighted = None;
                self.detail = DetailPanel::Placeholder;
                self.presenter.set_panel_expanded(false);
                debug!("請求書の選択を解除しました: id={}", bill.id);
            }
        }

        &self.detail
    }

    /// 表示中のカードのクリック
    ///
    /// 紐付けのないIDは無視する
    pub fn click_bill(&mut self, id: &str) -> Option<&DetailPanel> {
        let Some(binding) = self.bindings.get(id).cloned() else {
            debug!("紐付けのない請求書のクリックを無視します: id={id}");
            return None;
        };

        Some(self.edit_ticket(&binding.bill, &binding.siblings))
    }

    /// 選択中の請求書のID
    pub fn highlighted(&self) -> Option<&str> {
        self.highlighted.as_deref()
    }

    pub fn ticket_state(&self, id: &str) -> TicketState {
        self.tickets.get(id).copied().unwrap_or_default()
    }

    pub fn detail(&self) -> &DetailPanel {
        &self.detail
    }

    /// 請求書を承認する
    pub async fn accept_submit(&mut self, bill: &Bill, comment: &str) -> PersistOutcome {
        self.decide(bill, BillStatus::Accepted, comment).await
    }

    /// 請求書を却下する
    pub async fn refuse_submit(&mut self, bill: &Bill, comment: &str) -> PersistOutcome {
        self.decide(bill, BillStatus::Refused, comment).await
    }

    async fn decide(&mut self, bill: &Bill, status: BillStatus, comment: &str) -> PersistOutcome {
        let decided = Bill {
            status: Some(status),
            comment_admin: Some(comment.to_string()),
            ..bill.clone()
        };

        let outcome = match &self.store {
            Some(store) => match serde_json::to_string(&decided) {
                Ok(data) => match store.bills().update(&decided.id, &data).await {
                    Ok(_) => {
                        info!("請求書を{status}に更新しました: id={}", decided.id);
                        PersistOutcome::Persisted
                    }
                    Err(e) => {
                        error!("請求書の更新に失敗しました: id={}, error={e}", decided.id);
                        self.presenter.alert(UPDATE_FAILED_MESSAGE);
                        PersistOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                },
                Err(e) => {
                    error!("請求書のシリアライズに失敗しました: {e}");
                    PersistOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            },
            None => {
                warn!("ストアが設定されていないため請求書を更新しません");
                PersistOutcome::NoStore
            }
        };

        self.navigation.navigate(Route::Dashboard);
        outcome
    }

    /// 全ユーザーの請求書を取得する（日付とステータスは未加工のまま）
    ///
    /// # 戻り値
    /// 請求書一覧。ストアが設定されていない場合はNone
    pub async fn get_bills_all_users(&self) -> AppResult<Option<Vec<Bill>>> {
        let Some(store) = &self.store else {
            return Ok(None);
        };

        let bills: Vec<Bill> = store
            .bills()
            .list()
            .await?
            .into_iter()
            .map(Bill::from)
            .collect();

        info!("全ユーザーの請求書を取得しました: {}件", bills.len());
        Ok(Some(bills))
    }

    /// 仕分け画面の描画状態を取得する
    pub async fn page_state(&self) -> PageState<Vec<Bill>> {
        PageState::from_result(
            self.get_bills_all_users()
                .await
                .map(Option::unwrap_or_default),
        )
    }

    /// 選択中の請求書の添付ファイルをモーダルで表示する
    ///
    /// # 戻り値
    /// 表示した場合はtrue
    pub fn show_receipt(&self) -> bool {
        let file_url = match &self.detail {
            DetailPanel::Form(bill) => bill.file_url.clone(),
            DetailPanel::Placeholder => None,
        };

        match file_url {
            Some(file_url) => {
                self.presenter
                    .show_modal(ModalContent::Receipt { file_url });
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::secure_storage::MemoryStorage;
    use crate::features::auth::session::{Session, UserType};
    use crate::features::store::{fixtures, MemoryStore};
    use crate::shared::testing::{RecordingNavigator, RecordingPresenter};

    struct Fixture {
        store: Arc<MemoryStore>,
        presenter: Arc<RecordingPresenter>,
        navigator: Arc<RecordingNavigator>,
        triage: AdminTriage,
    }

    fn fixture_with(store: Option<Arc<MemoryStore>>, config: TriageConfig) -> Fixture {
        let presenter = Arc::new(RecordingPresenter::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let sessions = SessionManager::new(Arc::new(MemoryStorage::new()));
        sessions
            .save(&Session::connected(
                UserType::Admin,
                "admin@company.tld",
                "admin",
            ))
            .unwrap();

        let backing = store
            .clone()
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let triage = AdminTriage::new(
            store.map(|s| s as Arc<dyn Store>),
            sessions,
            presenter.clone(),
            NavigationContext::new(navigator.clone()),
            config,
        );

        Fixture {
            store: backing,
            presenter,
            navigator,
            triage,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            Some(Arc::new(MemoryStore::new().with_bills(fixtures::bills()))),
            TriageConfig::default(),
        )
    }

    fn bills() -> Vec<Bill> {
        fixtures::bills().into_iter().map(Bill::from).collect()
    }

    #[test]
    fn test_pending_filter_excludes_test_accounts_and_self() {
        let f = fixture();
        let mut all = bills();
        let mut own = all[0].clone();
        own.id = "own".to_string();
        own.email = "admin@company.tld".to_string();
        let mut test_account = all[0].clone();
        test_account.id = "test".to_string();
        test_account.email = "admin@test.tld".to_string();
        all.push(own);
        all.push(test_account);

        let pending = f.triage.filter_bills(&all, BillStatus::Pending);
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "47qAXb6fIm2zOKkLzMro");
    }

    #[test]
    fn test_show_tickets_toggles_bucket() {
        let mut f = fixture();
        let all = bills();

        let accepted = f.triage.show_tickets(&all, 2);
        assert_eq!(accepted.len(), 1);
        let view = f.triage.bucket_view(BillStatus::Accepted);
        assert_eq!(view.state, BucketState::Shown);
        assert_eq!(view.arrow_rotation, 0);
        assert_eq!(view.cards.len(), 1);
        assert_eq!(view.cards[0].name, "test3");

        let accepted = f.triage.show_tickets(&all, 2);
        assert_eq!(accepted.len(), 1);
        let view = f.triage.bucket_view(BillStatus::Accepted);
        assert_eq!(view.state, BucketState::Hidden);
        assert_eq!(view.arrow_rotation, 90);
        assert!(view.cards.is_empty());

        // 他のバケットは独立している
        assert_eq!(
            f.triage.bucket_view(BillStatus::Refused).state,
            BucketState::Hidden
        );
        assert_eq!(f.triage.show_tickets(&all, 3).len(), 2);
        assert_eq!(
            f.triage.bucket_view(BillStatus::Refused).state,
            BucketState::Shown
        );
    }

    #[test]
    fn test_show_tickets_unknown_index() {
        let mut f = fixture();
        assert!(f.triage.show_tickets(&bills(), 4).is_empty());
    }

    #[test]
    fn test_click_bill_expands_then_collapses() {
        let mut f = fixture();
        f.triage.show_tickets(&bills(), 1);

        let detail = f.triage.click_bill("47qAXb6fIm2zOKkLzMro").cloned();
        assert!(matches!(detail, Some(DetailPanel::Form(ref bill)) if bill.name == "encore"));
        assert_eq!(f.triage.highlighted(), Some("47qAXb6fIm2zOKkLzMro"));

        let detail = f.triage.click_bill("47qAXb6fIm2zOKkLzMro").cloned();
        assert_eq!(detail, Some(DetailPanel::Placeholder));
        assert_eq!(f.triage.highlighted(), None);
        assert_eq!(f.presenter.panel_states(), vec![true, false]);
    }

    #[test]
    fn test_click_on_unbound_bill_is_ignored() {
        let mut f = fixture();
        assert!(f.triage.click_bill("47qAXb6fIm2zOKkLzMro").is_none());

        f.triage.show_tickets(&bills(), 1);
        f.triage.show_tickets(&bills(), 1);
        assert!(f.triage.click_bill("47qAXb6fIm2zOKkLzMro").is_none());
        assert!(f.presenter.panel_states().is_empty());
    }

    #[test]
    fn test_repeated_show_tickets_does_not_accumulate_bindings() {
        let mut f = fixture();
        for _ in 0..3 {
            f.triage.show_tickets(&bills(), 1);
        }

        // 一度のクリックで一度だけ開く
        f.triage.click_bill("47qAXb6fIm2zOKkLzMro");
        assert_eq!(f.presenter.panel_states(), vec![true]);
        assert_eq!(
            f.triage.ticket_state("47qAXb6fIm2zOKkLzMro"),
            TicketState::Expanded
        );
    }

    #[test]
    fn test_refiltered_bucket_drops_bills_that_changed_status() {
        let mut f = fixture();
        let mut all = bills();
        f.triage.show_tickets(&all, 1);

        all[0].status = Some(BillStatus::Accepted);
        f.triage.show_tickets(&all, 1);
        assert!(f.triage.show_tickets(&all, 1).is_empty());

        assert!(f.triage.click_bill("47qAXb6fIm2zOKkLzMro").is_none());
        assert!(f.presenter.panel_states().is_empty());
    }

    #[test]
    fn test_bill_moved_to_another_bucket_keeps_new_binding() {
        let mut f = fixture();
        let mut all = bills();
        f.triage.show_tickets(&all, 1);

        all[0].status = Some(BillStatus::Accepted);
        f.triage.show_tickets(&all, 2);
        // 審査中のバケットを閉じても承認済みの紐付けは残る
        f.triage.show_tickets(&all, 1);

        let detail = f.triage.click_bill("47qAXb6fIm2zOKkLzMro").cloned();
        assert!(matches!(
            detail,
            Some(DetailPanel::Form(ref bill)) if bill.status == Some(BillStatus::Accepted)
        ));
    }

    #[test]
    fn test_edit_ticket_resets_given_list_and_other_bucket() {
        let mut f = fixture();
        let all = bills();
        let refused = f.triage.show_tickets(&all, 3);
        let pending = f.triage.show_tickets(&all, 1);

        f.triage.click_bill(&refused[0].id);
        f.triage.edit_ticket(&pending[0], &pending);

        assert_eq!(f.triage.ticket_state(&refused[0].id), TicketState::Collapsed);
        assert_eq!(f.triage.ticket_state(&pending[0].id), TicketState::Expanded);
        for sibling in &refused {
            assert_eq!(f.triage.ticket_state(&sibling.id), TicketState::Collapsed);
        }
        assert_eq!(f.triage.highlighted(), Some(pending[0].id.as_str()));
    }

    #[test]
    fn test_only_one_bill_is_active() {
        let mut f = fixture();
        let refused = f.triage.show_tickets(&bills(), 3);

        f.triage.click_bill(&refused[0].id);
        f.triage.click_bill(&refused[1].id);

        assert_eq!(f.triage.highlighted(), Some(refused[1].id.as_str()));
        assert_eq!(f.triage.ticket_state(&refused[0].id), TicketState::Collapsed);
        assert_eq!(f.triage.ticket_state(&refused[1].id), TicketState::Expanded);

        // 以前の選択は解除済みなので、もう一度クリックすると再び選択される
        f.triage.click_bill(&refused[0].id);
        assert_eq!(f.triage.highlighted(), Some(refused[0].id.as_str()));
    }

    #[tokio::test]
    async fn test_accept_submit_persists_and_navigates() {
        let mut f = fixture();
        let bill = bills().remove(0);

        let outcome = f.triage.accept_submit(&bill, "ok pour moi").await;

        assert_eq!(outcome, PersistOutcome::Persisted);
        assert_eq!(f.navigator.routes(), vec![Route::Dashboard]);
        let stored = f
            .store
            .bills_snapshot()
            .into_iter()
            .find(|b| b.id.as_deref() == Some("47qAXb6fIm2zOKkLzMro"))
            .unwrap();
        assert_eq!(stored.status.as_deref(), Some("accepted"));
        assert_eq!(stored.comment_admin.as_deref(), Some("ok pour moi"));
        assert_eq!(stored.name.as_deref(), Some("encore"));
    }

    #[tokio::test]
    async fn test_refuse_submit_failure_still_navigates() {
        let mut f = fixture();
        f.store.fail_update("Erreur 500");
        let bill = bills().remove(0);

        let outcome = f.triage.refuse_submit(&bill, "").await;

        assert_eq!(
            outcome,
            PersistOutcome::Failed {
                reason: "Erreur 500".to_string()
            }
        );
        assert_eq!(f.navigator.routes(), vec![Route::Dashboard]);
        assert_eq!(f.presenter.alerts(), vec![UPDATE_FAILED_MESSAGE]);
    }

    #[tokio::test]
    async fn test_decision_without_store() {
        let mut f = fixture_with(None, TriageConfig::default());
        let outcome = f.triage.accept_submit(&bills()[0], "").await;
        assert_eq!(outcome, PersistOutcome::NoStore);
        assert_eq!(f.navigator.routes(), vec![Route::Dashboard]);
    }

    #[tokio::test]
    async fn test_get_bills_all_users_keeps_raw_values() {
        let f = fixture();

        let all = f.triage.get_bills_all_users().await.unwrap().unwrap();

        assert_eq!(all.len(), 4);
        assert_eq!(all[0].date, "2004-04-04");
        assert_eq!(all[0].status, Some(BillStatus::Pending));
    }

    #[tokio::test]
    async fn test_get_bills_all_users_propagates_errors() {
        let f = fixture();
        f.store.fail_list("Erreur 500");

        assert!(f.triage.get_bills_all_users().await.is_err());
        assert_eq!(
            f.triage.page_state().await,
            PageState::Error("Erreur 500".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_bills_all_users_without_store() {
        let f = fixture_with(None, TriageConfig::default());
        assert_eq!(f.triage.get_bills_all_users().await.unwrap(), None);
    }

    #[test]
    fn test_show_receipt_for_expanded_bill() {
        let mut f = fixture();
        assert!(!f.triage.show_receipt());

        f.triage.show_tickets(&bills(), 1);
        f.triage.click_bill("47qAXb6fIm2zOKkLzMro");

        assert!(f.triage.show_receipt());
        assert_eq!(f.presenter.modals().len(), 1);
    }
}
