use crate::features::bills::format::format_date;
use crate::features::bills::models::{Bill, BillStatus};
use crate::shared::config::environment::{parse_test_accounts, BilledConfig, DEFAULT_TEST_ACCOUNTS};
use crate::shared::utils::email_local_part;

/// 管理画面の絞り込み設定
#[derive(Debug, Clone, PartialEq)]
pub struct TriageConfig {
    /// 一覧から除外するテストアカウント
    pub test_accounts: Vec<String>,
    /// ログイン中の管理者自身の請求書を除外するかどうか
    pub exclude_current_user: bool,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            test_accounts: parse_test_accounts(DEFAULT_TEST_ACCOUNTS),
            exclude_current_user: true,
        }
    }
}

impl From<&BilledConfig> for TriageConfig {
    fn from(config: &BilledConfig) -> Self {
        Self {
            test_accounts: config.test_accounts.clone(),
            exclude_current_user: config.exclude_current_user,
        }
    }
}

/// ステータスごとの一覧（バケット）の開閉状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketState {
    #[default]
    Hidden,
    Shown,
}

impl BucketState {
    pub fn toggled(self) -> Self {
        match self {
            BucketState::Hidden => BucketState::Shown,
            BucketState::Shown => BucketState::Hidden,
        }
    }

    /// 矢印アイコンの回転角度（度）
    pub fn arrow_rotation(self) -> u16 {
        match self {
            BucketState::Shown => 0,
            BucketState::Hidden => 90,
        }
    }
}

/// 請求書カードの選択状態
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TicketState {
    #[default]
    Collapsed,
    Expanded,
}

/// 右側の詳細パネルに表示する内容
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DetailPanel {
    /// 請求書が選択されていない（大きなアイコンを表示）
    #[default]
    Placeholder,
    /// 選択中の請求書の詳細フォーム
    Form(Bill),
}

/// 管理者の承認・却下の保存結果
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    Persisted,
    NoStore,
    Failed { reason: String },
}

/// 一覧に表示する請求書カード
#[derive(Debug, Clone, PartialEq)]
pub struct BillCard {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub amount: Option<i64>,
    pub date: String,
    pub bill_type: String,
}

impl From<&Bill> for BillCard {
    fn from(bill: &Bill) -> Self {
        // "prenom.nom@..." の形式であれば名と姓に分ける
        let local = email_local_part(&bill.email);
        let (first_name, last_name) = match local.split_once('.') {
            Some((first, rest)) => (
                first.to_string(),
                rest.split('.').next().unwrap_or_default().to_string(),
            ),
            None => (String::new(), local.to_string()),
        };

        Self {
            id: bill.id.clone(),
            first_name,
            last_name,
            name: bill.name.clone(),
            amount: bill.amount,
            date: format_date(&bill.date).unwrap_or_else(|_| bill.date.clone()),
            bill_type: bill.bill_type.clone(),
        }
    }
}

/// ステータスごとの一覧の表示内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketView {
    pub state: BucketState,
    pub arrow_rotation: u16,
    /// 開いている場合のみカードが入る
    pub cards: Vec<BillCard>,
}

/// ステータスで絞り込み、テストアカウントと管理者自身の請求書を除外する
///
/// # 引数
/// * `bills` - すべての請求書
/// * `status` - 表示するステータス
/// * `config` - 除外設定
/// * `current_email` - ログイン中の管理者のメールアドレス
pub fn filter_bills(
    bills: &[Bill],
    status: BillStatus,
    config: &TriageConfig,
    current_email: Option<&str>,
) -> Vec<Bill> {
    let excluded_self = current_email.filter(|_| config.exclude_current_user);

    bills
        .iter()
        .filter(|bill| bill.status == Some(status))
        .filter(|bill| !config.test_accounts.iter().any(|account| *account == bill.email))
        .filter(|bill| excluded_self != Some(bill.email.as_str()))
        .cloned()
        .collect()
}
