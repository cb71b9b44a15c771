use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// TVA率が未設定・解析不能な場合の既定値（%）
pub const DEFAULT_PCT: i64 = 20;

/// 請求書のステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Pending,
    Accepted,
    Refused,
}

impl BillStatus {
    /// ストアに保存される文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Accepted => "accepted",
            BillStatus::Refused => "refused",
        }
    }

    /// 管理画面のバケット番号（1=pending, 2=accepted, 3=refused）から取得する
    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            1 => Some(BillStatus::Pending),
            2 => Some(BillStatus::Accepted),
            3 => Some(BillStatus::Refused),
            _ => None,
        }
    }

    /// 管理画面のバケット番号
    pub fn index(&self) -> u8 {
        match self {
            BillStatus::Pending => 1,
            BillStatus::Accepted => 2,
            BillStatus::Refused => 3,
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BillStatus::Pending),
            "accepted" => Ok(BillStatus::Accepted),
            "refused" => Ok(BillStatus::Refused),
            other => Err(format!("不明なステータスです: {other}")),
        }
    }
}

/// コレクションストアから受け取る未加工の請求書レコード
///
/// バックエンドが返すレコードは形が揃っていないため、すべて省略可能として受け取る。
/// 数値フィールドは数値・数値文字列のどちらも受け付ける。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBill {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "type")]
    pub bill_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub amount: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub vat: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub pct: Option<i64>,
    #[serde(default)]
    pub commentary: Option<String>,
    #[serde(default)]
    pub comment_admin: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl RawBill {
    /// 一覧表示に必要な name / amount / status が揃っているかを判定する
    ///
    /// 空文字列と金額0は欠落として扱う
    pub fn has_required_fields(&self) -> bool {
        let present = |field: &Option<String>| field.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.name) && self.amount.is_some_and(|a| a != 0) && present(&self.status)
    }
}

/// 永続化される請求書
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// ストアが作成時に割り当てる識別子（送信前の下書きでは空）
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub email: String,
    #[serde(rename = "type")]
    pub bill_type: String,
    pub name: String,
    /// 数値として解釈できない入力はnull（None）のまま保存する
    pub amount: Option<i64>,
    pub date: String,
    pub vat: String,
    pub pct: i64,
    pub commentary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_admin: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    /// 不明なステータス文字列はNone
    pub status: Option<BillStatus>,
}

impl From<RawBill> for Bill {
    fn from(raw: RawBill) -> Self {
        let status = raw.status.as_deref().and_then(|s| s.parse().ok());
        Self {
            id: raw.id.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            bill_type: raw.bill_type.unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            amount: raw.amount,
            date: raw.date.unwrap_or_default(),
            vat: raw.vat.unwrap_or_default(),
            pct: raw.pct.unwrap_or(DEFAULT_PCT),
            commentary: raw.commentary.unwrap_or_default(),
            comment_admin: raw.comment_admin,
            file_url: raw.file_url,
            file_name: raw.file_name,
            status,
        }
    }
}

/// 表示用の請求書（永続化されない）
///
/// `date` と `status` は表示用の文字列で上書きされる。
/// 並び替えには必ず `raw_date` を使う。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayBill {
    pub id: String,
    pub email: String,
    #[serde(rename = "type")]
    pub bill_type: String,
    pub name: String,
    pub amount: Option<i64>,
    /// 表示用にフォーマットされた日付（フォーマット失敗時は元の値）
    pub date: String,
    /// ストアから受け取った元の日付
    pub raw_date: String,
    pub vat: String,
    pub pct: i64,
    pub commentary: String,
    pub comment_admin: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    /// 表示用のステータスラベル
    pub status: String,
}

/// 数値・数値文字列・nullのいずれも受け付ける整数デシリアライザ
fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Some(serde_json::Value::String(s)) => crate::shared::utils::parse_int_prefix(&s),
        _ => None,
    })
}

/// 文字列・数値のどちらも文字列として受け付けるデシリアライザ
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_bill_tolerates_heterogeneous_records() {
        let json = r#"{
            "id": "47qAXb6fIm2zOKkLzMro",
            "vat": 80,
            "status": "pending",
            "type": "Hôtel et logement",
            "name": "encore",
            "date": "2004-04-04",
            "amount": "400",
            "pct": null,
            "email": "a@a",
            "unknownField": true
        }"#;

        let raw: RawBill = serde_json::from_str(json).unwrap();
        assert_eq!(raw.amount, Some(400));
        assert_eq!(raw.vat.as_deref(), Some("80"));
        assert_eq!(raw.pct, None);
        assert_eq!(raw.bill_type.as_deref(), Some("Hôtel et logement"));
        assert_eq!(raw.file_url, None);
    }

    #[test]
    fn test_has_required_fields() {
        let complete = RawBill {
            name: Some("test1".to_string()),
            amount: Some(100),
            status: Some("refused".to_string()),
            ..RawBill::default()
        };
        assert!(complete.has_required_fields());

        let empty_name = RawBill {
            name: Some(String::new()),
            ..complete.clone()
        };
        assert!(!empty_name.has_required_fields());

        let zero_amount = RawBill {
            amount: Some(0),
            ..complete.clone()
        };
        assert!(!zero_amount.has_required_fields());

        let missing_status = RawBill {
            status: None,
            ..complete
        };
        assert!(!missing_status.has_required_fields());
    }

    #[test]
    fn test_bill_from_raw_applies_defaults() {
        let raw = RawBill {
            id: Some("abc".to_string()),
            status: Some("accepted".to_string()),
            ..RawBill::default()
        };

        let bill = Bill::from(raw);
        assert_eq!(bill.id, "abc");
        assert_eq!(bill.pct, DEFAULT_PCT);
        assert_eq!(bill.status, Some(BillStatus::Accepted));

        let unknown = Bill::from(RawBill {
            status: Some("archived".to_string()),
            ..RawBill::default()
        });
        assert_eq!(unknown.status, None);
    }

    #[test]
    fn test_bill_serializes_camel_case_and_nan_amount_as_null() {
        let bill = Bill {
            id: String::new(),
            email: "employee@test.tld".to_string(),
            bill_type: "Transports".to_string(),
            name: "Vol Paris Londres".to_string(),
            amount: None,
            date: "2023-04-04".to_string(),
            vat: "70".to_string(),
            pct: 20,
            commentary: String::new(),
            comment_admin: None,
            file_url: Some("https://localhost/facture.png".to_string()),
            file_name: Some("facture.png".to_string()),
            status: Some(BillStatus::Pending),
        };

        let json = serde_json::to_value(&bill).unwrap();
        assert_eq!(json["type"], "Transports");
        assert_eq!(json["fileUrl"], "https://localhost/facture.png");
        assert_eq!(json["status"], "pending");
        assert!(json["amount"].is_null());
        assert!(json.get("id").is_none());
        assert!(json.get("commentAdmin").is_none());
    }

    #[test]
    fn test_status_index_mapping() {
        for status in [BillStatus::Pending, BillStatus::Accepted, BillStatus::Refused] {
            assert_eq!(BillStatus::from_index(status.index()), Some(status));
            assert_eq!(status.as_str().parse::<BillStatus>(), Ok(status));
        }
        assert_eq!(BillStatus::from_index(0), None);
        assert_eq!(BillStatus::from_index(4), None);
    }
}
