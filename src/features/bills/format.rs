// 日付とステータスを表示用の文字列に変換する

use crate::shared::errors::{AppError, AppResult};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::cmp::Ordering;

/// フランス語ロケールの月の略称（先頭を大文字にして3文字に切り詰めたもの）
const MONTHS_FR: [&str; 12] = [
    "Jan", "Fév", "Mar", "Avr", "Mai", "Jui", "Jui", "Aoû", "Sep", "Oct", "Nov", "Déc",
];

/// 未加工の日付文字列を解析する
///
/// # 受け付ける形式
/// - `YYYY-MM-DD`
/// - RFC 3339（`2004-04-04T10:00:00Z` など）
/// - タイムゾーンなしの `YYYY-MM-DDTHH:MM:SS`
pub fn parse_raw_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// 並べ替え用に日付を時刻まで含めて解析する（UTC）
///
/// オフセット付きの値はUTCに変換し、タイムゾーンなしの値はそのまま、
/// 日付のみの値はその日の0時として扱う
pub fn parse_sort_key(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// 日付を `"D Mon. YY"` 形式に変換する
///
/// # 引数
/// * `raw` - ストアから受け取った日付文字列
///
/// # 戻り値
/// 表示用の日付（例: `"4 Avr. 04"`）、解析できない場合はバリデーションエラー
pub fn format_date(raw: &str) -> AppResult<String> {
    let date = parse_raw_date(raw)
        .ok_or_else(|| AppError::validation(format!("日付を解析できません: {raw:?}")))?;

    let month = MONTHS_FR[date.month0() as usize];
    let year = date.year().rem_euclid(100);
    Ok(format!("{} {month}. {year:02}", date.day()))
}

/// ステータスコードを表示用のラベルに変換する
///
/// 未知のコードはそのまま返す
pub fn format_status(code: &str) -> String {
    match code {
        "pending" => "En attente".to_string(),
        "accepted" => "Accepté".to_string(),
        "refused" => "Refusé".to_string(),
        other => other.to_string(),
    }
}

/// 未加工の日付を新しい順に比較する
///
/// 時刻とオフセットも比較に含める。解析できない日付は有効な日付よりも後ろに並べる
pub fn compare_raw_dates_desc(a: &str, b: &str) -> Ordering {
    match (parse_sort_key(a), parse_sort_key(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
