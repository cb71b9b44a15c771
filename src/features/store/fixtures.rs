// テスト用の請求書データ

use crate::features::bills::models::RawBill;

fn raw(
    id: &str,
    name: &str,
    amount: i64,
    date: &str,
    status: &str,
    bill_type: &str,
    file_name: &str,
) -> RawBill {
    RawBill {
        id: Some(id.to_string()),
        email: Some("a@a".to_string()),
        bill_type: Some(bill_type.to_string()),
        name: Some(name.to_string()),
        amount: Some(amount),
        date: Some(date.to_string()),
        vat: Some("20".to_string()),
        pct: Some(20),
        commentary: Some(String::new()),
        comment_admin: None,
        file_url: Some(format!("https://test.storage.tld/{file_name}")),
        file_name: Some(file_name.to_string()),
        status: Some(status.to_string()),
    }
}

/// 日付がばらばらの4件の請求書
pub(crate) fn bills() -> Vec<RawBill> {
    vec![
        raw(
            "47qAXb6fIm2zOKkLzMro",
            "encore",
            400,
            "2004-04-04",
            "pending",
            "Hôtel et logement",
            "preview-facture-free-201801-pdf-1.jpg",
        ),
        raw(
            "BeKy5Mo4jkmdfPGYpTxZ",
            "test1",
            100,
            "2001-01-01",
            "refused",
            "Transports",
            "1592770761.jpeg",
        ),
        raw(
            "UIUZtnPQvnbFnB0ozvJh",
            "test3",
            300,
            "2003-03-03",
            "accepted",
            "Services en ligne",
            "facture-client-php.png",
        ),
        raw(
            "qcCK3SzECmaZAGRrHjaC",
            "test2",
            200,
            "2002-02-02",
            "refused",
            "Restaurants et bars",
            "preview-facture-free-201801-pdf-1.jpg",
        ),
    ]
}
