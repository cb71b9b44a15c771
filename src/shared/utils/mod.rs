pub mod nanoid;

pub use nanoid::{generate_bill_key, is_valid_nanoid};

/// フォーム入力の文字列から先頭の整数部分を取り出す
///
/// # 引数
/// * `input` - フォームの入力値
///
/// # 戻り値
/// 整数として解釈できた値、数字が一つもない場合はNone
///
/// # 解釈規則
/// - 先頭の空白は無視する
/// - 符号（+/-）を一つだけ許可する
/// - 数字が途切れた位置で打ち切る（"12abc" は 12、"3.7" は 3）
pub fn parse_int_prefix(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// 選択されたファイルのパスからファイル名を取り出す
///
/// ブラウザは `C:\fakepath\receipt.png` の形式でパスを返すため、
/// バックスラッシュとスラッシュの両方で区切る
pub fn file_name_from_path(path: &str) -> &str {
    path.rsplit(|c| c == '\\' || c == '/')
        .next()
        .unwrap_or(path)
}

/// バックスラッシュをスラッシュに正規化する
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// メールアドレスのローカル部を取得する
pub fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
