use serde::{Deserialize, Serialize};

/// 請求書作成時に送信するマルチパートの内容
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPayload {
    /// アップロードするファイル名
    pub file_name: String,
    /// ファイルのMIMEタイプ
    pub media_type: String,
    /// ファイルの中身
    pub content: Vec<u8>,
    /// ログイン中のユーザーのメールアドレス
    pub email: String,
}

/// 請求書作成（ファイルアップロード）のレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBill {
    /// ストアが割り当てた請求書ID
    pub key: String,
    /// サーバーが返すファイルURL（返さないバックエンドもある）
    #[serde(default)]
    pub file_url: Option<String>,
    /// サーバー側で付け直されたファイル名
    #[serde(default)]
    pub file_name: Option<String>,
    /// fileUrlがない場合にURLを合成するためのパス
    #[serde(default)]
    pub file_path: Option<String>,
}

/// ログイン要求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// ログインのレスポンス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub jwt: String,
}

/// ユーザー作成要求
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    #[serde(rename = "type")]
    pub user_type: String,
    pub name: String,
    pub email: String,
    pub password: String,
}
