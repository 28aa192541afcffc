//! # 合成コマンドの設定
//!
//! 環境変数から合成パスの入力を読み込む。
//!
//! 読み込み自体は [`SynthConfig::from_lookup`] に切り出してあり、テストでは
//! `HashMap` などから値を渡せる。

use std::{env, path::PathBuf};

use contenthub_domain::{
    graph::{API_KEY_MAX_EXPIRY_DAYS, AuthMode},
    refs::{ClientRef, ComputeRef, DirectoryRef, SchemaAssetPath, StoreRef},
};

use crate::{SynthError, construct::ApiConstructProps};

/// スキーマアセットの既定パス
pub const DEFAULT_SCHEMA_ASSET_PATH: &str = "./lib/content-hub-repository/schema.graphql";
/// API キーの既定の有効日数
pub const DEFAULT_API_KEY_EXPIRES_DAYS: i64 = 365;
const DEFAULT_REGION: &str = "ap-northeast-1";
const DEFAULT_OUTPUT_DIR: &str = "cdk.out";
const DEFAULT_STACK_NAME: &str = "ContentHubApi";

/// グラフ層のデフォルト認可方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphDefaultAuth {
    /// API キー（開発向けの既定値）
    #[default]
    ApiKey,
    /// 署名付きリクエスト
    Iam,
}

impl GraphDefaultAuth {
    fn parse(value: &str) -> Result<Self, SynthError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "api_key" => Ok(Self::ApiKey),
            "iam" => Ok(Self::Iam),
            other => Err(SynthError::config(format!(
                "GRAPH_DEFAULT_AUTH は api_key または iam である必要があります: {other:?}"
            ))),
        }
    }
}

/// 合成コマンドの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthConfig {
    /// 環境名（グラフ層の名前 `API-{environment}` に使う）
    pub environment:             String,
    /// コンピュートハンドラの参照
    pub compute_integration_ref: String,
    /// ユーザーディレクトリの参照
    pub directory_ref:           String,
    /// クライアントの参照（カンマ区切りを分割済み）
    pub client_refs:             Vec<String>,
    /// テーブルの参照
    pub store_ref:               String,
    pub schema_asset_path:       String,
    pub graph_default_auth:      GraphDefaultAuth,
    pub api_key_expires_days:    i64,
    pub region:                  String,
    /// テンプレートの出力先ディレクトリ
    pub output_dir:              PathBuf,
    pub stack_name:              String,
}

impl SynthConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, SynthError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー検索関数から設定を読み込む
    ///
    /// 必須項目の欠落と数値・列挙値の不正は `SynthError::Config` を返す。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SynthError> {
        let required = |key: &str| {
            lookup(key)
                .ok_or_else(|| SynthError::config(format!("{key} が設定されていません")))
        };
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let client_refs = required("USER_DIRECTORY_CLIENT_REFS")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let graph_default_auth = match lookup("GRAPH_DEFAULT_AUTH") {
            Some(value) => GraphDefaultAuth::parse(&value)?,
            None => GraphDefaultAuth::default(),
        };

        let api_key_expires_days = match lookup("GRAPH_API_KEY_EXPIRES_DAYS") {
            Some(value) => value
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|days| (1..=API_KEY_MAX_EXPIRY_DAYS).contains(days))
                .ok_or_else(|| {
                    SynthError::config(format!(
                        "GRAPH_API_KEY_EXPIRES_DAYS は 1 以上 {API_KEY_MAX_EXPIRY_DAYS} 以下の整数である必要があります: {value:?}"
                    ))
                })?,
            None => DEFAULT_API_KEY_EXPIRES_DAYS,
        };

        Ok(Self {
            environment: required("CONTENT_HUB_ENVIRONMENT")?,
            compute_integration_ref: required("COMPUTE_INTEGRATION_REF")?,
            directory_ref: required("USER_DIRECTORY_REF")?,
            client_refs,
            store_ref: required("STORE_REF")?,
            schema_asset_path: optional("SCHEMA_ASSET_PATH", DEFAULT_SCHEMA_ASSET_PATH),
            graph_default_auth,
            api_key_expires_days,
            region: optional("AWS_REGION", DEFAULT_REGION),
            output_dir: PathBuf::from(optional("SYNTH_OUTPUT_DIR", DEFAULT_OUTPUT_DIR)),
            stack_name: optional("STACK_NAME", DEFAULT_STACK_NAME),
        })
    }

    /// 合成パスの入力に変換する
    ///
    /// 参照値の検証（空文字・長さ）はここで行われ、違反は `SynthError::Domain` になる。
    /// クライアント一覧が空であることの検証は合成パス側に任せる。
    pub fn to_props(&self) -> Result<ApiConstructProps, SynthError> {
        let client_refs = self
            .client_refs
            .iter()
            .map(ClientRef::new)
            .collect::<Result<Vec<_>, _>>()?;

        let (default_auth_mode, additional_auth_modes) = match self.graph_default_auth {
            GraphDefaultAuth::ApiKey => (
                AuthMode::api_key_days(self.api_key_expires_days)?,
                vec![AuthMode::SignedRequest],
            ),
            GraphDefaultAuth::Iam => (AuthMode::SignedRequest, Vec::new()),
        };

        let props = ApiConstructProps::new(
            ComputeRef::new(&self.compute_integration_ref)?,
            Some(DirectoryRef::new(&self.directory_ref)?),
            client_refs,
            StoreRef::new(&self.store_ref)?,
            &self.environment,
        )?
        .with_schema_asset(SchemaAssetPath::new(&self.schema_asset_path)?)
        .with_default_auth_mode(default_auth_mode)
        .with_additional_auth_modes(additional_auth_modes);

        Ok(props)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use maplit::hashmap;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn required_vars() -> HashMap<&'static str, &'static str> {
        hashmap! {
            "CONTENT_HUB_ENVIRONMENT" => "dev",
            "COMPUTE_INTEGRATION_REF" => "arn:aws:lambda:ap-northeast-1:123456789012:function:presign",
            "USER_DIRECTORY_REF" => "ap-northeast-1_AbCdEf",
            "USER_DIRECTORY_CLIENT_REFS" => "client-a, client-b",
            "STORE_REF" => "FilesTable",
        }
    }

    fn load(vars: &HashMap<&'static str, &'static str>) -> Result<SynthConfig, SynthError> {
        SynthConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_必須項目だけで既定値が補われる() {
        let config = load(&required_vars()).unwrap();

        assert_eq!(config.environment, "dev");
        assert_eq!(config.client_refs, vec!["client-a", "client-b"]);
        assert_eq!(config.schema_asset_path, DEFAULT_SCHEMA_ASSET_PATH);
        assert_eq!(config.graph_default_auth, GraphDefaultAuth::ApiKey);
        assert_eq!(config.api_key_expires_days, 365);
        assert_eq!(config.region, "ap-northeast-1");
        assert_eq!(config.output_dir, PathBuf::from("cdk.out"));
        assert_eq!(config.stack_name, "ContentHubApi");
    }

    #[rstest]
    #[case("CONTENT_HUB_ENVIRONMENT")]
    #[case("COMPUTE_INTEGRATION_REF")]
    #[case("USER_DIRECTORY_REF")]
    #[case("USER_DIRECTORY_CLIENT_REFS")]
    #[case("STORE_REF")]
    fn test_必須項目が欠けると設定エラー(#[case] missing: &str) {
        let mut vars = required_vars();
        vars.remove(missing);

        let err = load(&vars).unwrap_err();

        assert!(matches!(err, SynthError::Config(ref msg) if msg.contains(missing)));
    }

    #[rstest]
    #[case("GRAPH_DEFAULT_AUTH", "cognito")]
    #[case("GRAPH_API_KEY_EXPIRES_DAYS", "one year")]
    #[case("GRAPH_API_KEY_EXPIRES_DAYS", "9223372036854775807")]
    #[case("GRAPH_API_KEY_EXPIRES_DAYS", "366")]
    #[case("GRAPH_API_KEY_EXPIRES_DAYS", "0")]
    fn test_不正な任意項目は設定エラー(#[case] key: &'static str, #[case] value: &'static str) {
        let mut vars = required_vars();
        vars.insert(key, value);

        let err = load(&vars).unwrap_err();

        assert!(matches!(err, SynthError::Config(ref msg) if msg.contains(key)));
    }

    #[test]
    fn test_iamを指定するとapi_keyモードは使われない() {
        let mut vars = required_vars();
        vars.insert("GRAPH_DEFAULT_AUTH", "IAM");

        let props = load(&vars).unwrap().to_props().unwrap();

        assert_eq!(props.default_auth_mode, AuthMode::SignedRequest);
        assert!(props.additional_auth_modes.is_empty());
    }

    #[test]
    fn test_クライアント一覧が空でも読み込みは成功する() {
        let mut vars = required_vars();
        vars.insert("USER_DIRECTORY_CLIENT_REFS", " , ");

        let config = load(&vars).unwrap();

        assert!(config.client_refs.is_empty());
        assert!(config.to_props().unwrap().client_refs.is_empty());
    }

    #[test]
    fn test_空の参照値はドメインの構成エラー() {
        let mut vars = required_vars();
        vars.insert("STORE_REF", "  ");

        let err = load(&vars).unwrap().to_props().unwrap_err();

        assert!(matches!(err, SynthError::Domain(ref e) if e.is_config()));
    }
}
