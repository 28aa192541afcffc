//! # Content Hub API 構成
//!
//! ルーティング層とグラフクエリ層を共有テーブルの前段に組み立てる合成パス。
//!
//! ## 合成の順序
//!
//! ```text
//! 入力検証 → 認可バインド → ルーティング層作成 → ルート追加
//!   → ドメイン解決 → グラフ層作成（スキーマ読み込み）
//!   → データソースバインド → 出力公開
//! ```
//!
//! 構成エラー（`DomainError::Config`）はすべて、スコープにノードを登録する前に
//! 検出される。登録後に失敗した場合（アセットエラーなど）は、このビルドで
//! 登録したノードを取り消してからエラーを返す。
//!
//! 子ノードは構成 ID の下に登録する（`{id}/http-api`、`{id}/graphql-api`）。
//! そのため 1 つのスコープに別 ID の構成を複数組み立てられる。
//!
//! ## 固定の面
//!
//! - ルート: `GET /api/get-presigned-url`（統合名 `get-presigned-url`）
//! - CORS: ヘッダー `Authorization`、メソッド `GET` / `OPTIONS`、オリジン `*`、
//!   公開ヘッダー `Date` / `x-api-id`、max-age 10 日
//! - データソース: `files-table`
//! - 出力: `ApiEndpoint` / `ApiUrl` / `ApiId` / `ApiKey`

use chrono::TimeDelta;
use contenthub_domain::{
    DomainError,
    authorizer::{self, AuthorizerBinding},
    graph::{self, AuthMode, DataSourceBinding, GraphLayer, GraphLayerSpec},
    output::{OutputExporter, OutputRecord},
    refs::{ClientRef, ComputeRef, DirectoryRef, SchemaAssetPath, StoreRef},
    route::{CorsPolicy, RouteIntegration, RouteLayer},
    schema::SchemaSource,
    scope::ProvisioningScope,
    value_objects::{CorsMethod, HttpMethod},
};

use crate::config::{DEFAULT_API_KEY_EXPIRES_DAYS, DEFAULT_SCHEMA_ASSET_PATH};

/// ルーティング層の論理 ID（構成 ID の下に置く）
pub const ROUTE_LAYER_ID: &str = "http-api";
/// グラフクエリ層の論理 ID（構成 ID の下に置く）
pub const GRAPH_LAYER_ID: &str = "graphql-api";
/// データソース名
pub const DATA_SOURCE_NAME: &str = "files-table";
/// ルートのパス
pub const PRESIGNED_URL_PATH: &str = "/api/get-presigned-url";
/// ルートの統合名
pub const PRESIGNED_URL_INTEGRATION: &str = "get-presigned-url";

/// 公開する出力キー（順序どおり）
pub const OUTPUT_KEYS: [&str; 4] = ["ApiEndpoint", "ApiUrl", "ApiId", "ApiKey"];

/// CORS の max-age（日）
const CORS_MAX_AGE_DAYS: i64 = 10;

/// 合成パスの入力
///
/// `default_auth_mode` の既定値は `ApiKey`（365 日）。開発向けの緩い既定値なので、
/// 本番では [`with_default_auth_mode`](Self::with_default_auth_mode) で差し替えること。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConstructProps {
    pub compute_integration_ref: ComputeRef,
    pub directory_ref:           Option<DirectoryRef>,
    pub client_refs:             Vec<ClientRef>,
    pub store_ref:               StoreRef,
    /// 環境名（グラフ層の名前 `API-{environment}` に使う）
    pub environment:             String,
    pub schema_asset:            SchemaAssetPath,
    pub default_auth_mode:       AuthMode,
    pub additional_auth_modes:   Vec<AuthMode>,
}

impl ApiConstructProps {
    /// 既定値付きで入力を作る
    pub fn new(
        compute_integration_ref: ComputeRef,
        directory_ref: Option<DirectoryRef>,
        client_refs: Vec<ClientRef>,
        store_ref: StoreRef,
        environment: impl Into<String>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            compute_integration_ref,
            directory_ref,
            client_refs,
            store_ref,
            environment: environment.into(),
            schema_asset: SchemaAssetPath::new(DEFAULT_SCHEMA_ASSET_PATH)?,
            default_auth_mode: AuthMode::api_key_days(DEFAULT_API_KEY_EXPIRES_DAYS)?,
            additional_auth_modes: vec![AuthMode::SignedRequest],
        })
    }

    pub fn with_schema_asset(mut self, schema_asset: SchemaAssetPath) -> Self {
        self.schema_asset = schema_asset;
        self
    }

    pub fn with_default_auth_mode(mut self, mode: AuthMode) -> Self {
        self.default_auth_mode = mode;
        self
    }

    pub fn with_additional_auth_modes(mut self, modes: Vec<AuthMode>) -> Self {
        self.additional_auth_modes = modes;
        self
    }

    /// 環境名から決まるグラフ層の名前
    pub fn graph_layer_name(&self) -> String {
        format!("API-{}", self.environment.trim())
    }
}

/// 固定の CORS ポリシー
pub fn presigned_url_cors_policy() -> Result<CorsPolicy, DomainError> {
    CorsPolicy::new(
        ["Authorization"],
        [CorsMethod::Get, CorsMethod::Options],
        ["*"],
        ["Date", "x-api-id"],
        TimeDelta::days(CORS_MAX_AGE_DAYS),
    )
}

/// 合成済みの Content Hub API
///
/// 構築後は読み取り専用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConstruct {
    id:          String,
    route_layer: RouteLayer,
    domain:      String,
    graph_layer: GraphLayer,
    data_source: DataSourceBinding,
    outputs:     OutputExporter,
}

impl ApiConstruct {
    /// 合成パスを 1 回実行する
    ///
    /// # エラー
    ///
    /// - 入力が不正（クライアント一覧が空、環境名が空、認可モードの組み合わせが不正など）:
    ///   `DomainError::Config`。この場合スコープには何も登録されない
    /// - スキーマアセットが読めない・壊れている: `DomainError::Asset`
    /// - 同じスコープで同じ `id` を二度ビルド: `DomainError::Invariant`
    ///
    /// いずれのエラーでも、スコープの登録状態は呼び出し前と変わらない。
    pub fn build(
        scope: &mut ProvisioningScope,
        id: &str,
        props: ApiConstructProps,
        source: &dyn SchemaSource,
    ) -> Result<Self, DomainError> {
        let span = tracing::info_span!("synth", construct = id, environment = %props.environment);
        let _enter = span.enter();

        let Validated {
            authorizer,
            cors_policy,
            integration,
            graph_spec,
        } = validate(&props)?;

        let store_ref = props.store_ref;
        scope.transaction(|scope| {
            scope.register(id)?;

            let route_id = ProvisioningScope::child_id(id, ROUTE_LAYER_ID);
            let mut route_layer = RouteLayer::create(scope, &route_id, cors_policy, authorizer)?;
            route_layer.add_route(PRESIGNED_URL_PATH, [HttpMethod::Get], integration)?;
            let domain = route_layer.resolve_domain()?;

            let graph_id = ProvisioningScope::child_id(id, GRAPH_LAYER_ID);
            let mut graph_layer = GraphLayer::create(scope, &graph_id, graph_spec, source)?;
            let data_source = graph_layer.bind_data_source(DATA_SOURCE_NAME, store_ref)?;

            let mut outputs = OutputExporter::new();
            outputs.export(vec![
                OutputRecord::new(OUTPUT_KEYS[0], domain.as_str()),
                OutputRecord::new(OUTPUT_KEYS[1], graph_layer.graphql_url()),
                OutputRecord::new(OUTPUT_KEYS[2], graph_layer.api_id()),
                OutputRecord::new(OUTPUT_KEYS[3], graph_layer.api_key().unwrap_or_default()),
            ])?;

            tracing::info!(%domain, graphql_url = graph_layer.graphql_url(), "合成が完了しました");

            Ok(Self {
                id: id.to_string(),
                route_layer,
                domain,
                graph_layer,
                data_source,
                outputs,
            })
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn route_layer(&self) -> &RouteLayer {
        &self.route_layer
    }

    /// ルーティング層から導出したドメイン名
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn graph_layer(&self) -> &GraphLayer {
        &self.graph_layer
    }

    pub fn data_source(&self) -> &DataSourceBinding {
        &self.data_source
    }

    pub fn outputs(&self) -> &[OutputRecord] {
        self.outputs.records()
    }

    /// 出力値をキーで引く
    pub fn output(&self, key: &str) -> Option<&str> {
        self.outputs()
            .iter()
            .find(|r| r.key() == key)
            .map(OutputRecord::value)
    }
}

/// 検証済みの入力から組み立てた部品
struct Validated {
    authorizer:  AuthorizerBinding,
    cors_policy: CorsPolicy,
    integration: RouteIntegration,
    graph_spec:  GraphLayerSpec,
}

/// スコープに触れずに入力を検証する
fn validate(props: &ApiConstructProps) -> Result<Validated, DomainError> {
    if props.environment.trim().is_empty() {
        return Err(DomainError::config(
            "ApiConstructProps",
            "environment",
            "環境名は必須です",
        ));
    }

    let authorizer = authorizer::bind(props.directory_ref.clone(), props.client_refs.clone())?;
    graph::validate_auth_modes(&props.default_auth_mode, &props.additional_auth_modes)?;
    let cors_policy = presigned_url_cors_policy()?;
    let integration = RouteIntegration::new(
        PRESIGNED_URL_INTEGRATION,
        props.compute_integration_ref.clone(),
    )?;

    Ok(Validated {
        authorizer,
        cors_policy,
        integration,
        graph_spec: GraphLayerSpec {
            name:                  props.graph_layer_name(),
            schema_asset:          props.schema_asset.clone(),
            default_auth_mode:     props.default_auth_mode,
            additional_auth_modes: props.additional_auth_modes.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use contenthub_domain::{schema::StaticSchemaSource, scope::SequentialIdAllocator};
    use pretty_assertions::assert_eq;

    use super::*;

    const SCHEMA: &str = "type File { id: ID! }\ntype Query { getFile(id: ID!): File }";

    fn test_scope() -> ProvisioningScope {
        ProvisioningScope::with_allocator("ap-northeast-1", Box::new(SequentialIdAllocator::new()))
            .unwrap()
    }

    fn props() -> ApiConstructProps {
        ApiConstructProps::new(
            ComputeRef::new("fn-presign").unwrap(),
            Some(DirectoryRef::new("pool-1").unwrap()),
            vec![ClientRef::new("client-a").unwrap()],
            StoreRef::new("FilesTable").unwrap(),
            "dev",
        )
        .unwrap()
    }

    #[test]
    fn test_既定値() {
        let props = props();

        assert_eq!(props.schema_asset.as_str(), "./lib/content-hub-repository/schema.graphql");
        assert_eq!(props.default_auth_mode, AuthMode::api_key_days(365).unwrap());
        assert_eq!(props.additional_auth_modes, vec![AuthMode::SignedRequest]);
        assert_eq!(props.graph_layer_name(), "API-dev");
    }

    #[test]
    fn test_固定のcorsポリシー() {
        let policy = presigned_url_cors_policy().unwrap();

        assert_eq!(policy.max_age(), TimeDelta::days(10));
        assert_eq!(policy.allowed_methods().len(), 2);
        assert!(policy.allowed_origins().contains("*"));
        assert!(policy.exposed_headers().contains("x-api-id"));
    }

    #[test]
    fn test_出力をキーで引ける() {
        let mut scope = test_scope();

        let construct =
            ApiConstruct::build(&mut scope, "ContentHubApi", props(), &StaticSchemaSource::new(SCHEMA))
                .unwrap();

        assert_eq!(construct.output("ApiId"), Some(construct.graph_layer().api_id()));
        assert_eq!(construct.output("Missing"), None);
    }

    #[test]
    fn test_空の環境名は構成エラーでスコープに何も登録されない() {
        let mut scope = test_scope();
        let mut props = props();
        props.environment = " ".to_string();

        let err = ApiConstruct::build(&mut scope, "ContentHubApi", props, &StaticSchemaSource::new(SCHEMA))
            .unwrap_err();

        assert!(err.is_config());
        assert!(err.to_string().contains("environment"));
        assert_eq!(scope.nodes().count(), 0);
    }
}
