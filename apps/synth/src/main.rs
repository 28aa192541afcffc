//! # Content Hub API 合成コマンド
//!
//! 環境変数から入力を読み込み、合成パスを 1 回実行してテンプレートを書き出す。
//! 出力レコードは `キー=値` の形式で標準出力に表示する。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `CONTENT_HUB_ENVIRONMENT` | **Yes** | 環境名（グラフ層の名前に使う） |
//! | `COMPUTE_INTEGRATION_REF` | **Yes** | コンピュートハンドラの参照 |
//! | `USER_DIRECTORY_REF` | **Yes** | ユーザーディレクトリの参照 |
//! | `USER_DIRECTORY_CLIENT_REFS` | **Yes** | クライアントの参照（カンマ区切り） |
//! | `STORE_REF` | **Yes** | テーブルの参照 |
//! | `SCHEMA_ASSET_PATH` | No | スキーマのパス（デフォルト: `./lib/content-hub-repository/schema.graphql`） |
//! | `GRAPH_DEFAULT_AUTH` | No | `api_key`（デフォルト）または `iam` |
//! | `GRAPH_API_KEY_EXPIRES_DAYS` | No | API キーの有効日数（デフォルト: 365） |
//! | `AWS_REGION` | No | リージョン（デフォルト: `ap-northeast-1`） |
//! | `SYNTH_OUTPUT_DIR` | No | 出力先（デフォルト: `cdk.out`） |
//! | `STACK_NAME` | No | スタック名（デフォルト: `ContentHubApi`） |
//!
//! ## 実行方法
//!
//! ```bash
//! cargo run -p contenthub-synth
//! ```

use contenthub_domain::scope::ProvisioningScope;
use contenthub_infra::{FsSchemaSource, template::write_template};
use contenthub_shared::observability::{TracingConfig, init_tracing};
use contenthub_synth::{ApiConstruct, Template, config::SynthConfig};

fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(&TracingConfig::from_env("contenthub-synth"))?;
    let _tracing_guard = tracing::info_span!("app", command = "contenthub-synth").entered();

    let config = SynthConfig::from_env()?;
    tracing::info!(
        environment = %config.environment,
        region = %config.region,
        stack = %config.stack_name,
        "合成を開始します"
    );

    let props = config.to_props()?;
    let source = FsSchemaSource::new(std::env::current_dir()?);
    let mut scope = ProvisioningScope::new(&config.region)?;

    let construct = ApiConstruct::build(&mut scope, &config.stack_name, props, &source)?;
    let template = Template::from_construct(&construct, chrono::Utc::now());
    let path = write_template(&config.output_dir, &config.stack_name, &template)?;

    tracing::info!(path = %path.display(), resources = template.resources().len(), "テンプレートを書き出しました");

    for record in construct.outputs() {
        println!("{}={}", record.key(), record.value());
    }

    Ok(())
}
