//! ファイルシステム入出力の統合テスト
//!
//! 一時ディレクトリ配下で実際にファイルを読み書きする。
//!
//! 実行方法:
//! ```bash
//! cargo test -p contenthub-infra --test filesystem_test
//! ```

use std::path::PathBuf;

use contenthub_domain::{refs::SchemaAssetPath, schema::SchemaSource};
use contenthub_infra::{FsSchemaSource, error::InfraErrorKind, template};
use pretty_assertions::assert_eq;

/// テストごとに分離された一時ディレクトリ
fn temp_dir(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("contenthub_{prefix}_{}", uuid::Uuid::now_v7()))
}

#[test]
fn test_fs_schema_sourceがベースディレクトリ配下のファイルを読み込む() {
    let base = temp_dir("schema");
    let asset_dir = base.join("lib/content-hub-repository");
    std::fs::create_dir_all(&asset_dir).unwrap();
    std::fs::write(asset_dir.join("schema.graphql"), "type File { id: ID! }").unwrap();

    let source = FsSchemaSource::new(&base);
    let path = SchemaAssetPath::new("./lib/content-hub-repository/schema.graphql").unwrap();

    let text = source.load(&path).unwrap();

    assert_eq!(text, "type File { id: ID! }");
    std::fs::remove_dir_all(&base).unwrap();
}

#[test]
fn test_存在しないスキーマはアセットエラー() {
    let source = FsSchemaSource::new(temp_dir("missing"));
    let path = SchemaAssetPath::new("./schema.graphql").unwrap();

    let err = source.load(&path).unwrap_err();

    assert!(err.is_asset(), "{err}");
    assert!(err.to_string().contains("./schema.graphql"));
}

#[test]
fn test_write_templateがディレクトリを作成して整形済みjsonを書き出す() {
    let dir = temp_dir("template").join("cdk.out");
    let value = serde_json::json!({
        "Resources": {},
        "Outputs": { "ApiId": { "Value": "abc" } },
    });

    let path = template::write_template(&dir, "ContentHubApi", &value).unwrap();

    assert_eq!(path, dir.join("ContentHubApi.template.json"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.ends_with('\n'));
    assert!(written.contains("\n  \"Outputs\""), "{written}");
    let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed, value);

    std::fs::remove_dir_all(dir.parent().unwrap()).unwrap();
}

#[test]
fn test_write_templateは既存ファイルを上書きする() {
    let dir = temp_dir("overwrite");

    template::write_template(&dir, "Stack", &serde_json::json!({"v": 1})).unwrap();
    let path = template::write_template(&dir, "Stack", &serde_json::json!({"v": 2})).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed, serde_json::json!({"v": 2}));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_出力先がファイルなら入出力エラー() {
    let file = temp_dir("not_a_dir");
    std::fs::write(&file, "occupied").unwrap();

    let err = template::write_template(&file, "Stack", &serde_json::json!({})).unwrap_err();

    assert!(matches!(err.kind(), InfraErrorKind::Io(_)), "{err:?}");
    std::fs::remove_file(&file).unwrap();
}
