//! # 外部リソース参照
//!
//! このモジュールが配線するだけで中身には関知しない外部コラボレーターへの参照。
//!
//! | 型 | 参照先 |
//! |---|-------|
//! | [`ComputeRef`] | ルートの裏にあるコンピュートハンドラ |
//! | [`DirectoryRef`] | ベアラートークン認可に使うユーザーディレクトリ |
//! | [`ClientRef`] | ユーザーディレクトリに登録されたクライアント |
//! | [`StoreRef`] | グラフ層にバインドするキーバリューテーブル |
//! | [`SchemaAssetPath`] | グラフ層のスキーマ定義ファイル（ローカルパス） |

define_resource_ref! {
    /// コンピュートハンドラへの参照
    pub struct ComputeRef {
        entity: "ApiConstructProps",
        field: "compute_integration_ref",
        max_length: 2048,
    }
}

define_resource_ref! {
    /// ユーザーディレクトリへの参照
    pub struct DirectoryRef {
        entity: "AuthorizerBinding",
        field: "directory_ref",
        max_length: 2048,
    }
}

define_resource_ref! {
    /// ユーザーディレクトリに登録されたクライアント ID
    pub struct ClientRef {
        entity: "AuthorizerBinding",
        field: "client_refs",
        max_length: 2048,
    }
}

define_resource_ref! {
    /// バックエンドのキーバリューテーブルへの参照
    pub struct StoreRef {
        entity: "DataSourceBinding",
        field: "store_ref",
        max_length: 2048,
    }
}

define_resource_ref! {
    /// スキーマ定義ファイルのパス
    ///
    /// 解決（読み込み）は [`SchemaSource`](crate::schema::SchemaSource) の責務。
    pub struct SchemaAssetPath {
        entity: "GraphLayer",
        field: "schema_asset",
        max_length: 4096,
    }
}
