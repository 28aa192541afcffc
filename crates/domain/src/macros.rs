/// 不透明な外部リソース参照（String Newtype）を定義する宣言型マクロ
///
/// 以下のボイラープレートを一括生成する:
/// - Newtype 構造体（`String` をラップ）
/// - `new()`: trim + 空チェック + 最大長チェック（違反は `DomainError::Config`）
/// - `as_str()`: 文字列参照
/// - `into_string()`: 所有権を持つ文字列に変換
/// - `Display` impl
///
/// 参照先の実体（関数、ユーザーディレクトリ、テーブルなど）はこのモジュールの
/// 責務外であり、ここでは「空でない識別子」であることだけを保証する。
///
/// # 引数
///
/// - `entity` / `field`: エラーメッセージに使うエンティティ名とフィールド名
/// - `max_length`: 最大文字数（`chars().count()` でカウント）
///
/// # 使用例
///
/// ```rust
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use contenthub_domain::refs::StoreRef;
///
/// let table = StoreRef::new("  files-table  ")?;
/// assert_eq!(table.as_str(), "files-table");
/// assert!(StoreRef::new("   ").is_err());
/// # Ok(())
/// # }
/// ```
macro_rules! define_resource_ref {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident {
            entity: $entity:expr,
            field: $field:expr,
            max_length: $max_length:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl $Name {
            pub fn new(value: impl Into<String>) -> Result<Self, $crate::DomainError> {
                let value = value.into().trim().to_string();

                if value.is_empty() {
                    return Err($crate::DomainError::config(
                        $entity,
                        $field,
                        "値は必須です",
                    ));
                }

                if value.chars().count() > $max_length {
                    return Err($crate::DomainError::config(
                        $entity,
                        $field,
                        format!("{} 文字以内である必要があります", $max_length),
                    ));
                }

                Ok(Self(value))
            }

            /// 文字列参照を取得する
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// 所有権を持つ文字列に変換する
            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}
