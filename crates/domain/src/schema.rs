//! # グラフ層スキーマ
//!
//! スキーマ定義言語（SDL）ファイルの構造的な健全性だけを検証する。
//! 型の意味解析やリゾルバの整合性はこのモジュールの責務外。
//!
//! ## 検証内容
//!
//! - コメントを除いて空でない
//! - 文字列リテラルが閉じている
//! - `{` と `}` の対応が取れている
//! - トップレベルの定義（`type` / `input` / `interface` / `enum` / `union` /
//!   `scalar` / `schema`）が 1 つ以上ある
//!
//! 違反はすべて `DomainError::Asset` としてパスとともに報告する。

use serde::Serialize;

use crate::{DomainError, refs::SchemaAssetPath};

/// スキーマアセットを解決するトレイト
///
/// 実ファイルからの読み込みはインフラ層が実装する。読み込めない場合は
/// `DomainError::Asset` を返すこと（ローカルでのリトライはしない）。
pub trait SchemaSource {
    fn load(&self, path: &SchemaAssetPath) -> Result<String, DomainError>;
}

/// メモリ上の SDL テキストを返す実装
///
/// パスに関係なく同じテキストを返す。
pub struct StaticSchemaSource {
    text: String,
}

impl StaticSchemaSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl SchemaSource for StaticSchemaSource {
    fn load(&self, _path: &SchemaAssetPath) -> Result<String, DomainError> {
        Ok(self.text.clone())
    }
}

/// ルート操作型（データソースのバインド対象から除外する）
const ROOT_OPERATION_TYPES: [&str; 3] = ["Query", "Mutation", "Subscription"];

/// トップレベル定義のキーワード
const DEFINITION_KEYWORDS: [&str; 7] = [
    "type",
    "input",
    "interface",
    "enum",
    "union",
    "scalar",
    "schema",
];

/// 検証済みのスキーマ
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphSchema {
    definition_count: usize,
    object_types:     Vec<String>,
    #[serde(skip)]
    text:             String,
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Ident(&'a str),
    Open,
    Close,
}

impl GraphSchema {
    /// SDL テキストを検証する
    ///
    /// `path` はエラーメッセージ用。
    pub fn parse(path: &SchemaAssetPath, text: &str) -> Result<Self, DomainError> {
        let tokens = tokenize(text).map_err(|msg| DomainError::asset(path.as_str(), msg))?;

        if tokens.is_empty() {
            return Err(DomainError::asset(path.as_str(), "スキーマが空です"));
        }

        let mut depth: usize = 0;
        let mut definition_count = 0;
        let mut object_types = Vec::new();
        let mut iter = tokens.iter().peekable();

        while let Some(token) = iter.next() {
            match token {
                Token::Open => depth += 1,
                Token::Close => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        DomainError::asset(path.as_str(), "対応する '{' の無い '}' があります")
                    })?;
                }
                Token::Ident(word) if depth == 0 && DEFINITION_KEYWORDS.contains(word) => {
                    definition_count += 1;
                    if *word == "type" {
                        let Some(Token::Ident(name)) = iter.peek() else {
                            return Err(DomainError::asset(
                                path.as_str(),
                                "type の後に型名がありません",
                            ));
                        };
                        object_types.push((*name).to_string());
                        iter.next();
                    }
                }
                Token::Ident(_) => {}
            }
        }

        if depth != 0 {
            return Err(DomainError::asset(
                path.as_str(),
                format!("'{{' が {depth} 個閉じられていません"),
            ));
        }

        if definition_count == 0 {
            return Err(DomainError::asset(
                path.as_str(),
                "トップレベルの型定義がありません",
            ));
        }

        Ok(Self {
            definition_count,
            object_types,
            text: text.to_string(),
        })
    }

    /// トップレベル定義の数
    pub fn definition_count(&self) -> usize {
        self.definition_count
    }

    /// 宣言されたオブジェクト型名（宣言順）
    pub fn object_types(&self) -> &[String] {
        &self.object_types
    }

    /// データソースにバインドする型名（ルート操作型を除く）
    pub fn bindable_types(&self) -> Vec<String> {
        self.object_types
            .iter()
            .filter(|t| !ROOT_OPERATION_TYPES.contains(&t.as_str()))
            .cloned()
            .collect()
    }

    /// 元の SDL テキスト
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// コメントと文字列リテラルを読み飛ばし、識別子と波括弧だけを取り出す
fn tokenize(text: &str) -> Result<Vec<Token<'_>>, String> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'"' if text[i..].starts_with("\"\"\"") => {
                let Some(end) = text[i + 3..].find("\"\"\"") else {
                    return Err("ブロック文字列が閉じられていません".to_string());
                };
                i += 3 + end + 3;
            }
            b'"' => {
                i += 1;
                loop {
                    match bytes.get(i) {
                        None | Some(b'\n') => {
                            return Err("文字列リテラルが閉じられていません".to_string());
                        }
                        Some(b'\\') => i += 2,
                        Some(b'"') => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
            }
            b'{' => {
                tokens.push(Token::Open);
                i += 1;
            }
            b'}' => {
                tokens.push(Token::Close);
                i += 1;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                let start = i;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                tokens.push(Token::Ident(&text[start..i]));
            }
            _ => i += 1,
        }
    }

    Ok(tokens)
}
