//! # テンプレートの描画
//!
//! 合成済みの [`ApiConstruct`] を CloudFormation 形式の JSON 文書に変換する。
//!
//! 論理 ID はドメインの識別子（`ContentHubApi/http-api` など）を PascalCase にしたもの。
//! 層の配下のリソースは層の論理 ID を接頭辞に持つ。
//! 同じ構成からは、`issued_at` が同じであれば常に同じ文書が得られる。

use chrono::{DateTime, Utc};
use contenthub_domain::{
    graph::{AuthMode, AuthModeTag, GraphLayer},
    route::{RouteDefinition, RouteLayer},
};
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::construct::ApiConstruct;

const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

/// 描画済みのテンプレート
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    format_version: &'static str,
    #[serde(rename = "Description")]
    description:    String,
    #[serde(rename = "Resources")]
    resources:      Map<String, Value>,
    #[serde(rename = "Outputs")]
    outputs:        Map<String, Value>,
}

impl Template {
    /// 構成からテンプレートを描画する
    ///
    /// `issued_at` は API キーの失効時刻の起点。
    pub fn from_construct(construct: &ApiConstruct, issued_at: DateTime<Utc>) -> Self {
        let mut resources = Map::new();
        render_route_layer(&mut resources, construct.route_layer());
        render_graph_layer(&mut resources, construct.graph_layer(), issued_at);

        let outputs = construct
            .outputs()
            .iter()
            .map(|r| (r.key().to_string(), json!({ "Value": r.value() })))
            .collect();

        Self {
            format_version: TEMPLATE_FORMAT_VERSION,
            description: format!("Content Hub API ({})", construct.id()),
            resources,
            outputs,
        }
    }

    pub fn resources(&self) -> &Map<String, Value> {
        &self.resources
    }

    /// 論理 ID でリソースを引く
    pub fn resource(&self, logical_id: &str) -> Option<&Value> {
        self.resources.get(logical_id)
    }

    /// 指定した種別のリソース数
    pub fn count_of(&self, resource_type: &str) -> usize {
        self.resources
            .values()
            .filter(|r| r.get("Type").and_then(Value::as_str) == Some(resource_type))
            .count()
    }

    pub fn outputs(&self) -> &Map<String, Value> {
        &self.outputs
    }
}

/// `http-api` → `HttpApi`
pub fn logical_id(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|part| part.split(|c: char| !c.is_ascii_alphanumeric()))
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

fn render_route_layer(resources: &mut Map<String, Value>, layer: &RouteLayer) {
    let api = logical_id(&[layer.logical_id()]);
    let authorizer = layer.default_authorizer();
    let authorizer_id = format!("{api}{}", logical_id(&[authorizer.id()]));
    let cors = layer.cors_policy();

    resources.insert(
        api.clone(),
        json!({
            "Type": "AWS::ApiGatewayV2::Api",
            "Properties": {
                "Name": layer.logical_id(),
                "ProtocolType": "HTTP",
                "CorsConfiguration": {
                    "AllowHeaders": cors.allowed_headers(),
                    "AllowMethods": cors.allowed_methods(),
                    "AllowOrigins": cors.allowed_origins(),
                    "ExposeHeaders": cors.exposed_headers(),
                    "MaxAge": cors.max_age().num_seconds(),
                },
            },
        }),
    );

    if layer.create_default_stage() {
        resources.insert(
            format!("{api}DefaultStage"),
            json!({
                "Type": "AWS::ApiGatewayV2::Stage",
                "Properties": {
                    "ApiId": { "Ref": api },
                    "StageName": "$default",
                    "AutoDeploy": true,
                },
            }),
        );
    }

    resources.insert(
        authorizer_id.clone(),
        json!({
            "Type": "AWS::ApiGatewayV2::Authorizer",
            "Properties": {
                "ApiId": { "Ref": api },
                "Name": authorizer.id(),
                "AuthorizerType": "JWT",
                "IdentitySource": ["$request.header.Authorization"],
                "JwtConfiguration": {
                    "Audience": authorizer.client_refs(),
                    "Issuer": authorizer.directory_ref(),
                },
            },
        }),
    );

    for route in layer.routes() {
        render_route(resources, &api, &authorizer_id, route);
    }
}

fn render_route(
    resources: &mut Map<String, Value>,
    api: &str,
    authorizer_id: &str,
    route: &RouteDefinition,
) {
    let integration = route.integration();
    let integration_id = format!("{api}{}Integration", logical_id(&[integration.name()]));

    resources.insert(
        integration_id.clone(),
        json!({
            "Type": "AWS::ApiGatewayV2::Integration",
            "Properties": {
                "ApiId": { "Ref": api },
                "IntegrationType": "AWS_PROXY",
                "IntegrationUri": integration.target(),
                "PayloadFormatVersion": "2.0",
            },
        }),
    );

    for method in route.methods() {
        let method_name: &'static str = method.into();
        let method_word = method_name.to_ascii_lowercase();
        let route_id = format!(
            "{api}{}Route",
            logical_id(&[route.path(), method_word.as_str()]),
        );
        resources.insert(
            route_id,
            json!({
                "Type": "AWS::ApiGatewayV2::Route",
                "Properties": {
                    "ApiId": { "Ref": api },
                    "RouteKey": format!("{method_name} {}", route.path()),
                    "AuthorizationType": "JWT",
                    "AuthorizerId": { "Ref": authorizer_id },
                    "Target": { "Fn::Join": ["", ["integrations/", { "Ref": integration_id }]] },
                },
            }),
        );
    }
}

fn authentication_type(tag: AuthModeTag) -> &'static str {
    match tag {
        AuthModeTag::ApiKey => "API_KEY",
        AuthModeTag::SignedRequest => "AWS_IAM",
    }
}

fn render_graph_layer(
    resources: &mut Map<String, Value>,
    layer: &GraphLayer,
    issued_at: DateTime<Utc>,
) {
    let api = logical_id(&[layer.logical_id()]);
    let api_id = json!({ "Fn::GetAtt": [api, "ApiId"] });

    let additional: Vec<Value> = layer
        .additional_auth_modes()
        .iter()
        .map(|mode| json!({ "AuthenticationType": authentication_type(mode.tag()) }))
        .collect();

    resources.insert(
        api.clone(),
        json!({
            "Type": "AWS::AppSync::GraphQLApi",
            "Properties": {
                "Name": layer.name(),
                "AuthenticationType": authentication_type(layer.default_auth_mode().tag()),
                "AdditionalAuthenticationProviders": additional,
            },
        }),
    );

    resources.insert(
        format!("{api}Schema"),
        json!({
            "Type": "AWS::AppSync::GraphQLSchema",
            "Properties": {
                "ApiId": api_id,
                "Definition": layer.schema().text(),
            },
        }),
    );

    let api_key_expiry = std::iter::once(layer.default_auth_mode())
        .chain(layer.additional_auth_modes())
        .find_map(|mode| match mode {
            AuthMode::ApiKey { expires_after } => Some(*expires_after),
            AuthMode::SignedRequest => None,
        });
    if let (Some(expires_after), Some(_)) = (api_key_expiry, layer.api_key()) {
        resources.insert(
            format!("{api}DefaultApiKey"),
            json!({
                "Type": "AWS::AppSync::ApiKey",
                "Properties": {
                    "ApiId": api_id,
                    "Expires": issued_at
                        .checked_add_signed(expires_after)
                        .map(|expires| expires.timestamp()),
                },
            }),
        );
    }

    for data_source in layer.data_sources() {
        resources.insert(
            format!("{api}{}DataSource", logical_id(&[data_source.name()])),
            json!({
                "Type": "AWS::AppSync::DataSource",
                "Properties": {
                    "ApiId": api_id,
                    "Name": data_source.name().replace('-', "_"),
                    "Type": "AMAZON_DYNAMODB",
                    "DynamoDBConfig": {
                        "TableName": data_source.store_ref(),
                        "AwsRegion": { "Ref": "AWS::Region" },
                    },
                    "Metadata": { "BoundTypes": data_source.bound_types() },
                },
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&["http-api"], "HttpApi")]
    #[case(&["ContentHubApi/http-api"], "ContentHubApiHttpApi")]
    #[case(&["userpool-auth"], "UserpoolAuth")]
    #[case(&["/api/get-presigned-url", "get"], "ApiGetPresignedUrlGet")]
    #[case(&["files-table"], "FilesTable")]
    fn test_論理idはpascal_caseになる(#[case] parts: &[&str], #[case] expected: &str) {
        assert_eq!(logical_id(parts), expected);
    }
}
