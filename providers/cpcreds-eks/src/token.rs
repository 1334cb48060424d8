//! IAM 令牌签发模块
//!
//! EKS 令牌是一个预签名的 STS `GetCallerIdentity` 请求 URL：签名中包含
//! `x-k8s-aws-id` 头（集群名称），整个 URL 以 base64url 编码并加上
//! `k8s-aws-v1.` 前缀。

use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::Credentials;
use aws_sigv4::http_request::{
    sign, SignableBody, SignableRequest, SignatureLocation, SigningSettings,
};
use aws_sigv4::sign::v4;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use cpcreds_core::{guarded, CancellationToken};
use tracing::debug;
use url::Url;

use cpcreds_common::{Error, Result};

use crate::load_sdk_config;

/// 令牌前缀
const TOKEN_PREFIX: &str = "k8s-aws-v1.";

/// 携带集群名称的签名头
const CLUSTER_ID_HEADER: &str = "x-k8s-aws-id";

/// 预签名 URL 的有效期
const PRESIGN_EXPIRES: Duration = Duration::from_secs(60);

/// 令牌对外报告的有效期（分钟），比服务端接受窗口（15 分钟）短一分钟
const TOKEN_LIFETIME_MINUTES: i64 = 14;

/// 签发的令牌
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MintedToken {
    /// 令牌
    pub token: String,
    /// 过期时间
    pub expires_at: DateTime<Utc>,
}

/// IAM 令牌签发器
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenGenerator: Send + Sync {
    /// 为指定区域与集群签发令牌
    async fn generate(
        &self,
        ctx: &CancellationToken,
        region: &str,
        cluster_id: &str,
    ) -> Result<MintedToken>;
}

/// 基于 STS 预签名的令牌签发器，凭据来自 AWS 默认凭据链
#[derive(Debug, Clone, Default)]
pub struct StsTokenGenerator;

#[async_trait]
impl TokenGenerator for StsTokenGenerator {
    async fn generate(
        &self,
        ctx: &CancellationToken,
        region: &str,
        cluster_id: &str,
    ) -> Result<MintedToken> {
        let config = guarded(ctx, "加载 AWS 配置", async { Ok(load_sdk_config(region).await) }).await?;
        let provider = config
            .credentials_provider()
            .ok_or_else(|| Error::upstream("获取 AWS 凭据", "未配置凭据提供方"))?;

        let credentials = guarded(ctx, "获取 AWS 凭据", async {
            provider
                .provide_credentials()
                .await
                .map_err(|e| Error::upstream("获取 AWS 凭据", e))
        })
        .await?;

        let token = mint_token(&credentials, region, cluster_id, SystemTime::now())?;
        debug!("已为集群 {} 签发令牌，过期时间 {}", cluster_id, token.expires_at);
        Ok(token)
    }
}

/// 用给定凭据签发令牌
pub fn mint_token(
    credentials: &Credentials,
    region: &str,
    cluster_id: &str,
    now: SystemTime,
) -> Result<MintedToken> {
    let url = presign_get_caller_identity(credentials, region, cluster_id, now)?;
    Ok(MintedToken {
        token: format!("{}{}", TOKEN_PREFIX, URL_SAFE_NO_PAD.encode(url)),
        expires_at: DateTime::<Utc>::from(now) + chrono::Duration::minutes(TOKEN_LIFETIME_MINUTES),
    })
}

/// 生成预签名的 `GetCallerIdentity` URL
pub fn presign_get_caller_identity(
    credentials: &Credentials,
    region: &str,
    cluster_id: &str,
    now: SystemTime,
) -> Result<String> {
    let operation = "预签名 STS GetCallerIdentity";
    let base = format!(
        "{}/?Action=GetCallerIdentity&Version=2011-06-15",
        sts_endpoint(region)
    );

    let identity = credentials.clone().into();
    let mut settings = SigningSettings::default();
    settings.signature_location = SignatureLocation::QueryParams;
    settings.expires_in = Some(PRESIGN_EXPIRES);

    let params = v4::SigningParams::builder()
        .identity(&identity)
        .region(region)
        .name("sts")
        .time(now)
        .settings(settings)
        .build()
        .map_err(|e| Error::upstream(operation, e))?
        .into();

    let headers = [(CLUSTER_ID_HEADER, cluster_id)];
    let signable = SignableRequest::new(
        "GET",
        base.as_str(),
        headers.into_iter(),
        SignableBody::Bytes(&[]),
    )
    .map_err(|e| Error::upstream(operation, e))?;

    let (instructions, _signature) = sign(signable, &params)
        .map_err(|e| Error::upstream(operation, e))?
        .into_parts();
    let (_headers, query) = instructions.into_parts();

    let mut url = Url::parse(&base).map_err(|e| Error::upstream(operation, e))?;
    {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &query {
            pairs.append_pair(name, value);
        }
    }
    Ok(url.to_string())
}

/// 区域 STS 端点
fn sts_endpoint(region: &str) -> String {
    if region.starts_with("cn-") {
        format!("https://sts.{}.amazonaws.com.cn", region)
    } else {
        format!("https://sts.{}.amazonaws.com", region)
    }
}
