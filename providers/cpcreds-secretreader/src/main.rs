//! secretreader-plugin：从 Secret 读取令牌的 exec 凭据插件

use std::process::ExitCode;

use clap::Parser;
use cpcreds_core::{harness, logging, CommonArgs};
use cpcreds_secretreader::{SecretReaderProvider, DEFAULT_TOKEN_KEY, PROVIDER_NAME};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "secretreader-plugin", version, about = "从 ClusterProfile 对应的 Secret 读取集群令牌")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// ClusterProfile 与 Secret 所在命名空间
    #[arg(long, env = "CLUSTERPROFILE_NAMESPACE", default_value = "default")]
    namespace: String,

    /// ClusterProfile 中凭据提供方条目的名称
    #[arg(long, default_value = PROVIDER_NAME)]
    provider_name: String,

    /// 令牌所在的 Secret 键
    #[arg(long, default_value = DEFAULT_TOKEN_KEY)]
    token_key: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.common.log_level.as_deref());

    let provider = SecretReaderProvider::from_factory(cli.common.client_factory(), cli.namespace)
        .with_provider_name(cli.provider_name)
        .with_token_key(cli.token_key);

    harness::run(&provider, &cli.common.run_options()).await
}
