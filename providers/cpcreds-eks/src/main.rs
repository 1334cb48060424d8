//! eks-aws-auth-plugin：为 EKS 集群签发 IAM 令牌的 exec 凭据插件

use std::process::ExitCode;

use clap::Parser;
use cpcreds_core::{harness, logging, CommonArgs};
use cpcreds_eks::EksProvider;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "eks-aws-auth-plugin", version, about = "按集群端点查找 EKS 集群并签发 IAM 令牌")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.common.log_level.as_deref());

    let provider = EksProvider::from_default_chain();
    harness::run(&provider, &cli.common.run_options()).await
}
