//! kubeconfig-secretreader-plugin：按集群扩展配置读取 Secret 令牌的 exec 凭据插件

use std::process::ExitCode;

use clap::Parser;
use cpcreds_core::{harness, logging, CommonArgs};
use cpcreds_kubeconfig_secretreader::KubeconfigSecretReader;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(
    name = "kubeconfig-secretreader-plugin",
    version,
    about = "读取 kubeconfig 集群扩展中指定的 Secret 键作为令牌"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.common.log_level.as_deref());

    let provider = KubeconfigSecretReader::from_factory(cli.common.client_factory());
    harness::run(&provider, &cli.common.run_options()).await
}
