// 该文件是 Shiliang （食量） 项目的一部分。
// src/bin/simple_oneshot.rs - 单场景估算
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use url::Url;

use shiliang::{
  FromUrl,
  config::EstimatorConfig,
  input::InputWrapper,
  model::FoodEstimator,
  output::OutputWrapper,
  task::{OneShotTask, Task},
};
use tracing::info;

/// Shiliang 单场景估算参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入场景，如 scene:///data/makan.json
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出方式，如 log:// 或 json:///tmp/report.json
  #[arg(long, value_name = "OUTPUT", default_value = "log://")]
  pub output: Url,
  /// JSON 配置文件，缺省使用内置表
  #[arg(long, value_name = "CONFIG")]
  pub config: Option<PathBuf>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let config = match &args.config {
    Some(path) => EstimatorConfig::from_file(path)?,
    None => EstimatorConfig::default(),
  };
  let input = InputWrapper::from_url(&args.input)?;
  let model = FoodEstimator::new(config);
  let output = OutputWrapper::from_url(&args.output)?;

  OneShotTask.run_task(input, model, output)?;

  Ok(())
}
