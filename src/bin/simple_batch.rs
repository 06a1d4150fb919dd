// 该文件是 Shiliang （食量） 项目的一部分。
// src/bin/simple_batch.rs - 批量场景估算
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
  task::{BatchTask, Task},
};
use tracing::info;

/// Shiliang 批量估算参数
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源，如 folder:///data/scenes
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出方式，如 folder:///data/records?always
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// JSON 配置文件，缺省使用内置表
  #[arg(long, value_name = "CONFIG")]
  pub config: Option<PathBuf>,
  /// 最大处理场景数
  #[arg(long, value_name = "SCENE_NUMBER")]
  pub scene_number: Option<usize>,
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

  let processed = BatchTask::default()
    .with_scene_number(args.scene_number)
    .run_task(input, model, output)?;
  info!("共处理 {} 个场景", processed);

  Ok(())
}
