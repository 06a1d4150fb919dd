// 该文件是 Shiliang （食量） 项目的一部分。
// src/task.rs - 估算任务
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

use tracing::{info, warn};

use crate::{model::Model, output::Render};

pub trait Task<I, M, O>: Sized {
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<usize, Self::Error>;
}

/// 只处理第一个场景
pub struct OneShotTask;

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<usize, Self::Error> {
    info!("开始任务...");
    let scene = input.next().ok_or_else(|| anyhow::anyhow!("没有输入场景"))?;
    info!("输入场景获取成功，开始估算...");
    let now = std::time::Instant::now();
    let result = model.infer(&scene)?;
    info!("估算完成，耗时: {:.2?}", now.elapsed());
    output.render_result(&scene, &result)?;
    info!("输出完成，耗时: {:.2?}", now.elapsed());

    Ok(1)
  }
}

/// 依次处理全部场景，可限制最大场景数
#[derive(Default, Debug)]
pub struct BatchTask {
  scene_number: Option<usize>,
}

impl BatchTask {
  pub fn with_scene_number(mut self, scene_number: Option<usize>) -> Self {
    self.scene_number = scene_number;
    self
  }
}

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for BatchTask
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, model: M, output: O) -> Result<usize, Self::Error> {
    info!("开始批量任务...");
    let mut scene_index = 0;
    for scene in input {
      if self.scene_number.is_some_and(|n| scene_index >= n) {
        info!("达到指定场景数 {}, 退出任务循环", scene_index);
        break;
      }
      scene_index += 1;
      info!("处理第 {} 个场景", scene_index);
      let now = std::time::Instant::now();
      let result = model.infer(&scene)?;
      output.render_result(&scene, &result)?;
      info!("处理完成，耗时: {:.2?}", now.elapsed());
    }

    if scene_index == 0 {
      warn!("没有可处理的场景");
    }
    info!("任务完成，共处理 {} 个场景", scene_index);
    Ok(scene_index)
  }
}
