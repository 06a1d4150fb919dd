// 该文件是 Shiliang （食量） 项目的一部分。
// src/output/log_report.rs - 日志报告输出
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

use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme, model::EstimateResult, output::Render, scene::Scene,
};

#[derive(Error, Debug)]
pub enum LogReportError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 通过 tracing 输出估算结果
pub struct LogReportOutput;

impl FromUrlWithScheme for LogReportOutput {
  const SCHEME: &'static str = "log";
}

impl FromUrl for LogReportOutput {
  type Error = LogReportError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      return Err(LogReportError::SchemeMismatch(url.scheme().to_string()));
    }
    Ok(LogReportOutput)
  }
}

impl Render<Scene, EstimateResult> for LogReportOutput {
  type Error = LogReportError;

  fn render_result(&self, scene: &Scene, result: &EstimateResult) -> Result<(), Self::Error> {
    let calibration = &result.calibration;
    info!(
      "场景 {} ({}x{}): 检测到 {} 个对象",
      scene.name.as_deref().unwrap_or("-"),
      scene.resolution.width,
      scene.resolution.height,
      scene.len()
    );
    if !calibration.reference_found {
      warn!("未找到参照物，结果未经尺度标定");
    }
    info!(
      "像素厘米比 {:.4}, 体积质量比 {:.4}",
      calibration.pixel_to_cm, calibration.volume_to_mass
    );
    for item in result.items.iter() {
      info!(
        "  - {}: 体积 {:.2} cm³, 质量 {:.2} g, 热量 {:.1} kcal",
        item.name, item.volume_cm3, item.mass_grams, item.calories
      );
    }
    info!("总热量: {:.1} kcal", result.total_calories());
    Ok(())
  }
}
