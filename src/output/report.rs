// 该文件是 Shiliang （食量） 项目的一部分。
// src/output/report.rs - 估算报告
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

use serde::Serialize;

use crate::{
  model::EstimateResult,
  scene::{Resolution, Scene},
};

/// 单个场景的输出报告
#[derive(Debug, Serialize)]
pub struct Report<'a> {
  pub scene: Option<&'a str>,
  pub resolution: Resolution,
  pub detections: usize,
  #[serde(flatten)]
  pub result: &'a EstimateResult,
  pub total_calories: f64,
}

impl<'a> Report<'a> {
  pub fn new(scene: &'a Scene, result: &'a EstimateResult) -> Self {
    Self {
      scene: scene.name.as_deref(),
      resolution: scene.resolution,
      detections: scene.len(),
      result,
      total_calories: result.total_calories(),
    }
  }

  pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
      serde_json::to_string_pretty(self)
    } else {
      serde_json::to_string(self)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{calibration::CalibrationRatios, nutrition::Estimate};

  #[test]
  fn report_flattens_items_and_calibration() {
    let scene = Scene::new(Resolution::new(640, 480).unwrap(), Vec::new()).with_name("makan-siang");
    let result = EstimateResult {
      items: vec![Estimate {
        name: "nasi".to_string(),
        volume_cm3: 200.0,
        mass_grams: 160.0,
        calories: 208.0,
      }]
      .into_boxed_slice(),
      calibration: CalibrationRatios::UNIT,
    };

    let value: serde_json::Value =
      serde_json::from_str(&Report::new(&scene, &result).to_json(false).unwrap()).unwrap();
    assert_eq!(value["scene"], "makan-siang");
    assert_eq!(value["resolution"]["width"], 640);
    assert_eq!(value["items"][0]["name"], "nasi");
    assert_eq!(value["items"][0]["calories"], 208.0);
    assert_eq!(value["pixel_to_cm"], 1.0);
    assert_eq!(value["reference_found"], false);
    assert_eq!(value["total_calories"], 208.0);
  }
}
