// 该文件是 Shiliang （食量） 项目的一部分。
// src/model.rs - 估算模型
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

use std::convert::Infallible;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
  calibration::{CalibrationRatios, ScaleCalibrator},
  config::EstimatorConfig,
  geometry::GeometryExtractor,
  nutrition::{Estimate, NutritionEstimator},
  scene::Scene,
  volume::VolumeEstimator,
};

pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, Clone, Serialize)]
pub struct EstimateResult {
  pub items: Box<[Estimate]>,
  #[serde(flatten)]
  pub calibration: CalibrationRatios,
}

impl EstimateResult {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn total_calories(&self) -> f64 {
    self.items.iter().map(|item| item.calories).sum()
  }
}

/// 几何提取 → 标定 → 体积 → 营养 的完整流水线
#[derive(Debug, Clone, Default)]
pub struct FoodEstimator {
  config: EstimatorConfig,
  geometry: GeometryExtractor,
  volume: VolumeEstimator,
}

impl FoodEstimator {
  pub fn new(config: EstimatorConfig) -> Self {
    Self {
      config,
      geometry: GeometryExtractor::new(),
      volume: VolumeEstimator::new(),
    }
  }
}

impl Model for FoodEstimator {
  type Input = Scene;
  type Output = EstimateResult;
  type Error = Infallible;

  fn infer(&self, scene: &Self::Input) -> Result<Self::Output, Self::Error> {
    let min_score = self.config.min_score();
    let objects = scene.objects.iter().filter(|object| {
      let keep = object.score >= min_score;
      if !keep {
        debug!("丢弃低置信度目标 {} ({:.2})", object.label, object.score);
      }
      keep
    });

    let descriptors = self.geometry.extract(objects, scene.resolution);
    let calibration = ScaleCalibrator::new(self.config.reference()).calibrate(&descriptors);

    let volumes: Vec<_> = descriptors
      .into_iter()
      .map(|descriptor| {
        let volume = self.volume.estimate(&descriptor, calibration.pixel_to_cm);
        (descriptor, volume)
      })
      .collect();

    let items = NutritionEstimator::new(&self.config).estimate(&volumes, &calibration);
    info!(
      "场景 {} 估算完成: {} 个食物",
      scene.name.as_deref().unwrap_or("-"),
      items.len()
    );

    Ok(EstimateResult {
      items: items.into_boxed_slice(),
      calibration,
    })
  }
}
