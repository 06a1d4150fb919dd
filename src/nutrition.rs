// 该文件是 Shiliang （食量） 项目的一部分。
// src/nutrition.rs - 质量与热量估算
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
use tracing::debug;

use crate::{calibration::CalibrationRatios, config::EstimatorConfig, geometry::ShapeDescriptor};

/// 单个食物的估算结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
  pub name: String,
  pub volume_cm3: f64,
  pub mass_grams: f64,
  pub calories: f64,
}

fn finite_or_zero(value: f64) -> f64 {
  if value.is_finite() { value } else { 0.0 }
}

pub struct NutritionEstimator<'a> {
  config: &'a EstimatorConfig,
}

impl<'a> NutritionEstimator<'a> {
  pub fn new(config: &'a EstimatorConfig) -> Self {
    Self { config }
  }

  /// 热量密度（kcal/100g），未知类别使用回退值
  pub fn calorie_density(&self, label: &str) -> f64 {
    self.config.calorie_density(label).unwrap_or_else(|| {
      debug!(
        "未知类别 {}, 使用默认热量密度 {}",
        label,
        self.config.fallback_calorie_density()
      );
      self.config.fallback_calorie_density()
    })
  }

  pub fn estimate_one(&self, label: &str, volume_cm3: f64, calibration: &CalibrationRatios) -> Estimate {
    let volume_cm3 = finite_or_zero(volume_cm3);
    let mass_grams = finite_or_zero(volume_cm3 * calibration.volume_to_mass);
    let calories = finite_or_zero(mass_grams / 100.0 * self.calorie_density(label));

    if let Some(density) = self.config.food_density(label) {
      debug!(
        "{}: 标定质量 {:.2} g, 按密度表质量 {:.2} g",
        label,
        mass_grams,
        volume_cm3 * density
      );
    }

    Estimate {
      name: label.to_string(),
      volume_cm3,
      mass_grams,
      calories,
    }
  }

  /// 参照物本身不出现在结果中
  pub fn estimate(
    &self,
    items: &[(ShapeDescriptor, f64)],
    calibration: &CalibrationRatios,
  ) -> Vec<Estimate> {
    let reference = self.config.reference();
    items
      .iter()
      .filter(|(descriptor, _)| !reference.matches(&descriptor.label))
      .map(|(descriptor, volume)| self.estimate_one(&descriptor.label, *volume, calibration))
      .collect()
  }
}
