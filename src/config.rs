// 该文件是 Shiliang （食量） 项目的一部分。
// src/config.rs - 估算配置表
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

use std::{collections::HashMap, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// 未知类别使用的热量密度（kcal/100g）
pub const FALLBACK_CALORIE_DENSITY: f64 = 100.0;
/// 低于该置信度的检测结果不参与估算
pub const DEFAULT_MIN_SCORE: f32 = 0.2;

const DEFAULT_REFERENCE_LABEL: &str = "sendok";
const DEFAULT_REFERENCE_LENGTH_CM: f64 = 19.0;
const DEFAULT_REFERENCE_MASS_GRAMS: f64 = 30.0;

// (类别, 热量密度 kcal/100g, 密度 g/cm³)
const DEFAULT_FOOD_TABLE: [(&str, f64, f64); 11] = [
  ("nasi", 130.0, 0.85),
  ("ayam", 239.0, 1.05),
  ("telur", 155.0, 1.03),
  ("tempe", 193.0, 1.10),
  ("tahu", 76.0, 1.05),
  ("ikan", 128.0, 1.05),
  ("sayur", 35.0, 0.60),
  ("sambal", 45.0, 1.00),
  ("kerupuk", 480.0, 0.30),
  ("perkedel", 180.0, 0.95),
  ("sendok", 0.0, 7.90),
];

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("配置解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("配置项 {field} 的取值无效: {value}")]
  InvalidValue { field: String, value: f64 },
}

fn invalid(field: impl Into<String>, value: f64) -> ConfigError {
  ConfigError::InvalidValue {
    field: field.into(),
    value,
  }
}

/// 已知尺寸与质量的参照物
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceObject {
  pub label: String,
  pub length_cm: f64,
  pub mass_grams: f64,
}

impl Default for ReferenceObject {
  fn default() -> Self {
    Self {
      label: DEFAULT_REFERENCE_LABEL.to_string(),
      length_cm: DEFAULT_REFERENCE_LENGTH_CM,
      mass_grams: DEFAULT_REFERENCE_MASS_GRAMS,
    }
  }
}

impl ReferenceObject {
  /// 类别名不区分大小写
  pub fn matches(&self, label: &str) -> bool {
    self.label.to_lowercase() == label.to_lowercase()
  }

  /// 长度与质量必须是有限正数
  fn validate(&self) -> Result<(), ConfigError> {
    for (field, value) in [
      ("reference.length_cm", self.length_cm),
      ("reference.mass_grams", self.mass_grams),
    ] {
      if !(value.is_finite() && value > 0.0) {
        return Err(invalid(field, value));
      }
    }
    Ok(())
  }
}

/// 密度不能为负，也不能是 NaN 或无穷
fn check_density(field: impl Into<String>, value: f64) -> Result<f64, ConfigError> {
  if value.is_finite() && value >= 0.0 {
    Ok(value)
  } else {
    Err(invalid(field, value))
  }
}

fn check_min_score(min_score: f32) -> Result<f32, ConfigError> {
  if (0.0..=1.0).contains(&min_score) {
    Ok(min_score)
  } else {
    Err(invalid("min_score", f64::from(min_score)))
  }
}

#[derive(Deserialize)]
#[serde(default)]
struct ConfigFile {
  reference: ReferenceObject,
  calorie_density: HashMap<String, f64>,
  food_density: HashMap<String, f64>,
  fallback_calorie_density: f64,
  min_score: f32,
}

impl Default for ConfigFile {
  fn default() -> Self {
    Self {
      reference: ReferenceObject::default(),
      calorie_density: DEFAULT_FOOD_TABLE
        .iter()
        .map(|(label, kcal, _)| (label.to_string(), *kcal))
        .collect(),
      food_density: DEFAULT_FOOD_TABLE
        .iter()
        .map(|(label, _, density)| (label.to_string(), *density))
        .collect(),
      fallback_calorie_density: FALLBACK_CALORIE_DENSITY,
      min_score: DEFAULT_MIN_SCORE,
    }
  }
}

fn lowercase_keys(
  table_name: &str,
  table: HashMap<String, f64>,
) -> Result<HashMap<String, f64>, ConfigError> {
  table
    .into_iter()
    .map(|(label, value)| {
      let value = check_density(format!("{}.{}", table_name, label), value)?;
      Ok((label.to_lowercase(), value))
    })
    .collect()
}

/// 估算流水线使用的只读配置。
///
/// 类别表的键统一为小写，查询时不区分大小写。
/// 密度表 `food_density` 目前不参与质量计算，质量只由参照物标定得到。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "ConfigFile")]
pub struct EstimatorConfig {
  reference: ReferenceObject,
  calorie_density: HashMap<String, f64>,
  food_density: HashMap<String, f64>,
  fallback_calorie_density: f64,
  min_score: f32,
}

impl TryFrom<ConfigFile> for EstimatorConfig {
  type Error = ConfigError;

  fn try_from(file: ConfigFile) -> Result<Self, Self::Error> {
    file.reference.validate()?;
    Ok(Self {
      reference: file.reference,
      calorie_density: lowercase_keys("calorie_density", file.calorie_density)?,
      food_density: lowercase_keys("food_density", file.food_density)?,
      fallback_calorie_density: check_density(
        "fallback_calorie_density",
        file.fallback_calorie_density,
      )?,
      min_score: check_min_score(file.min_score)?,
    })
  }
}

impl Default for EstimatorConfig {
  fn default() -> Self {
    let file = ConfigFile::default();
    Self {
      reference: file.reference,
      calorie_density: file.calorie_density,
      food_density: file.food_density,
      fallback_calorie_density: file.fallback_calorie_density,
      min_score: file.min_score,
    }
  }
}

impl EstimatorConfig {
  /// 从 JSON 文件读取配置，缺省字段使用内置值
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    info!("加载配置文件: {}", path.display());
    let data = std::fs::read_to_string(path)?;
    Self::from_json_str(&data)
  }

  pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
    let file: ConfigFile = serde_json::from_str(data)?;
    Self::try_from(file)
  }

  pub fn with_reference(mut self, reference: ReferenceObject) -> Result<Self, ConfigError> {
    reference.validate()?;
    self.reference = reference;
    Ok(self)
  }

  pub fn with_calorie_density(
    mut self,
    label: &str,
    kcal_per_100g: f64,
  ) -> Result<Self, ConfigError> {
    let value = check_density(format!("calorie_density.{}", label), kcal_per_100g)?;
    self.calorie_density.insert(label.to_lowercase(), value);
    Ok(self)
  }

  pub fn with_food_density(mut self, label: &str, grams_per_cm3: f64) -> Result<Self, ConfigError> {
    let value = check_density(format!("food_density.{}", label), grams_per_cm3)?;
    self.food_density.insert(label.to_lowercase(), value);
    Ok(self)
  }

  pub fn with_fallback_calorie_density(mut self, kcal_per_100g: f64) -> Result<Self, ConfigError> {
    self.fallback_calorie_density = check_density("fallback_calorie_density", kcal_per_100g)?;
    Ok(self)
  }

  pub fn with_min_score(mut self, min_score: f32) -> Result<Self, ConfigError> {
    self.min_score = check_min_score(min_score)?;
    Ok(self)
  }

  pub fn reference(&self) -> &ReferenceObject {
    &self.reference
  }

  pub fn calorie_density(&self, label: &str) -> Option<f64> {
    self.calorie_density.get(&label.to_lowercase()).copied()
  }

  pub fn food_density(&self, label: &str) -> Option<f64> {
    self.food_density.get(&label.to_lowercase()).copied()
  }

  pub fn fallback_calorie_density(&self) -> f64 {
    self.fallback_calorie_density
  }

  pub fn min_score(&self) -> f32 {
    self.min_score
  }
}
