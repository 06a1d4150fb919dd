// 该文件是 Shiliang （食量） 项目的一部分。
// src/calibration.rs - 参照物尺度标定
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
use tracing::{debug, info, warn};

use crate::{config::ReferenceObject, geometry::ShapeDescriptor, volume::VolumeEstimator};

/// 单张图像的标定结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationRatios {
  /// 像素到厘米的换算比例
  pub pixel_to_cm: f64,
  /// 体积（cm³）到质量（g）的换算比例
  pub volume_to_mass: f64,
  /// 是否找到参照物；未找到时两个比例均为 1
  pub reference_found: bool,
}

impl CalibrationRatios {
  /// 未找到参照物时使用的单位比例
  pub const UNIT: CalibrationRatios = CalibrationRatios {
    pixel_to_cm: 1.0,
    volume_to_mass: 1.0,
    reference_found: false,
  };
}

impl Default for CalibrationRatios {
  fn default() -> Self {
    Self::UNIT
  }
}

/// 根据参照物的已知长度和质量推导换算比例
#[derive(Debug, Clone, Copy)]
pub struct ScaleCalibrator<'a> {
  reference: &'a ReferenceObject,
  volume: VolumeEstimator,
}

impl<'a> ScaleCalibrator<'a> {
  pub fn new(reference: &'a ReferenceObject) -> Self {
    Self {
      reference,
      volume: VolumeEstimator::new(),
    }
  }

  /// 多个参照物时取输入顺序中的第一个
  pub fn find_reference<'d>(&self, descriptors: &'d [ShapeDescriptor]) -> Option<&'d ShapeDescriptor> {
    let mut matches = descriptors
      .iter()
      .filter(|d| self.reference.matches(&d.label));
    let first = matches.next();
    let ignored = matches.count();
    if ignored > 0 {
      debug!("检测到多个参照物 {}, 忽略后 {} 个", self.reference.label, ignored);
    }
    first
  }

  pub fn calibrate(&self, descriptors: &[ShapeDescriptor]) -> CalibrationRatios {
    let reference = match self.find_reference(descriptors) {
      Some(reference) if reference.area > 0.0 => reference,
      Some(_) => {
        warn!("参照物 {} 面积为 0, 使用单位比例", self.reference.label);
        return CalibrationRatios::UNIT;
      }
      None => {
        warn!("未检测到参照物 {}, 使用单位比例", self.reference.label);
        return CalibrationRatios::UNIT;
      }
    };

    let pixel_to_cm = self.reference.length_cm / reference.area.sqrt();
    let reference_volume = self.volume.estimate(reference, pixel_to_cm);
    let volume_to_mass = if reference_volume > 0.0 {
      self.reference.mass_grams / reference_volume
    } else {
      warn!("参照物体积为 0, 体积质量比使用 1");
      1.0
    };

    info!(
      "标定完成: 像素厘米比 {:.4}, 参照物体积 {:.2} cm³, 体积质量比 {:.4}",
      pixel_to_cm, reference_volume, volume_to_mass
    );

    CalibrationRatios {
      pixel_to_cm,
      volume_to_mass,
      reference_found: true,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn spoon() -> ReferenceObject {
    ReferenceObject {
      label: "sendok".to_string(),
      length_cm: 19.0,
      mass_grams: 30.0,
    }
  }

  #[test]
  fn spoon_area_sets_pixel_ratio() {
    let reference = spoon();
    let descriptors = vec![
      ShapeDescriptor::from_measurements("nasi", 2500.0, 180.0, 1.1),
      ShapeDescriptor::from_measurements("sendok", 100.0, 60.0, 4.0),
    ];
    let ratios = ScaleCalibrator::new(&reference).calibrate(&descriptors);
    assert!(ratios.reference_found);
    assert!((ratios.pixel_to_cm - 1.9).abs() < 1e-12);

    let reference_volume = VolumeEstimator::new().estimate(&descriptors[1], 1.9);
    assert!((ratios.volume_to_mass * reference_volume - 30.0).abs() < 1e-9);
  }

  #[test]
  fn missing_reference_falls_back_to_unit() {
    let reference = spoon();
    let descriptors = vec![ShapeDescriptor::from_measurements("nasi", 2500.0, 180.0, 1.1)];
    let ratios = ScaleCalibrator::new(&reference).calibrate(&descriptors);
    assert_eq!(ratios.pixel_to_cm, 1.0);
    assert_eq!(ratios.volume_to_mass, 1.0);
    assert!(!ratios.reference_found);
    assert_eq!(ScaleCalibrator::new(&reference).calibrate(&[]), CalibrationRatios::UNIT);
  }

  #[test]
  fn first_reference_wins_and_match_ignores_case() {
    let reference = spoon();
    let descriptors = vec![
      ShapeDescriptor::from_measurements("SENDOK", 400.0, 100.0, 3.0),
      ShapeDescriptor::from_measurements("sendok", 100.0, 60.0, 4.0),
    ];
    let ratios = ScaleCalibrator::new(&reference).calibrate(&descriptors);
    assert!((ratios.pixel_to_cm - 19.0 / 20.0).abs() < 1e-12);
  }

  #[test]
  fn zero_area_reference_is_treated_as_missing() {
    let reference = spoon();
    let descriptors = vec![ShapeDescriptor::from_measurements("sendok", 0.0, 0.0, 1.0)];
    assert_eq!(
      ScaleCalibrator::new(&reference).calibrate(&descriptors),
      CalibrationRatios::UNIT
    );
  }

  #[test]
  fn edgeless_reference_keeps_pixel_ratio() {
    let reference = spoon();
    let descriptors = vec![ShapeDescriptor::from_measurements("sendok", 100.0, 0.0, 1.0)];
    let ratios = ScaleCalibrator::new(&reference).calibrate(&descriptors);
    assert!(ratios.reference_found);
    assert!((ratios.pixel_to_cm - 1.9).abs() < 1e-12);
    assert_eq!(ratios.volume_to_mass, 1.0);
  }
}
