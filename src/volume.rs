// 该文件是 Shiliang （食量） 项目的一部分。
// src/volume.rs - 体积估计
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

use std::f64::consts::PI;

use tracing::{debug, warn};

use crate::geometry::ShapeDescriptor;

/// 三种体积模型及其权重
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeBreakdown {
  pub length_cm: f64,
  pub width_cm: f64,
  pub cylinder: f64,
  pub ellipsoid: f64,
  pub cuboid: f64,
  pub weight_cylinder: f64,
  pub weight_ellipsoid: f64,
  pub weight_cuboid: f64,
}

impl VolumeBreakdown {
  pub fn weight_sum(&self) -> f64 {
    self.weight_cylinder + self.weight_ellipsoid + self.weight_cuboid
  }

  /// 加权平均体积；权重和不为正或不是有限值时返回 0。
  ///
  /// 紧致度不截断，极小的目标可能让长方体权重为很大的负数，结果为负时同样取 0。
  pub fn blend(&self) -> f64 {
    let weight_sum = self.weight_sum();
    if !weight_sum.is_finite() || weight_sum <= 0.0 {
      warn!("体积模型权重和无效 ({}), 体积取 0", weight_sum);
      return 0.0;
    }

    let volume = (self.cylinder * self.weight_cylinder
      + self.ellipsoid * self.weight_ellipsoid
      + self.cuboid * self.weight_cuboid)
      / weight_sum;

    if volume.is_finite() && volume >= 0.0 {
      volume
    } else {
      debug!("加权体积无效 ({}), 体积取 0", volume);
      0.0
    }
  }
}

/// 长宽比越接近 1 权重越大。
///
/// 长宽比为 0 时取公式的极限值 1。这只说明掩码的横向范围为 0
/// （例如单列竖线），并不表示形状是圆的。
fn ellipsoid_weight(aspect_ratio: f64) -> f64 {
  if aspect_ratio <= 0.0 {
    return 1.0;
  }
  1.0 - (aspect_ratio - 1.0).abs() / aspect_ratio.max(aspect_ratio.recip())
}

/// 由二维形状估计三维体积（cm³），无内部状态
#[derive(Debug, Default, Clone, Copy)]
pub struct VolumeEstimator;

impl VolumeEstimator {
  pub fn new() -> Self {
    Self
  }

  pub fn candidates(&self, descriptor: &ShapeDescriptor, pixel_to_cm: f64) -> VolumeBreakdown {
    let length_cm = descriptor.area.sqrt() * pixel_to_cm;
    let width_cm = if descriptor.perimeter > 0.0 {
      descriptor.area / descriptor.perimeter * pixel_to_cm * 2.0
    } else {
      0.0
    };

    let half_width = width_cm / 2.0;
    VolumeBreakdown {
      length_cm,
      width_cm,
      cylinder: PI * half_width * half_width * length_cm / 3.0,
      ellipsoid: 4.0 / 3.0 * PI * (length_cm / 2.0) * half_width * half_width,
      cuboid: length_cm * width_cm * width_cm / 3.0,
      weight_cylinder: descriptor.compactness,
      weight_ellipsoid: ellipsoid_weight(descriptor.aspect_ratio),
      weight_cuboid: 1.0 - descriptor.compactness,
    }
  }

  pub fn estimate(&self, descriptor: &ShapeDescriptor, pixel_to_cm: f64) -> f64 {
    let breakdown = self.candidates(descriptor, pixel_to_cm);
    let volume = breakdown.blend();
    debug!(
      "{}: 长 {:.2} cm, 宽 {:.2} cm, 体积 {:.2} cm³",
      descriptor.label, breakdown.length_cm, breakdown.width_cm, volume
    );
    volume
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    geometry::GeometryExtractor,
    scene::{DetectedObject, Mask, Resolution},
  };

  fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6 * b.abs().max(1.0)
  }

  #[test]
  fn square_like_shape_blends_all_three_models() {
    let d = ShapeDescriptor::from_measurements("tahu", 100.0, 40.0, 1.0);
    let b = VolumeEstimator::new().candidates(&d, 1.0);
    assert!(close(b.length_cm, 10.0));
    assert!(close(b.width_cm, 5.0));
    assert!(close(b.cylinder, 65.449_846_949_787_36));
    assert!(close(b.ellipsoid, 130.899_693_899_574_7));
    assert!(close(b.cuboid, 83.333_333_333_333_33));
    assert!(close(b.weight_ellipsoid, 1.0));
    assert!(close(VolumeEstimator::new().estimate(&d, 1.0), 100.093_684_936_063_87));
  }

  #[test]
  fn elongated_shape_lowers_ellipsoid_weight() {
    let d = ShapeDescriptor::from_measurements("tempe", 400.0, 80.0, 2.0);
    let b = VolumeEstimator::new().candidates(&d, 1.0);
    assert!(close(b.weight_ellipsoid, 0.5));
    assert!(close(b.blend(), 718.600_122_252_482));
    // 1/a 与 a 对称
    assert!(close(ellipsoid_weight(0.5), 0.75));
  }

  #[test]
  fn circle_favours_cylinder_over_cuboid() {
    let d = ShapeDescriptor::from_measurements("telur", 314.16, 62.83, 1.0);
    let b = VolumeEstimator::new().candidates(&d, 1.0);
    assert!((d.compactness - 1.0).abs() < 1e-3);
    assert!(b.weight_cylinder > 0.999);
    assert!(b.weight_cuboid.abs() < 1e-3);
    assert!(b.weight_cylinder >= b.weight_ellipsoid - 1e-3);
  }

  #[test]
  fn drawn_disk_favours_cylinder_over_cuboid() {
    let mask = Mask::from_fn(40, 40, |x, y| {
      (x as i32 - 20).pow(2) + (y as i32 - 20).pow(2) <= 100
    })
    .unwrap();
    let object = DetectedObject::new("telur", mask);
    let d = GeometryExtractor::new().describe(&object, Resolution::new(40, 40).unwrap());
    let b = VolumeEstimator::new().candidates(&d, 1.0);
    assert!(b.weight_cylinder > b.weight_cuboid);
    assert!(b.weight_cylinder * b.cylinder > b.weight_cuboid * b.cuboid);
    assert!(VolumeEstimator::new().estimate(&d, 1.0) > 0.0);
  }

  #[test]
  fn estimate_is_deterministic_and_non_negative() {
    let estimator = VolumeEstimator::new();
    let d = ShapeDescriptor::from_measurements("ayam", 523.0, 131.0, 1.7);
    let first = estimator.estimate(&d, 0.37);
    for _ in 0..10 {
      assert_eq!(estimator.estimate(&d, 0.37), first);
    }
    assert!(first >= 0.0);
  }

  #[test]
  fn volume_scales_with_cube_of_ratio() {
    let d = ShapeDescriptor::from_measurements("nasi", 900.0, 150.0, 1.2);
    let v1 = VolumeEstimator::new().estimate(&d, 1.0);
    let v2 = VolumeEstimator::new().estimate(&d, 2.0);
    assert!(close(v2, v1 * 8.0));
  }

  #[test]
  fn degenerate_inputs_yield_zero() {
    let estimator = VolumeEstimator::new();
    let no_edges = ShapeDescriptor::from_measurements("nasi", 36.0, 0.0, 1.0);
    assert_eq!(estimator.estimate(&no_edges, 1.0), 0.0);

    let empty = ShapeDescriptor::from_measurements("nasi", 0.0, 0.0, 1.0);
    assert_eq!(estimator.estimate(&empty, 1.0), 0.0);

    let mut broken = ShapeDescriptor::from_measurements("nasi", 10.0, 5.0, 1.0);
    broken.compactness = f64::NAN;
    assert_eq!(estimator.estimate(&broken, 1.0), 0.0);

    // 紧致度 20 时长方体权重为 -19，加权和为负
    let mut tiny = ShapeDescriptor::from_measurements("nasi", 1.0, 1.0, 0.5);
    tiny.compactness = 20.0;
    assert!(estimator.candidates(&tiny, 1.0).weight_cuboid < -18.0);
    assert_eq!(estimator.estimate(&tiny, 1.0), 0.0);
  }

  #[test]
  fn zero_aspect_ratio_uses_limit_weight() {
    assert_eq!(ellipsoid_weight(0.0), 1.0);

    // 单列竖线的横向范围为 0
    let line = DetectedObject::new("sendok", Mask::from_fn(8, 8, |x, y| x == 3 && y > 0).unwrap());
    let d = GeometryExtractor::new().describe(&line, Resolution::new(8, 8).unwrap());
    assert_eq!(d.aspect_ratio, 0.0);
    assert_eq!(VolumeEstimator::new().candidates(&d, 1.0).weight_ellipsoid, 1.0);
  }
}
