// 该文件是 Shiliang （食量） 项目的一部分。
// src/geometry.rs - 掩码几何特征提取
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

use imageproc::gradients::sobel_gradients;
use serde::Serialize;
use tracing::debug;

use crate::scene::{DetectedObject, Mask, Resolution};

/// 单个目标的形状描述，单位为原始图像像素
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeDescriptor {
  pub label: String,
  pub area: f64,
  pub perimeter: f64,
  pub compactness: f64,
  pub aspect_ratio: f64,
}

impl ShapeDescriptor {
  /// 由已知的面积、周长和长宽比构造，紧致度按周长面积比计算
  pub fn from_measurements(
    label: impl Into<String>,
    area: f64,
    perimeter: f64,
    aspect_ratio: f64,
  ) -> Self {
    Self {
      label: label.into(),
      area,
      perimeter,
      compactness: compactness(area, perimeter),
      aspect_ratio,
    }
  }
}

/// 等周比 4πA/P²，圆为 1。
///
/// 离散化误差可能使结果略大于 1，这里不做截断。周长为 0 时返回 0。
pub fn compactness(area: f64, perimeter: f64) -> f64 {
  if perimeter > 0.0 {
    4.0 * PI * area / (perimeter * perimeter)
  } else {
    0.0
  }
}

/// 前景像素横向范围与纵向范围之比，纵向范围为 0 时取 1
fn aspect_ratio(mask: &Mask) -> f64 {
  let mut bounds: Option<(u32, u32, u32, u32)> = None;
  for (x, y) in mask.foreground() {
    bounds = Some(match bounds {
      None => (x, x, y, y),
      Some((x_min, x_max, y_min, y_max)) => {
        (x_min.min(x), x_max.max(x), y_min.min(y), y_max.max(y))
      }
    });
  }

  match bounds {
    Some((x_min, x_max, y_min, y_max)) if y_max > y_min => {
      f64::from(x_max - x_min) / f64::from(y_max - y_min)
    }
    _ => 1.0,
  }
}

/// 前景内 Sobel 梯度幅值非零的像素数。
///
/// 只计边界内侧一圈，仅对角相邻背景的像素也会计入，
/// 半径 10 的离散圆得到 76，比真实周长 62.8 偏大。
fn edge_pixels(mask: &Mask) -> usize {
  let image = mask.as_image();
  sobel_gradients(image)
    .enumerate_pixels()
    .filter(|(x, y, p)| p[0] > 0 && image.get_pixel(*x, *y)[0] > 0)
    .count()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GeometryExtractor;

impl GeometryExtractor {
  pub fn new() -> Self {
    Self
  }

  /// 逐个提取形状描述，保持输入顺序
  pub fn extract<'a>(
    &self,
    objects: impl IntoIterator<Item = &'a DetectedObject>,
    resolution: Resolution,
  ) -> Vec<ShapeDescriptor> {
    objects
      .into_iter()
      .map(|object| self.describe(object, resolution))
      .collect()
  }

  pub fn describe(&self, object: &DetectedObject, resolution: Resolution) -> ShapeDescriptor {
    let mask = &object.mask;
    let scale_y = f64::from(resolution.height) / f64::from(mask.height());
    let scale_x = f64::from(resolution.width) / f64::from(mask.width());

    let area = mask.count() as f64 * scale_y * scale_x;
    let perimeter = edge_pixels(mask) as f64 * (scale_y + scale_x) / 2.0;
    if perimeter == 0.0 {
      debug!("目标 {} 没有边缘像素，紧致度取 0", object.label);
    }

    let descriptor = ShapeDescriptor {
      label: object.label.clone(),
      area,
      perimeter,
      compactness: compactness(area, perimeter),
      aspect_ratio: aspect_ratio(mask),
    };
    debug!("形状描述: {:?}", descriptor);
    descriptor
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn object(width: u32, height: u32, f: impl Fn(u32, u32) -> bool) -> DetectedObject {
    DetectedObject::new("nasi", Mask::from_fn(width, height, f).unwrap())
  }

  #[test]
  fn area_is_scaled_to_original_resolution() {
    // 10x10 掩码映射到 20x40 原图: scale_x = 2, scale_y = 4
    let obj = object(10, 10, |x, y| (2..6).contains(&x) && (3..6).contains(&y));
    let resolution = Resolution::new(20, 40).unwrap();
    let d = GeometryExtractor::new().describe(&obj, resolution);
    assert_eq!(d.area, 12.0 * 8.0);
    assert!(d.perimeter > 0.0);
    assert_eq!(d.perimeter % 3.0, 0.0);
  }

  #[test]
  fn single_row_mask_has_unit_aspect_ratio() {
    let obj = object(12, 6, |x, y| y == 2 && (1..9).contains(&x));
    let d = GeometryExtractor::new().describe(&obj, Resolution::new(12, 6).unwrap());
    assert_eq!(d.aspect_ratio, 1.0);
  }

  #[test]
  fn aspect_ratio_uses_coordinate_ranges() {
    let obj = object(16, 16, |x, y| (2..=9).contains(&x) && (3..=4).contains(&y));
    let d = GeometryExtractor::new().describe(&obj, Resolution::new(16, 16).unwrap());
    assert_eq!(d.aspect_ratio, 7.0);
  }

  #[test]
  fn empty_mask_degrades_to_zero_descriptor() {
    let obj = object(8, 8, |_, _| false);
    let d = GeometryExtractor::new().describe(&obj, Resolution::new(8, 8).unwrap());
    assert_eq!(d.area, 0.0);
    assert_eq!(d.perimeter, 0.0);
    assert_eq!(d.compactness, 0.0);
    assert_eq!(d.aspect_ratio, 1.0);
  }

  #[test]
  fn full_mask_has_no_edges() {
    let obj = object(6, 6, |_, _| true);
    let d = GeometryExtractor::new().describe(&obj, Resolution::new(6, 6).unwrap());
    assert_eq!(d.area, 36.0);
    assert_eq!(d.perimeter, 0.0);
    assert_eq!(d.compactness, 0.0);
  }

  #[test]
  fn compactness_is_non_negative_for_drawn_shapes() {
    let shapes: [Box<dyn Fn(u32, u32) -> bool>; 3] = [
      Box::new(|x, y| (x as i32 - 20).pow(2) + (y as i32 - 20).pow(2) <= 100),
      Box::new(|x, y| (4..36).contains(&x) && (18..22).contains(&y)),
      Box::new(|x, y| x + y < 30 && x > 3 && y > 3),
    ];
    for shape in shapes {
      let obj = object(40, 40, shape);
      let d = GeometryExtractor::new().describe(&obj, Resolution::new(40, 40).unwrap());
      assert!(d.perimeter > 0.0);
      assert!(d.compactness >= 0.0);
    }
  }

  #[test]
  fn drawn_disk_counts_inner_ring_only() {
    let obj = object(40, 40, |x, y| {
      (x as i32 - 20).pow(2) + (y as i32 - 20).pow(2) <= 100
    });
    let d = GeometryExtractor::new().describe(&obj, Resolution::new(40, 40).unwrap());
    assert_eq!(d.area, 317.0);
    assert_eq!(d.perimeter, 76.0);
    assert!((d.compactness - 0.6897).abs() < 1e-3);
    assert_eq!(d.aspect_ratio, 1.0);
  }

  #[test]
  fn ideal_circle_measurements_are_fully_compact() {
    let d = ShapeDescriptor::from_measurements("telur", 314.16, 62.83, 1.0);
    assert!((d.compactness - 1.0).abs() < 1e-3);
  }

  #[test]
  fn extract_preserves_order() {
    let objects = vec![
      DetectedObject::new("nasi", Mask::from_fn(4, 4, |_, _| true).unwrap()),
      DetectedObject::new("tempe", Mask::from_fn(4, 4, |x, _| x == 0).unwrap()),
    ];
    let descriptors = GeometryExtractor::new().extract(&objects, Resolution::new(4, 4).unwrap());
    let labels: Vec<_> = descriptors.iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, ["nasi", "tempe"]);
    assert_eq!(descriptors[1].area, 4.0);
  }
}
