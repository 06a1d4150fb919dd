// 该文件是 Shiliang （食量） 项目的一部分。
// src/scene.rs - 场景与掩码定义
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

use image::{GrayImage, Luma};
use thiserror::Error;

/// 掩码中表示前景的像素值
const MASK_FOREGROUND: u8 = u8::MAX;
const MASK_BACKGROUND: u8 = 0;

#[derive(Error, Debug)]
pub enum SceneError {
  #[error("掩码尺寸无效: {width}x{height}")]
  EmptyMask { width: u32, height: u32 },
  #[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
  DataLengthMismatch { expected: usize, actual: usize },
  #[error("图像分辨率无效: {width}x{height}")]
  InvalidResolution { width: u32, height: u32 },
}

/// 原始图像分辨率
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Resolution {
  pub width: u32,
  pub height: u32,
}

impl Resolution {
  pub fn new(width: u32, height: u32) -> Result<Self, SceneError> {
    if width == 0 || height == 0 {
      return Err(SceneError::InvalidResolution { width, height });
    }
    Ok(Self { width, height })
  }
}

/// 二值掩码，保存为 0 / 255 的灰度图，便于直接做梯度运算
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
  image: GrayImage,
}

impl Mask {
  pub fn from_fn(
    width: u32,
    height: u32,
    f: impl Fn(u32, u32) -> bool,
  ) -> Result<Self, SceneError> {
    if width == 0 || height == 0 {
      return Err(SceneError::EmptyMask { width, height });
    }

    let image = GrayImage::from_fn(width, height, |x, y| {
      if f(x, y) {
        Luma([MASK_FOREGROUND])
      } else {
        Luma([MASK_BACKGROUND])
      }
    });
    Ok(Self { image })
  }

  /// 由按行展开的数据构造掩码，非零即前景
  pub fn from_row_major(width: u32, height: u32, data: &[u8]) -> Result<Self, SceneError> {
    let expected = width as usize * height as usize;
    if data.len() != expected {
      return Err(SceneError::DataLengthMismatch {
        expected,
        actual: data.len(),
      });
    }

    Self::from_fn(width, height, |x, y| {
      data[y as usize * width as usize + x as usize] != 0
    })
  }

  /// 由灰度图构造掩码，亮度不低于 `threshold` 的像素视为前景
  pub fn from_luma(image: &GrayImage, threshold: u8) -> Result<Self, SceneError> {
    Self::from_fn(image.width(), image.height(), |x, y| {
      image.get_pixel(x, y)[0] >= threshold
    })
  }

  pub fn width(&self) -> u32 {
    self.image.width()
  }

  pub fn height(&self) -> u32 {
    self.image.height()
  }

  pub fn get(&self, x: u32, y: u32) -> bool {
    self.image.get_pixel(x, y)[0] == MASK_FOREGROUND
  }

  pub fn as_image(&self) -> &GrayImage {
    &self.image
  }

  /// 前景像素坐标
  pub fn foreground(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
    self
      .image
      .enumerate_pixels()
      .filter(|(_, _, p)| p[0] == MASK_FOREGROUND)
      .map(|(x, y, _)| (x, y))
  }

  pub fn count(&self) -> usize {
    self.foreground().count()
  }
}

/// 分割模型给出的单个目标
#[derive(Debug, Clone)]
pub struct DetectedObject {
  pub label: String,
  pub score: f32,
  pub mask: Mask,
}

impl DetectedObject {
  pub fn new(label: impl Into<String>, mask: Mask) -> Self {
    Self {
      label: label.into(),
      score: 1.0,
      mask,
    }
  }

  pub fn with_score(mut self, score: f32) -> Self {
    self.score = score;
    self
  }
}

/// 一张照片的全部检测结果
#[derive(Debug, Clone)]
pub struct Scene {
  pub name: Option<String>,
  pub resolution: Resolution,
  pub objects: Box<[DetectedObject]>,
}

impl Scene {
  pub fn new(resolution: Resolution, objects: Vec<DetectedObject>) -> Self {
    Self {
      name: None,
      resolution,
      objects: objects.into_boxed_slice(),
    }
  }

  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn len(&self) -> usize {
    self.objects.len()
  }

  pub fn is_empty(&self) -> bool {
    self.objects.is_empty()
  }
}
