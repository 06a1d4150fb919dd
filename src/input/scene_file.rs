// 该文件是 Shiliang （食量） 项目的一部分。
// src/input/scene_file.rs - 场景文件输入
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

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  scene::{DetectedObject, Mask, Resolution, Scene, SceneError},
  url_to_path,
};

/// 掩码图像中亮度不低于该值的像素视为前景
#[cfg(feature = "mask_image_file")]
const MASK_LUMA_THRESHOLD: u8 = 128;
const ALLOWED_MASK_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

#[derive(Error, Debug)]
pub enum SceneFileError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("路径解码错误: {0}")]
  PathDecodeError(#[from] std::string::FromUtf8Error),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("场景解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("场景数据错误: {0}")]
  SceneError(#[from] SceneError),
  #[cfg(feature = "mask_image_file")]
  #[error("掩码图像加载错误: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("不支持的掩码文件: {0}")]
  UnsupportedMaskFile(PathBuf),
}

#[derive(Deserialize)]
struct SceneRecord {
  width: u32,
  height: u32,
  #[serde(default)]
  objects: Vec<ObjectRecord>,
}

#[derive(Deserialize)]
struct ObjectRecord {
  label: String,
  #[serde(default = "default_score")]
  score: f32,
  mask: MaskRecord,
}

fn default_score() -> f32 {
  1.0
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaskRecord {
  Inline { width: u32, height: u32, data: Vec<u8> },
  File(PathBuf),
}

fn allowed_mask_file(path: &Path) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .map(|ext| {
      ALLOWED_MASK_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    })
    .unwrap_or(false)
}

#[cfg(feature = "mask_image_file")]
fn read_mask_file(path: &Path) -> Result<Mask, SceneFileError> {
  debug!("读取掩码图像: {}", path.display());
  let image = image::ImageReader::open(path)?.decode()?.to_luma8();
  Ok(Mask::from_luma(&image, MASK_LUMA_THRESHOLD)?)
}

#[cfg(not(feature = "mask_image_file"))]
fn read_mask_file(path: &Path) -> Result<Mask, SceneFileError> {
  error!("未启用掩码图像支持: {}", path.display());
  Err(SceneFileError::UnsupportedMaskFile(path.to_path_buf()))
}

impl MaskRecord {
  fn into_mask(self, base: &Path) -> Result<Mask, SceneFileError> {
    match self {
      MaskRecord::Inline { width, height, data } => {
        Ok(Mask::from_row_major(width, height, &data)?)
      }
      MaskRecord::File(file) => {
        let path = base.join(file);
        if !allowed_mask_file(&path) {
          error!("掩码文件类型不支持: {}", path.display());
          return Err(SceneFileError::UnsupportedMaskFile(path));
        }
        read_mask_file(&path)
      }
    }
  }
}

/// 读取一个 JSON 场景文件，掩码文件路径相对于场景文件所在目录
pub fn load_scene(path: &Path) -> Result<Scene, SceneFileError> {
  debug!("读取场景文件: {}", path.display());
  let data = std::fs::read_to_string(path)?;
  let record: SceneRecord = serde_json::from_str(&data)?;
  let base = path.parent().unwrap_or_else(|| Path::new(""));

  let resolution = Resolution::new(record.width, record.height)?;
  let objects = record
    .objects
    .into_iter()
    .map(|object| {
      let mask = object.mask.into_mask(base)?;
      Ok(DetectedObject::new(object.label, mask).with_score(object.score))
    })
    .collect::<Result<Vec<_>, SceneFileError>>()?;

  let mut scene = Scene::new(resolution, objects);
  if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
    scene = scene.with_name(stem);
  }
  Ok(scene)
}

pub struct SceneFileInput {
  scene: Option<Scene>,
}

impl FromUrlWithScheme for SceneFileInput {
  const SCHEME: &'static str = "scene";
}

impl FromUrl for SceneFileInput {
  type Error = SceneFileError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(SceneFileError::SchemeMismatch(url.scheme().to_string()));
    }

    let scene = load_scene(&url_to_path(url)?)?;
    Ok(SceneFileInput { scene: Some(scene) })
  }
}

impl Iterator for SceneFileInput {
  type Item = Scene;

  fn next(&mut self) -> Option<Self::Item> {
    self.scene.take()
  }
}
