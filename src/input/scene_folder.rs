// 该文件是 Shiliang （食量） 项目的一部分。
// src/input/scene_folder.rs - 场景目录批量输入
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

use std::path::PathBuf;

use tracing::{error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  input::scene_file::{SceneFileError, load_scene},
  scene::Scene,
  url_to_path,
};

const SCENE_FILE_EXTENSION: &str = "json";

/// 按文件名顺序逐个读取目录中的场景文件，读取失败的文件会被跳过
pub struct SceneFolderInput {
  files: std::vec::IntoIter<PathBuf>,
}

impl FromUrlWithScheme for SceneFolderInput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for SceneFolderInput {
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

    let directory = url_to_path(url)?;
    let mut files = Vec::new();
    for entry in std::fs::read_dir(&directory)? {
      let path = entry?.path();
      if path.is_file()
        && path
          .extension()
          .is_some_and(|ext| ext.eq_ignore_ascii_case(SCENE_FILE_EXTENSION))
      {
        files.push(path);
      }
    }
    files.sort();

    info!("目录 {} 中共有 {} 个场景文件", directory.display(), files.len());
    Ok(SceneFolderInput {
      files: files.into_iter(),
    })
  }
}

impl Iterator for SceneFolderInput {
  type Item = Scene;

  fn next(&mut self) -> Option<Self::Item> {
    for path in self.files.by_ref() {
      match load_scene(&path) {
        Ok(scene) => return Some(scene),
        Err(e) => error!("读取场景文件 {} 失败: {}", path.display(), e),
      }
    }
    None
  }
}
