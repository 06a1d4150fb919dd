// 该文件是 Shiliang （食量） 项目的一部分。
// src/output/save_report_file.rs - 保存 JSON 报告文件
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

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  model::EstimateResult,
  output::{Render, report::Report},
  scene::Scene,
  url_to_path,
};

#[derive(Error, Debug)]
pub enum SaveReportFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("序列化错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("路径解码错误: {0}")]
  PathDecodeError(#[from] std::string::FromUtf8Error),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

/// 将报告写入单个 JSON 文件，多个场景时后写入的覆盖先写入的
pub struct SaveReportFileOutput {
  path: PathBuf,
  pretty: bool,
}

impl FromUrlWithScheme for SaveReportFileOutput {
  const SCHEME: &'static str = "json";
}

impl FromUrl for SaveReportFileOutput {
  type Error = SaveReportFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveReportFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(SaveReportFileOutput {
      path: url_to_path(uri)?,
      pretty: uri.query_pairs().any(|(k, _)| k == "pretty"),
    })
  }
}

impl SaveReportFileOutput {
  fn save_report(&self, json: String) -> Result<(), SaveReportFileError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    std::fs::write(&self.path, json)?;
    info!("保存报告到文件: {}", self.path.display());

    Ok(())
  }
}

impl Render<Scene, EstimateResult> for SaveReportFileOutput {
  type Error = SaveReportFileError;

  fn render_result(&self, scene: &Scene, result: &EstimateResult) -> Result<(), Self::Error> {
    let json = Report::new(scene, result).to_json(self.pretty)?;
    self.save_report(json)
  }
}
