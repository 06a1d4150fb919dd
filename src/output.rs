// 该文件是 Shiliang （食量） 项目的一部分。
// src/output.rs - 输出定义
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

use crate::FromUrl;
use crate::FromUrlWithScheme;
use crate::model::EstimateResult;
use crate::scene::Scene;
use thiserror::Error;
use url::Url;

pub trait Render<Frame, Output>: Sized {
  type Error;
  fn render_result(&self, frame: &Frame, result: &Output) -> Result<(), Self::Error>;
}

pub mod report;

mod log_report;
pub use self::log_report::{LogReportError, LogReportOutput};

#[cfg(feature = "save_report_file")]
mod save_report_file;
#[cfg(feature = "save_report_file")]
pub use self::save_report_file::{SaveReportFileError, SaveReportFileOutput};

#[cfg(feature = "directory_record")]
mod directory_record;
#[cfg(feature = "directory_record")]
pub use self::directory_record::{DirectoryRecordOutput, DirectoryRecordOutputError};

#[derive(Error, Debug)]
pub enum OutputError {
  #[error("日志报告错误: {0}")]
  LogReportError(#[from] LogReportError),
  #[cfg(feature = "save_report_file")]
  #[error("保存报告文件错误: {0}")]
  SaveReportFileError(#[from] SaveReportFileError),
  #[cfg(feature = "directory_record")]
  #[error("目录记录输出错误: {0}")]
  DirectoryRecordOutputError(#[from] DirectoryRecordOutputError),
  #[error("URI 方案不匹配")]
  SchemeMismatch,
}

pub enum OutputWrapper {
  LogReportOutput(LogReportOutput),
  #[cfg(feature = "save_report_file")]
  SaveReportFileOutput(SaveReportFileOutput),
  #[cfg(feature = "directory_record")]
  DirectoryRecordOutput(DirectoryRecordOutput),
}

impl FromUrl for OutputWrapper {
  type Error = OutputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      LogReportOutput::SCHEME => {
        let output = LogReportOutput::from_url(url)?;
        Ok(OutputWrapper::LogReportOutput(output))
      }
      #[cfg(feature = "save_report_file")]
      SaveReportFileOutput::SCHEME => {
        let output = SaveReportFileOutput::from_url(url)?;
        Ok(OutputWrapper::SaveReportFileOutput(output))
      }
      #[cfg(feature = "directory_record")]
      DirectoryRecordOutput::SCHEME => {
        let output = DirectoryRecordOutput::from_url(url)?;
        Ok(OutputWrapper::DirectoryRecordOutput(output))
      }
      _ => Err(OutputError::SchemeMismatch),
    }
  }
}

impl Render<Scene, EstimateResult> for OutputWrapper {
  type Error = OutputError;

  fn render_result(&self, scene: &Scene, result: &EstimateResult) -> Result<(), Self::Error> {
    match self {
      OutputWrapper::LogReportOutput(output) => output
        .render_result(scene, result)
        .map_err(OutputError::from),
      #[cfg(feature = "save_report_file")]
      OutputWrapper::SaveReportFileOutput(output) => output
        .render_result(scene, result)
        .map_err(OutputError::from),
      #[cfg(feature = "directory_record")]
      OutputWrapper::DirectoryRecordOutput(output) => output
        .render_result(scene, result)
        .map_err(OutputError::from),
    }
  }
}
