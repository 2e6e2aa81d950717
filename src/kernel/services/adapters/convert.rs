//! 外部命令转换器
//!
//! pptx 交给幻灯片工具（默认 marp），pdf / docx / html 交给文档工具（默认 pandoc）。
//! 输入输出都放在临时目录里，进程超时后随 future 一起被杀掉。

use crate::kernel::services::ports::config::ConverterConfig;
use crate::kernel::services::ports::convert::{
    ConvertError, ConvertFuture, ConvertOptions, ConvertedFile, Converter, ExportFormat,
};
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

const INPUT_FILE: &str = "input.md";

pub struct ProcessConverter {
    config: ConverterConfig,
}

impl ProcessConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn command_for(&self, format: ExportFormat) -> &str {
        if format.is_slides() {
            &self.config.slides_command
        } else {
            &self.config.document_command
        }
    }

    async fn run(
        &self,
        markdown: &str,
        format: ExportFormat,
        options: &ConvertOptions,
    ) -> Result<ConvertedFile, ConvertError> {
        let workdir = tempfile::tempdir()?;
        let input = workdir.path().join(INPUT_FILE);
        let output = workdir.path().join(format!("output.{}", format.extension()));
        tokio::fs::write(&input, markdown).await?;

        let program = self.command_for(format).to_string();
        let mut cmd = Command::new(&program);
        cmd.args(build_args(format, &input, &output, options))
            .current_dir(workdir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::error!(command = %program, "conversion tool not found");
                return Err(ConvertError::ToolMissing(program));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(command = %program, format = format.extension(), "conversion started");

        let out = match tokio::time::timeout(self.config.timeout(), child.wait_with_output()).await
        {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(command = %program, timeout_secs = self.config.timeout_secs, "conversion timed out");
                return Err(ConvertError::Timeout(self.config.timeout_secs));
            }
        };

        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        let diagnostic = (!stderr.is_empty()).then_some(stderr);

        if !out.status.success() {
            tracing::warn!(command = %program, status = %out.status, "conversion failed");
            return Err(ConvertError::Failed {
                message: format!("{} exited with {}", program, out.status),
                diagnostic,
            });
        }

        let bytes = match tokio::fs::read(&output).await {
            Ok(bytes) => bytes,
            Err(e) => {
                return Err(ConvertError::Failed {
                    message: format!("{} produced no output: {}", program, e),
                    diagnostic,
                })
            }
        };

        tracing::info!(command = %program, bytes = bytes.len(), "conversion finished");

        Ok(ConvertedFile {
            file_name: output_file_name(options, format),
            format,
            bytes,
        })
    }
}

impl Converter for ProcessConverter {
    fn convert<'a>(
        &'a self,
        markdown: &'a str,
        format: ExportFormat,
        options: &'a ConvertOptions,
    ) -> ConvertFuture<'a> {
        Box::pin(self.run(markdown, format, options))
    }
}

fn build_args(
    format: ExportFormat,
    input: &Path,
    output: &Path,
    options: &ConvertOptions,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();

    if format.is_slides() {
        args.push(input.into());
        args.push("--pptx".into());
        args.push("--allow-local-files".into());
        args.push("--output".into());
        args.push(output.into());
        if let Some(theme) = &options.theme {
            args.push("--theme".into());
            args.push(theme.into());
        }
        if let Some(title) = &options.title {
            args.push("--title".into());
            args.push(title.into());
        }
        return args;
    }

    args.push(input.into());
    args.push("--from".into());
    args.push("markdown".into());
    args.push("--output".into());
    args.push(output.into());
    if format == ExportFormat::Html {
        args.push("--standalone".into());
    }
    if let Some(title) = &options.title {
        args.push("--metadata".into());
        args.push(format!("title={}", title).into());
    }
    args
}

/// 下载文件名：标题转 slug，缺省为 `document`
fn output_file_name(options: &ConvertOptions, format: ExportFormat) -> String {
    let slug: String = options
        .title
        .as_deref()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let stem = if slug.is_empty() { "document" } else { &slug };
    format!("{}.{}", stem, format.extension())
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/convert.rs"]
mod tests;
