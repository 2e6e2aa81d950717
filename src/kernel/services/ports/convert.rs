//! 文档转换：markdown → pptx / pdf / docx / html
//!
//! 实际转换由外部命令完成，这里只定义契约。

use std::future::Future;
use std::pin::Pin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Pptx,
    Pdf,
    Docx,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Pptx,
        ExportFormat::Pdf,
        ExportFormat::Docx,
        ExportFormat::Html,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pptx" | "ppt" | "slides" => Some(Self::Pptx),
            "pdf" => Some(Self::Pdf),
            "docx" | "word" => Some(Self::Docx),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pptx => "pptx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
            ExportFormat::Html => "html",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Html => "text/html",
        }
    }

    pub fn is_slides(self) -> bool {
        matches!(self, ExportFormat::Pptx)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    pub theme: Option<String>,
    pub title: Option<String>,
}

/// 转换结果（下载句柄）
#[derive(Debug, Clone)]
pub struct ConvertedFile {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

#[derive(Debug)]
pub enum ConvertError {
    ToolMissing(String),
    Failed {
        message: String,
        diagnostic: Option<String>,
    },
    Timeout(u64),
    Io(std::io::Error),
}

impl std::fmt::Display for ConvertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvertError::ToolMissing(cmd) => write!(f, "Conversion tool not found: {}", cmd),
            ConvertError::Failed { message, .. } => write!(f, "Conversion failed: {}", message),
            ConvertError::Timeout(secs) => write!(f, "Conversion timed out after {}s", secs),
            ConvertError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<std::io::Error> for ConvertError {
    fn from(e: std::io::Error) -> Self {
        ConvertError::Io(e)
    }
}

impl ConvertError {
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            ConvertError::Failed { diagnostic, .. } => diagnostic.as_deref(),
            _ => None,
        }
    }
}

pub type ConvertFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ConvertedFile, ConvertError>> + Send + 'a>>;

/// 失败不会自动重试，错误原样交给调用方展示
pub trait Converter: Send + Sync {
    fn convert<'a>(
        &'a self,
        markdown: &'a str,
        format: ExportFormat,
        options: &'a ConvertOptions,
    ) -> ConvertFuture<'a>;
}
