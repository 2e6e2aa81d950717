use super::*;
use std::path::PathBuf;

fn args_as_strings(args: Vec<OsString>) -> Vec<String> {
    args.into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_command_for_routes_by_format() {
    let converter = ProcessConverter::new(ConverterConfig::default());
    assert_eq!(converter.command_for(ExportFormat::Pptx), "marp");
    assert_eq!(converter.command_for(ExportFormat::Pdf), "pandoc");
    assert_eq!(converter.command_for(ExportFormat::Docx), "pandoc");
    assert_eq!(converter.command_for(ExportFormat::Html), "pandoc");
}

#[test]
fn test_slides_args() {
    let options = ConvertOptions {
        theme: Some("gaia".to_string()),
        title: None,
    };
    let args = args_as_strings(build_args(
        ExportFormat::Pptx,
        &PathBuf::from("/tmp/in.md"),
        &PathBuf::from("/tmp/out.pptx"),
        &options,
    ));

    assert_eq!(args[0], "/tmp/in.md");
    assert!(args.contains(&"--pptx".to_string()));
    let out = args.iter().position(|a| a == "--output").unwrap();
    assert_eq!(args[out + 1], "/tmp/out.pptx");
    let theme = args.iter().position(|a| a == "--theme").unwrap();
    assert_eq!(args[theme + 1], "gaia");
}

#[test]
fn test_document_args() {
    let options = ConvertOptions {
        theme: None,
        title: Some("Report".to_string()),
    };
    let html = args_as_strings(build_args(
        ExportFormat::Html,
        &PathBuf::from("in.md"),
        &PathBuf::from("out.html"),
        &options,
    ));
    assert_eq!(&html[..5], &["in.md", "--from", "markdown", "--output", "out.html"]);
    assert!(html.contains(&"--standalone".to_string()));
    assert!(html.contains(&"title=Report".to_string()));

    let pdf = args_as_strings(build_args(
        ExportFormat::Pdf,
        &PathBuf::from("in.md"),
        &PathBuf::from("out.pdf"),
        &ConvertOptions::default(),
    ));
    assert!(!pdf.contains(&"--standalone".to_string()));
    assert!(!pdf.contains(&"--metadata".to_string()));
}

#[test]
fn test_output_file_name() {
    let titled = ConvertOptions {
        theme: None,
        title: Some("  Q3 Review: Final ".to_string()),
    };
    assert_eq!(output_file_name(&titled, ExportFormat::Pdf), "q3-review-final.pdf");
    assert_eq!(
        output_file_name(&ConvertOptions::default(), ExportFormat::Docx),
        "document.docx"
    );
}

#[tokio::test]
async fn test_missing_tool() {
    let converter = ProcessConverter::new(ConverterConfig {
        document_command: "mdpad-no-such-converter".to_string(),
        ..ConverterConfig::default()
    });

    let err = converter
        .convert("# hi", ExportFormat::Pdf, &ConvertOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::ToolMissing(ref cmd) if cmd == "mdpad-no-such-converter"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_non_zero_exit_is_failed() {
    let converter = ProcessConverter::new(ConverterConfig {
        document_command: "false".to_string(),
        ..ConverterConfig::default()
    });

    let err = converter
        .convert("# hi", ExportFormat::Docx, &ConvertOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::Failed { .. }));
}

// `sh input.md --from markdown --output <out>`: the markdown itself is the script, `$4` is the output
#[cfg(unix)]
#[tokio::test]
async fn test_successful_conversion_reads_output() {
    let converter = ProcessConverter::new(ConverterConfig {
        document_command: "sh".to_string(),
        ..ConverterConfig::default()
    });
    let options = ConvertOptions {
        theme: None,
        title: Some("Notes".to_string()),
    };

    let file = converter
        .convert("printf converted > \"$4\"\n", ExportFormat::Html, &options)
        .await
        .unwrap();
    assert_eq!(file.file_name, "notes.html");
    assert_eq!(file.format, ExportFormat::Html);
    assert_eq!(file.bytes, b"converted");
}

#[cfg(unix)]
#[tokio::test]
async fn test_stderr_becomes_diagnostic() {
    let converter = ProcessConverter::new(ConverterConfig {
        document_command: "sh".to_string(),
        ..ConverterConfig::default()
    });

    let err = converter
        .convert(
            "echo 'bad front matter' >&2\nexit 3\n",
            ExportFormat::Pdf,
            &ConvertOptions::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.diagnostic(), Some("bad front matter"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_timeout() {
    let converter = ProcessConverter::new(ConverterConfig {
        document_command: "sh".to_string(),
        timeout_secs: 1,
        ..ConverterConfig::default()
    });

    let err = converter
        .convert("sleep 5\n", ExportFormat::Pdf, &ConvertOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ConvertError::Timeout(1)));
}
