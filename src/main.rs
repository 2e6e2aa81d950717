use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use mdpad::kernel::services::adapters::{self, DirStorage, ProcessConverter};
use mdpad::kernel::services::ports::{
    AppConfig, ConvertOptions, Converter, ExportFormat, KeyValueStorage,
};
use mdpad::kernel::WorkspaceStore;
use mdpad::models::FileTree;

mod logging;

type CliResult = Result<(), Box<dyn Error>>;

const USAGE: &str = "\
usage: mdpad [--storage=DIR] <command>

commands:
  workspaces                                   list workspaces, most recent first
  tree [workspace-id]                          print the file tree of a workspace
  convert <input.md> <pptx|pdf|docx|html> [out] convert a markdown file";

fn main() -> ExitCode {
    let mut storage_dir: Option<PathBuf> = None;
    let mut args: Vec<String> = Vec::new();
    for arg in std::env::args().skip(1) {
        if let Some(value) = arg.strip_prefix("--storage=") {
            storage_dir = Some(PathBuf::from(value));
        } else {
            args.push(arg);
        }
    }

    let logging = logging::init();

    if let Err(e) = adapters::ensure_settings_file() {
        tracing::warn!(error = %e, "failed to create settings file");
    }
    let config = adapters::load_settings().unwrap_or_default();

    let result = match args.first().map(String::as_str) {
        Some("workspaces") => open_storage(storage_dir, &config).and_then(list_workspaces),
        Some("tree") => {
            open_storage(storage_dir, &config).and_then(|s| print_tree(s, args.get(1)))
        }
        Some("convert") => convert(&config, &args[1..]),
        _ => {
            println!("{}", USAGE);
            if let Some(guard) = &logging {
                println!("\nlogs: {}", guard.log_dir().display());
            }
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn open_storage(
    dir: Option<PathBuf>,
    config: &AppConfig,
) -> Result<Arc<dyn KeyValueStorage>, Box<dyn Error>> {
    let dir = match dir.or_else(|| config.storage_dir.clone()) {
        Some(dir) => dir,
        None => adapters::ensure_storage_dir()?,
    };
    Ok(Arc::new(DirStorage::open(dir)?))
}

fn list_workspaces(storage: Arc<dyn KeyValueStorage>) -> CliResult {
    let store = WorkspaceStore::open(storage);
    for workspace in store.list()? {
        let marker = if workspace.id == store.active_id() { "*" } else { " " };
        println!(
            "{} {:<38} {:<24} {} nodes",
            marker,
            workspace.id,
            workspace.name,
            FileTree::from_nodes(workspace.files).len()
        );
    }
    Ok(())
}

fn print_tree(storage: Arc<dyn KeyValueStorage>, id: Option<&String>) -> CliResult {
    let store = WorkspaceStore::open(storage);

    // 只读展示：不填充初始模板，也不写回工作区
    let id = id.cloned().unwrap_or_else(|| store.active_id().to_string());
    let tree = store.tree_of(&id)?;

    for row in tree.flatten_for_view() {
        let icon = match (row.is_folder, row.is_expanded) {
            (true, true) => "v ",
            (true, false) => "> ",
            (false, _) => "  ",
        };
        println!("{}{}{}", "  ".repeat(row.depth as usize), icon, row.name);
    }
    Ok(())
}

fn convert(config: &AppConfig, args: &[String]) -> CliResult {
    let [input, format, rest @ ..] = args else {
        return Err(USAGE.into());
    };
    let format = ExportFormat::parse(format)
        .ok_or_else(|| format!("unsupported format: {}", format))?;
    let input = Path::new(input);
    let output = match rest.first() {
        Some(out) => PathBuf::from(out),
        None => input.with_extension(format.extension()),
    };

    let markdown = std::fs::read_to_string(input)?;
    let options = ConvertOptions {
        theme: None,
        title: input.file_stem().map(|s| s.to_string_lossy().into_owned()),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let converter = ProcessConverter::new(config.converter.clone());

    match runtime.block_on(converter.convert(&markdown, format, &options)) {
        Ok(file) => {
            std::fs::write(&output, &file.bytes)?;
            println!("{} ({} bytes)", output.display(), file.bytes.len());
            Ok(())
        }
        Err(e) => {
            if let Some(diagnostic) = e.diagnostic() {
                eprintln!("{}", diagnostic);
            }
            Err(e.into())
        }
    }
}
