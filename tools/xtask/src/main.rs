//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 dialogue-runtime 覆盖率
//! - `script-check`: 检查脚本文件（标签、分节、资源引用）

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use walkdir::WalkDir;
use xshell::{Shell, cmd};

use dialogue_runtime::{
    DiagnosticLevel, DiagnosticResult, ResourceType, analyze_script, extract_resource_references,
};

/// 脚本文件扩展名
const SCRIPT_EXTENSIONS: &[&str] = &["dlg", "txt"];

/// 图标文件扩展名
const ICON_EXTENSIONS: &[&str] = &["png", "webp", "svg"];

#[derive(Parser)]
#[command(name = "xtask", about = "开发辅助工具")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand)]
enum Task {
    /// 运行 fmt、clippy、test 门禁检查
    CheckAll,
    /// 运行 dialogue-runtime 覆盖率报告
    CovRuntime,
    /// 检查脚本文件
    ScriptCheck {
        /// 脚本文件或目录（默认 assets/scripts）
        path: Option<PathBuf>,
        /// 图标目录（默认 assets/icons）
        #[arg(long)]
        icons: Option<PathBuf>,
        /// 同时输出 info 级别的诊断
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    match cli.command {
        Task::CheckAll => {
            eprintln!("\n==> cargo fmt --all -- --check");
            cmd!(sh, "cargo fmt --all -- --check").run()?;

            eprintln!("\n==> cargo clippy --workspace --all-targets");
            cmd!(sh, "cargo clippy --workspace --all-targets").run()?;

            eprintln!("\n==> cargo test --workspace");
            cmd!(sh, "cargo test --workspace").run()?;
        }
        Task::CovRuntime => {
            if cmd!(sh, "cargo llvm-cov --version").quiet().run().is_err() {
                anyhow::bail!(
                    "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
                );
            }
            eprintln!("\n==> cargo llvm-cov -p dialogue-runtime --html");
            cmd!(sh, "cargo llvm-cov -p dialogue-runtime --html").run()?;
            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        Task::ScriptCheck {
            path,
            icons,
            verbose,
        } => {
            let mut config = ScriptCheckConfig::default();
            if let Some(icons) = icons {
                config.icons_dir = icons;
            }
            config.verbose = verbose;
            script_check(path.as_deref(), &config)?;
        }
    }

    Ok(())
}

//=============================================================================
// script-check 命令实现
//=============================================================================

/// 脚本检查配置
struct ScriptCheckConfig {
    /// 脚本目录（相对于 workspace root）
    scripts_dir: PathBuf,
    /// 图标目录（相对于 workspace root）
    icons_dir: PathBuf,
    /// 是否输出 info 级别
    verbose: bool,
}

impl Default for ScriptCheckConfig {
    fn default() -> Self {
        Self {
            scripts_dir: PathBuf::from("assets/scripts"),
            icons_dir: PathBuf::from("assets/icons"),
            verbose: false,
        }
    }
}

/// 脚本检查结果
#[derive(Default)]
struct ScriptCheckResult {
    /// 检查的脚本数量
    scripts_checked: usize,
    /// 读取失败的数量
    read_errors: usize,
    /// 诊断结果
    diagnostics: DiagnosticResult,
    /// 缺失的图标
    missing_icons: Vec<MissingIcon>,
}

/// 缺失的图标信息
struct MissingIcon {
    script_id: String,
    line: usize,
    id: String,
}

/// 执行脚本检查
fn script_check(path: Option<&Path>, config: &ScriptCheckConfig) -> anyhow::Result<()> {
    let files = match path {
        Some(path) if path.is_file() => vec![path.to_path_buf()],
        Some(path) if path.is_dir() => collect_script_files(path),
        Some(path) => anyhow::bail!("路径不存在: {}", path.display()),
        None => {
            if !config.scripts_dir.exists() {
                anyhow::bail!(
                    "默认脚本目录不存在: {}\n请在 workspace 根目录运行，或指定脚本路径",
                    config.scripts_dir.display()
                );
            }
            collect_script_files(&config.scripts_dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到脚本文件（.dlg / .txt）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个脚本文件...\n", files.len());

    let available_icons = collect_icon_ids(&config.icons_dir);
    let mut result = ScriptCheckResult::default();
    for file in &files {
        check_script_file(file, available_icons.as_ref(), &mut result);
    }

    print_check_result(&result, config.verbose);

    if result.read_errors > 0 || result.diagnostics.has_errors() {
        anyhow::bail!("脚本检查发现错误");
    }
    Ok(())
}

/// 收集目录下的所有脚本文件
fn collect_script_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, SCRIPT_EXTENSIONS))
        .collect();
    files.sort();
    files
}

/// 收集图标目录下的图标 id（文件名去掉扩展名）
///
/// 目录不存在时返回 `None`，跳过图标检查。
fn collect_icon_ids(dir: &Path) -> Option<BTreeSet<String>> {
    if !dir.is_dir() {
        return None;
    }
    let ids = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| has_extension(entry.path(), ICON_EXTENSIONS))
        .filter_map(|entry| {
            entry
                .path()
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .collect();
    Some(ids)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// 检查单个脚本文件
fn check_script_file(
    file: &Path,
    available_icons: Option<&BTreeSet<String>>,
    result: &mut ScriptCheckResult,
) {
    let script_id = file.display().to_string();
    result.scripts_checked += 1;

    let content = match std::fs::read_to_string(file) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("[ERROR] {}: 无法读取文件 - {}", script_id, e);
            result.read_errors += 1;
            return;
        }
    };

    result.diagnostics.merge(analyze_script(&script_id, &content));

    let Some(available_icons) = available_icons else {
        return;
    };
    for reference in extract_resource_references(&content) {
        if reference.resource_type == ResourceType::Icon
            && !available_icons.contains(&reference.id)
        {
            result.missing_icons.push(MissingIcon {
                script_id: script_id.clone(),
                line: reference.line,
                id: reference.id,
            });
        }
    }
}

/// 输出检查结果
fn print_check_result(result: &ScriptCheckResult, verbose: bool) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!("检查完成: {} 个脚本", result.scripts_checked);
    eprintln!();

    let min_level = if verbose {
        DiagnosticLevel::Info
    } else {
        DiagnosticLevel::Warn
    };
    for diag in result.diagnostics.filter_by_level(min_level) {
        eprintln!("{}", diag);
    }

    for missing in &result.missing_icons {
        eprintln!(
            "[WARN] {}:{}: 图标不存在 {}",
            missing.script_id, missing.line, missing.id
        );
    }

    let error_count = result.read_errors + result.diagnostics.error_count();
    let warn_count = result.diagnostics.warn_count() + result.missing_icons.len();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {} 个错误, {} 个警告", error_count, warn_count);
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", warn_count);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
