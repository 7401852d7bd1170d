use anyhow::Result;
use serde::Serialize;

use rmnode::utils::{format_relative_time, format_size};
use rmnode::{DeleteMode, DeleteResult, ScanResult};

#[derive(Serialize)]
struct JsonReport<'a> {
    scan: &'a ScanResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    cleanup: Option<&'a [DeleteResult]>,
}

/// 以 JSON 输出扫描和删除结果
pub fn print_json(result: &ScanResult, cleanup: Option<&[DeleteResult]>) -> Result<()> {
    let report = JsonReport { scan: result, cleanup };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// 以表格输出扫描结果
pub fn print_table(result: &ScanResult) {
    if result.items.is_empty() {
        println!("在 {} 下没有找到 node_modules", result.root_path.display());
    } else {
        println!("{:>12}  {:<12}  {:<20}  {}", "大小", "修改时间", "项目", "路径");
        for item in &result.items {
            println!(
                "{:>12}  {:<12}  {:<20}  {}",
                item.display_size,
                format_relative_time(item.last_modified),
                truncate(&item.name, 20),
                item.path.display()
            );
        }
    }

    println!();
    println!(
        "共 {} 个目录，合计 {}，耗时 {}",
        result.count,
        format_size(result.total_size),
        result.scan_duration_display()
    );
    if result.pending_sizes > 0 {
        println!("{} 个目录的大小尚未计算完成", result.pending_sizes);
    }
    if !result.errors.is_empty() {
        println!("{} 个目录无法访问（使用 -v 查看详情）", result.errors.len());
    }
    if result.cancelled {
        println!("扫描已取消，结果不完整");
    }
}

/// 输出删除结果
pub fn print_cleanup(results: &[DeleteResult], mode: DeleteMode) {
    let done = match mode {
        DeleteMode::DryRun => "将删除",
        DeleteMode::Remove => "已删除",
        DeleteMode::Trash => "已移到回收站",
    };
    for result in results {
        match &result.error {
            None => println!("{}  {}", done, result.path.display()),
            Some(error) => println!("失败  {}: {}", result.path.display(), error),
        }
    }

    let freed = rmnode::operations::total_freed(results);
    if mode == DeleteMode::DryRun {
        println!("预计可释放 {}", format_size(freed));
    } else {
        println!("已释放 {}", format_size(freed));
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
