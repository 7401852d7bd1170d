use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use chrono::{DateTime, Utc};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::models::{ScanError, TargetDirectory};
use crate::scanner::{PathClassifier, SizeEstimator};

pub type ItemCallback = Arc<dyn Fn(TargetDirectory) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(ScanError) + Send + Sync>;

/// 共享的待遍历队列
///
/// `busy` 记录正在处理目录的 worker 数量。队列为空且 `busy` 为 0 时，
/// 不会再有新目录加入，遍历结束。
#[derive(Debug, Default)]
struct WorkQueue {
    pending: VecDeque<PathBuf>,
    busy: usize,
}

enum NextJob {
    Work(PathBuf),
    Wait,
    Done,
}

impl WorkQueue {
    fn next_job(&mut self) -> NextJob {
        if let Some(dir) = self.pending.pop_front() {
            self.busy += 1;
            NextJob::Work(dir)
        } else if self.busy == 0 {
            NextJob::Done
        } else {
            NextJob::Wait
        }
    }

    /// 子目录入队与退出忙碌状态必须在同一次加锁中完成
    fn complete(&mut self, children: Vec<PathBuf>) {
        self.pending.extend(children);
        self.busy -= 1;
    }
}

/// 处理目录期间持有，离开作用域时（包括 panic 展开）退出忙碌状态
struct BusyGuard<'a> {
    queue: &'a Mutex<WorkQueue>,
    children: Vec<PathBuf>,
}

impl<'a> BusyGuard<'a> {
    fn new(queue: &'a Mutex<WorkQueue>) -> Self {
        Self {
            queue,
            children: Vec::new(),
        }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        lock(self.queue).complete(std::mem::take(&mut self.children));
    }
}

/// 一次扫描中所有 worker 和后台任务共享的状态
pub(crate) struct ScanContext {
    classifier: PathClassifier,
    estimator: SizeEstimator,
    queue: Mutex<WorkQueue>,
    /// 已登记的目标目录（去重集合）
    registered: Mutex<HashSet<PathBuf>>,
    /// 跟随符号链接时已访问目录的真实路径
    visited: Mutex<HashSet<PathBuf>>,
    items: Mutex<HashMap<PathBuf, TargetDirectory>>,
    errors: Mutex<Vec<ScanError>>,
    tracker: TaskTracker,
    cancel: CancellationToken,
    on_item_found: ItemCallback,
    on_error: ErrorCallback,
    idle_backoff: Duration,
    follow_symlinks: bool,
}

/// 加锁，忽略锁中毒（持锁期间不会执行可能 panic 的回调）
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScanContext {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        root: PathBuf,
        classifier: PathClassifier,
        estimator: SizeEstimator,
        cancel: CancellationToken,
        on_item_found: ItemCallback,
        on_error: ErrorCallback,
        idle_backoff: Duration,
        follow_symlinks: bool,
    ) -> Self {
        Self {
            classifier,
            estimator,
            queue: Mutex::new(WorkQueue {
                pending: VecDeque::from([root]),
                busy: 0,
            }),
            registered: Mutex::new(HashSet::new()),
            visited: Mutex::new(HashSet::new()),
            items: Mutex::new(HashMap::new()),
            errors: Mutex::new(Vec::new()),
            tracker: TaskTracker::new(),
            cancel,
            on_item_found,
            on_error,
            idle_backoff,
            follow_symlinks,
        }
    }

    pub(crate) fn tracker(&self) -> &TaskTracker {
        &self.tracker
    }

    /// 取出当前已提交的目录和错误
    pub(crate) fn snapshot(&self) -> (Vec<TargetDirectory>, Vec<ScanError>) {
        let items = lock(&self.items).values().cloned().collect();
        let errors = lock(&self.errors).clone();
        (items, errors)
    }

    /// 提交（或替换）一条记录，取消后不再修改结果
    ///
    /// 取消检查在持锁期间进行，保证取消后的快照不会再被修改。
    fn commit(&self, item: TargetDirectory) -> bool {
        let mut items = lock(&self.items);
        if self.cancel.is_cancelled() {
            return false;
        }
        items.insert(item.id.clone(), item);
        true
    }

    fn emit_item(&self, item: TargetDirectory) {
        if !self.cancel.is_cancelled() {
            (self.on_item_found)(item);
        }
    }

    /// 记录目录无法列出的错误
    ///
    /// 只有权限和不存在两类错误会上报，其它错误仅写入日志。
    fn record_listing_error(&self, path: &Path, err: &io::Error) {
        if !matches!(
            err.kind(),
            io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound
        ) {
            tracing::debug!("忽略目录错误 {}: {}", path.display(), err);
            return;
        }

        if self.cancel.is_cancelled() {
            return;
        }

        let scan_error = ScanError::new(path, err.to_string());
        tracing::debug!("无法读取目录: {}", scan_error);
        lock(&self.errors).push(scan_error.clone());
        (self.on_error)(scan_error);
    }
}

/// worker 主循环：不断从共享队列取目录处理，直到队列为空且没有 worker 在忙
pub(crate) async fn run_worker(ctx: Arc<ScanContext>) {
    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }

        let job = lock(&ctx.queue).next_job();
        match job {
            NextJob::Work(dir) => {
                // 回调 panic 时 worker 会退出，守卫保证 busy 计数仍然归还
                let mut guard = BusyGuard::new(&ctx.queue);
                guard.children = process_directory(&ctx, &dir).await;
            }
            NextJob::Wait => tokio::time::sleep(ctx.idle_backoff).await,
            NextJob::Done => break,
        }
    }
}

/// 处理单个目录，返回需要继续遍历的子目录
async fn process_directory(ctx: &Arc<ScanContext>, dir: &Path) -> Vec<PathBuf> {
    let mut children = Vec::new();

    if ctx.follow_symlinks && !mark_visited(ctx, dir).await {
        return children;
    }

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            ctx.record_listing_error(dir, &e);
            return children;
        }
    };

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                ctx.record_listing_error(dir, &e);
                break;
            }
        };

        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();
        if ctx.classifier.should_skip(&name) {
            continue;
        }

        if !is_directory(ctx, &entry).await {
            continue;
        }

        let path = entry.path();
        if ctx.classifier.is_target(&name) {
            register_target(ctx, path).await;
        } else {
            children.push(path);
        }
    }

    children
}

/// 判断目录项是否是目录，符号链接只在开启跟随时才解析
async fn is_directory(ctx: &ScanContext, entry: &fs::DirEntry) -> bool {
    let file_type = match entry.file_type().await {
        Ok(file_type) => file_type,
        Err(_) => return false,
    };

    if file_type.is_dir() {
        return true;
    }

    if file_type.is_symlink() && ctx.follow_symlinks {
        return fs::metadata(entry.path())
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
    }

    false
}

/// 以真实路径记录已访问目录，返回 false 表示已经访问过（符号链接环）
async fn mark_visited(ctx: &ScanContext, dir: &Path) -> bool {
    let real_path = match fs::canonicalize(dir).await {
        Ok(path) => path,
        Err(_) => return true,
    };
    lock(&ctx.visited).insert(real_path)
}

/// 登记新发现的目标目录：立即发送大小未知的记录，然后在后台计算大小
async fn register_target(ctx: &Arc<ScanContext>, path: PathBuf) {
    if ctx.classifier.is_nested_target(&path) {
        tracing::debug!("跳过嵌套目录: {}", path.display());
        return;
    }

    if !lock(&ctx.registered).insert(path.clone()) {
        return;
    }

    let metadata = match fs::metadata(&path).await {
        Ok(metadata) => metadata,
        Err(e) => {
            ctx.record_listing_error(&path, &e);
            return;
        }
    };
    let last_modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    let item = TargetDirectory::discovered(path, ctx.classifier.target_name(), last_modified);
    tracing::debug!("发现目录: {}", item.path.display());

    if !ctx.commit(item.clone()) {
        return;
    }
    ctx.emit_item(item.clone());
    spawn_size_estimation(ctx, item);
}

/// 启动后台大小计算，walker 不等待它完成
fn spawn_size_estimation(ctx: &Arc<ScanContext>, item: TargetDirectory) {
    let task_ctx = Arc::clone(ctx);
    ctx.tracker.spawn(async move {
        let updated = match task_ctx.estimator.estimate(&item.path, &task_ctx.cancel).await {
            Ok(size) => item.with_size(size),
            Err(e) => {
                tracing::debug!("大小计算失败 {}: {:#}", item.path.display(), e);
                item.with_unknown_size()
            }
        };

        if task_ctx.commit(updated.clone()) {
            task_ctx.emit_item(updated);
        }
    });
}
