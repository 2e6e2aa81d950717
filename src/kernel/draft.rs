//! 单文档模式的草稿自动保存
//!
//! 每次编辑调用 `schedule`：取消上一次未触发的写入，等待静默期后在阻塞线程里写入存储。
//! 保存状态通过 `watch` 通道对外广播。

use crate::kernel::services::ports::storage::{self, KeyValueStorage};
use crate::kernel::workspace_store::{system_clock, Clock};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub const DRAFT_KEY: &str = "markdown-draft";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl SaveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SaveStatus::Idle => "idle",
            SaveStatus::Saving => "saving",
            SaveStatus::Saved => "saved",
            SaveStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub content: String,
    #[serde(default)]
    pub saved_at: u64,
}

#[derive(Clone)]
pub struct DraftStore {
    storage: Arc<dyn KeyValueStorage>,
    clock: Clock,
}

impl DraftStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_clock(storage, Arc::new(system_clock))
    }

    pub fn with_clock(storage: Arc<dyn KeyValueStorage>, clock: Clock) -> Self {
        Self { storage, clock }
    }

    /// 损坏的草稿视为不存在
    pub fn load(&self) -> Option<Draft> {
        match storage::load_json(self.storage.as_ref(), DRAFT_KEY) {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!(key = DRAFT_KEY, error = %e, "ignoring unreadable draft");
                None
            }
        }
    }

    pub fn save(&self, content: &str) -> storage::Result<Draft> {
        let draft = Draft {
            content: content.to_string(),
            saved_at: (self.clock)(),
        };
        storage::save_json(self.storage.as_ref(), DRAFT_KEY, &draft)?;
        Ok(draft)
    }

    pub fn clear(&self) -> storage::Result<()> {
        self.storage.remove(DRAFT_KEY)
    }
}

#[derive(Default)]
struct Pending {
    generation: u64,
    text: Option<String>,
}

struct Shared {
    pending: Mutex<Pending>,
    /// 同一时刻只有一个写入在进行
    write_lock: Mutex<()>,
    status: watch::Sender<SaveStatus>,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.pending().generation == generation
    }
}

pub struct DraftAutosave {
    store: DraftStore,
    runtime: tokio::runtime::Handle,
    delay: Duration,
    shared: Arc<Shared>,
    task: Option<JoinHandle<()>>,
}

impl DraftAutosave {
    pub fn new(store: DraftStore, runtime: tokio::runtime::Handle, delay: Duration) -> Self {
        let (status, _) = watch::channel(SaveStatus::Idle);
        Self {
            store,
            runtime,
            delay,
            shared: Arc::new(Shared {
                pending: Mutex::new(Pending::default()),
                write_lock: Mutex::new(()),
                status,
            }),
            task: None,
        }
    }

    pub fn store(&self) -> &DraftStore {
        &self.store
    }

    pub fn status(&self) -> SaveStatus {
        *self.shared.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.shared.status.subscribe()
    }

    /// 合并静默期内的连续编辑，只写最后一次的文本
    pub fn schedule(&mut self, text: impl Into<String>) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let generation = {
            let mut pending = self.shared.pending();
            pending.generation += 1;
            pending.text = Some(text.into());
            self.shared.status.send_replace(SaveStatus::Saving);
            pending.generation
        };

        let shared = self.shared.clone();
        let store = self.store.clone();
        let delay = self.delay;

        self.task = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;

            let text = {
                let mut pending = shared.pending();
                if pending.generation != generation {
                    return;
                }
                match pending.text.take() {
                    Some(text) => text,
                    None => return,
                }
            };

            let writer = shared.clone();
            let result = tokio::task::spawn_blocking(move || {
                let _write = writer.write_lock();
                // 等锁期间被 flush 或新的编辑取代时不再写入旧文本
                if !writer.is_current(generation) {
                    return None;
                }
                Some(store.save(&text))
            })
            .await;
            let status = match result {
                Ok(None) => return,
                Ok(Some(Ok(draft))) => {
                    tracing::debug!(bytes = draft.content.len(), "draft saved");
                    SaveStatus::Saved
                }
                Ok(Some(Err(e))) => {
                    tracing::warn!(key = DRAFT_KEY, error = %e, "failed to save draft");
                    SaveStatus::Error
                }
                Err(e) => {
                    tracing::warn!(key = DRAFT_KEY, error = %e, "draft save task failed");
                    SaveStatus::Error
                }
            };

            if shared.is_current(generation) {
                shared.status.send_replace(status);
            }
        }));
    }

    /// 立即写入尚未保存的文本，返回前等待正在进行的后台写入结束
    pub fn flush(&mut self) -> storage::Result<()> {
        // 文本已被后台任务取走时由该任务负责更新状态
        let text = {
            let mut pending = self.shared.pending();
            let Some(text) = pending.text.take() else {
                drop(pending);
                drop(self.shared.write_lock());
                return Ok(());
            };
            pending.generation += 1;
            text
        };
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let _write = self.shared.write_lock();
        match self.store.save(&text) {
            Ok(_) => {
                self.shared.status.send_replace(SaveStatus::Saved);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(key = DRAFT_KEY, error = %e, "failed to flush draft");
                self.shared.status.send_replace(SaveStatus::Error);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/draft.rs"]
mod tests;
