//! User-facing confirmation and failure messages.

use mindcanvas_core::{EditError, ExportFormat, LayoutMode};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Info,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            kind: NoticeKind::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }

    pub(crate) fn node_added() -> Self {
        Self::info("节点已添加", "新节点已成功添加到思维导图中。")
    }

    pub(crate) fn node_updated() -> Self {
        Self::info("节点已更新", "节点内容已成功更新。")
    }

    pub(crate) fn root_protected() -> Self {
        Self::error("无法删除根节点", "根节点不能被删除。")
    }

    /// Error notice for a refused edit.
    pub(crate) fn rejected(err: &EditError) -> Self {
        match err {
            EditError::RootProtected(_) => Self::root_protected(),
            EditError::UnknownNode(id) => Self::error("操作失败", format!("找不到节点“{id}”。")),
            EditError::DuplicateId(id) => {
                Self::error("操作失败", format!("节点 ID“{id}”已存在。"))
            }
        }
    }

    pub(crate) fn node_deleted(count: usize) -> Self {
        Self::info("节点已删除", format!("已删除节点及其子节点（共 {count} 个）。"))
    }

    pub(crate) fn layout_changed(mode: LayoutMode) -> Self {
        Self::info(
            "布局已更新",
            format!("思维导图布局已更改为{}。", mode.display_name()),
        )
    }

    pub(crate) fn export_succeeded(format: ExportFormat) -> Self {
        Self::info("导出成功", format!("思维导图已导出为{}格式。", format.label()))
    }

    pub(crate) fn export_failed(format: ExportFormat) -> Self {
        Self::error("导出失败", format!("导出{}格式时发生错误。", format.label()))
    }

    pub(crate) fn surface_missing() -> Self {
        Self::error("下载失败", "无法找到思维导图画布。")
    }

    pub(crate) fn export_in_flight() -> Self {
        Self::error("导出进行中", "请等待当前导出完成后再试。")
    }
}

/// Shared notice queue. Pending exports hold a handle so they can report after the engine call
/// that started them has returned.
#[derive(Debug, Clone, Default)]
pub struct NoticeLog(Rc<RefCell<Vec<Notice>>>);

impl NoticeLog {
    pub fn push(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info => tracing::info!(title = %notice.title, "{}", notice.description),
            NoticeKind::Error => tracing::warn!(title = %notice.title, "{}", notice.description),
        }
        self.0.borrow_mut().push(notice);
    }

    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_notice_reports_count() {
        assert_eq!(
            Notice::node_deleted(4).description,
            "已删除节点及其子节点（共 4 个）。"
        );
    }

    #[test]
    fn rejected_edits_map_to_error_notices() {
        assert_eq!(
            Notice::rejected(&EditError::RootProtected("root".into())),
            Notice::root_protected()
        );
        let missing = Notice::rejected(&EditError::UnknownNode("ghost".into()));
        assert!(missing.is_error());
        assert_eq!(missing.description, "找不到节点“ghost”。");
    }

    #[test]
    fn layout_notice_uses_display_name() {
        assert_eq!(
            Notice::layout_changed(LayoutMode::Fishbone).description,
            "思维导图布局已更改为鱼骨图。"
        );
    }

    #[test]
    fn log_is_shared_between_handles() {
        let log = NoticeLog::default();
        let other = log.clone();
        other.push(Notice::node_added());
        assert_eq!(log.len(), 1);
        assert_eq!(log.drain()[0].title, "节点已添加");
        assert!(other.is_empty());
    }
}
