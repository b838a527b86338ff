//! User-facing outcome messages (toasts and banners).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Notices in the order they were raised, until the view drains them.
#[derive(Debug, Default)]
pub struct NoticeLog {
    entries: Vec<Notice>,
}

impl NoticeLog {
    pub fn success(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(%message, "notice");
        self.entries.push(Notice {
            level: NoticeLevel::Success,
            message,
        });
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "notice");
        self.entries.push(Notice {
            level: NoticeLevel::Error,
            message,
        });
    }

    #[must_use]
    pub fn last(&self) -> Option<&Notice> {
        self.entries.last()
    }

    #[must_use]
    pub fn entries(&self) -> &[Notice] {
        &self.entries
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.entries)
    }
}
