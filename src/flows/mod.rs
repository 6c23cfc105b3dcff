pub mod state_selection;
pub mod relationship;

use serde::{Serialize, Deserialize};

/// Reason carried by `dismiss` when the user cancels a flow.
pub const CANCEL_REASON: &str = "cancel";

/// 对话框接口
/// Flow 通过此接口通知宿主结束对话框
pub trait ModalInstance<T>: Send {
    /// 以结果关闭
    fn close(&mut self, result: T);

    /// 放弃 (不产生结果)
    fn dismiss(&mut self, reason: &str);
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogOutcome<T> {
    Closed(T),
    Dismissed(String),
}

/// Modal that keeps the first terminal signal it receives.
#[derive(Debug)]
pub struct OutcomeSlot<T> {
    outcome: Option<DialogOutcome<T>>,
}

impl<T> OutcomeSlot<T> {
    pub fn new() -> Self {
        Self { outcome: None }
    }

    pub fn outcome(&self) -> Option<&DialogOutcome<T>> {
        self.outcome.as_ref()
    }

    pub fn take(&mut self) -> Option<DialogOutcome<T>> {
        self.outcome.take()
    }
}

impl<T> Default for OutcomeSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> ModalInstance<T> for OutcomeSlot<T> {
    fn close(&mut self, result: T) {
        if self.outcome.is_none() {
            self.outcome = Some(DialogOutcome::Closed(result));
        }
    }

    fn dismiss(&mut self, reason: &str) {
        if self.outcome.is_none() {
            self.outcome = Some(DialogOutcome::Dismissed(reason.to_string()));
        }
    }
}
