// テスト用の表示層・画面遷移の記録

use crate::shared::navigation::{Navigator, Route};
use crate::shared::presentation::{ModalContent, Presenter};
use std::sync::Mutex;

/// 表示層への指示を記録する
#[derive(Debug, Default)]
pub(crate) struct RecordingPresenter {
    pub alerts: Mutex<Vec<String>>,
    pub modals: Mutex<Vec<ModalContent>>,
    pub panel: Mutex<Vec<bool>>,
    pub cleared_inputs: Mutex<usize>,
}

impl RecordingPresenter {
    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }

    pub fn modals(&self) -> Vec<ModalContent> {
        self.modals.lock().unwrap().clone()
    }

    pub fn panel_states(&self) -> Vec<bool> {
        self.panel.lock().unwrap().clone()
    }

    pub fn cleared_inputs(&self) -> usize {
        *self.cleared_inputs.lock().unwrap()
    }
}

impl Presenter for RecordingPresenter {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    fn show_modal(&self, content: ModalContent) {
        self.modals.lock().unwrap().push(content);
    }

    fn set_panel_expanded(&self, expanded: bool) {
        self.panel.lock().unwrap().push(expanded);
    }

    fn clear_file_input(&self) {
        *self.cleared_inputs.lock().unwrap() += 1;
    }
}

/// 画面遷移を記録する
#[derive(Debug, Default)]
pub(crate) struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn on_navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}
