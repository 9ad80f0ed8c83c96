use gpui::{App, AppContext, Entity};
use keygate_bridge::{ResourceResponse, fragment::Fragment};

use crate::view_controller::ViewController;

#[derive(Debug, Default)]
pub struct ViewEntity {
    pub controller: ViewController,
}

impl ViewEntity {
    pub fn install<C: AppContext>(entity: &Entity<Self>, fragment: Fragment, cx: &mut C) {
        let _ = entity.update(cx, |this, cx| {
            this.controller.setup(fragment);
            cx.notify();
        });
    }

    /// Renders a backend response. Returns the error message when a failed
    /// fetch was committed, so the caller can surface it.
    pub fn commit(
        entity: &Entity<Self>,
        response: ResourceResponse,
        cx: &mut App,
    ) -> Option<String> {
        let error = response.result.as_ref().err().cloned();
        let ResourceResponse {
            pane,
            request_id,
            result,
        } = response;
        let committed = entity.update(cx, |this, cx| {
            let committed = this.controller.commit_response(&pane, request_id, result);
            if committed {
                cx.notify();
            }
            committed
        });
        error.filter(|_| committed)
    }

    pub fn reset<C: AppContext>(entity: &Entity<Self>, cx: &mut C) {
        let _ = entity.update(cx, |this, cx| {
            this.controller.reset();
            cx.notify();
        });
    }
}
