use gpui::{AppContext, Entity};
use keygate_bridge::session::{LoginPrompt, SessionPhase};

/// What the frontend knows about the backend session.
#[derive(Debug, Clone, Default)]
pub struct SessionEntity {
    pub phase: SessionPhase,
    /// Pending device login, shown until the session leaves `Authenticating`.
    pub prompt: Option<LoginPrompt>,
}

impl SessionEntity {
    pub fn set_phase<C: AppContext>(entity: &Entity<Self>, phase: SessionPhase, cx: &mut C) {
        let _ = entity.update(cx, |this, cx| {
            this.phase = phase;
            if phase != SessionPhase::Authenticating {
                this.prompt = None;
            }
            cx.notify();
        });
    }

    pub fn set_prompt<C: AppContext>(entity: &Entity<Self>, prompt: LoginPrompt, cx: &mut C) {
        let _ = entity.update(cx, |this, cx| {
            this.prompt = Some(prompt);
            cx.notify();
        });
    }

    pub fn reset<C: AppContext>(entity: &Entity<Self>, cx: &mut C) {
        let _ = entity.update(cx, |this, cx| {
            *this = Self::default();
            cx.notify();
        });
    }
}
