//! Typing start/stop listener.

use chrono::Duration;
use palaver_core::{ChatError, ChatResult, Cid};

use crate::listener::ListenerContext;

/// Minimum gap between two typing-start events on one channel.
const TYPING_COOLDOWN_MS: i64 = 3000;

/// Listener for the typing start/stop protocol.
///
/// Typing events are fire-and-forget: the result phase only logs. The
/// interesting state is the precondition side: a start inside the
/// cooldown window is rejected, and a stop without an outstanding start
/// is rejected, both before any network traffic.
pub(crate) struct TypingListener {
    ctx: ListenerContext,
}

impl TypingListener {
    pub(crate) fn new(ctx: ListenerContext) -> Self {
        Self { ctx }
    }

    /// An untracked channel passes: the default config allows typing and
    /// no cooldown stamp exists yet. Prechecks never create containers.
    pub(crate) fn precheck_start(&self, cid: &Cid) -> ChatResult<()> {
        self.ctx.current_user()?;
        let Some(channel) = self.ctx.registry.active_channel(cid) else {
            return Ok(());
        };
        if !channel.config().typing_events {
            return Err(ChatError::validation("typing events are disabled for this channel"));
        }
        if let Some(last) = channel.last_typing_start() {
            let elapsed = self.ctx.now() - last;
            if elapsed < Duration::milliseconds(TYPING_COOLDOWN_MS) {
                return Err(ChatError::validation(
                    "typing start already sent inside the cooldown window",
                ));
            }
        }
        Ok(())
    }

    pub(crate) fn on_start_request(&self, cid: &Cid) {
        self.ctx.registry.channel_by_cid(cid).set_last_typing_start(Some(self.ctx.now()));
    }

    pub(crate) fn precheck_stop(&self, cid: &Cid) -> ChatResult<()> {
        self.ctx.current_user()?;
        let Some(channel) = self.ctx.registry.active_channel(cid) else {
            return Err(ChatError::validation("typing stop without a preceding start"));
        };
        if !channel.config().typing_events {
            return Err(ChatError::validation("typing events are disabled for this channel"));
        }
        if channel.last_typing_start().is_none() {
            return Err(ChatError::validation("typing stop without a preceding start"));
        }
        Ok(())
    }

    pub(crate) fn on_stop_request(&self, cid: &Cid) {
        if let Some(channel) = self.ctx.registry.active_channel(cid) {
            channel.set_last_typing_start(None);
        }
    }

    pub(crate) fn on_result(&self, cid: &Cid, result: &ChatResult<()>) {
        if let Err(error) = result {
            tracing::debug!(%cid, %error, "typing event not delivered");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::listener::test_support::online_context;

    fn cid() -> Cid {
        Cid::new("messaging", "general")
    }

    #[test]
    fn second_start_inside_cooldown_is_rejected() {
        let (ctx, clock) = online_context();
        let listener = TypingListener::new(ctx);

        assert!(listener.precheck_start(&cid()).is_ok());
        listener.on_start_request(&cid());

        clock.advance_millis(1000);
        assert!(matches!(
            listener.precheck_start(&cid()),
            Err(ChatError::Validation(_))
        ));

        clock.advance_millis(2001);
        assert!(listener.precheck_start(&cid()).is_ok());
    }

    #[test]
    fn stop_requires_outstanding_start() {
        let (ctx, _) = online_context();
        let listener = TypingListener::new(ctx);

        assert!(listener.precheck_stop(&cid()).is_err());

        listener.on_start_request(&cid());
        assert!(listener.precheck_stop(&cid()).is_ok());
        listener.on_stop_request(&cid());

        // Stop cleared the stamp, so the cooldown no longer applies.
        assert!(listener.precheck_start(&cid()).is_ok());
        assert!(listener.precheck_stop(&cid()).is_err());
    }

    #[test]
    fn failed_precheck_creates_no_channel_container() {
        let (ctx, _) = online_context();
        let registry = ctx.registry.clone();
        let listener = TypingListener::new(ctx);

        assert!(listener.precheck_stop(&cid()).is_err());
        assert!(registry.channels().is_empty());

        // A passing precheck on an untracked channel stays hands-off too.
        assert!(listener.precheck_start(&cid()).is_ok());
        assert!(registry.channels().is_empty());
    }

    #[test]
    fn disabled_channel_rejects_typing() {
        let (ctx, _) = online_context();
        let registry = ctx.registry.clone();
        let listener = TypingListener::new(ctx);

        let channel = registry.channel_by_cid(&cid());
        channel.set_config(palaver_core::ChannelConfig {
            typing_events: false,
            read_events: true,
        });

        assert!(listener.precheck_start(&cid()).is_err());
        assert!(listener.precheck_stop(&cid()).is_err());
    }
}
