//! Presenter that narrates presentation calls through `tracing`.

use glam::Vec2;
use hostage_rescue_core::{ActorId, ActorKind, EndCause};
use hostage_rescue_presentation::{Presenter, SortingLayer, Visual};
use tracing::{debug, info};

/// Headless presenter used by the command-line driver.
#[derive(Debug, Default)]
pub(crate) struct TracingPresenter {
    visuals: usize,
    ammo: Option<u32>,
    game_over: Option<EndCause>,
}

impl TracingPresenter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Visuals registered since the last restart.
    pub(crate) fn visuals(&self) -> usize {
        self.visuals
    }

    /// Last ammunition count shown.
    pub(crate) fn ammo(&self) -> Option<u32> {
        self.ammo
    }

    /// Cause shown on the game over screen, if the round ended.
    pub(crate) fn game_over(&self) -> Option<EndCause> {
        self.game_over
    }
}

impl Presenter for TracingPresenter {
    fn set_layer_visual(&mut self, visual: Visual, layer: SortingLayer) {
        self.visuals += 1;
        if matches!(visual, Visual::Actor { .. } | Visual::Memorial { .. }) {
            debug!(?visual, ?layer, "visual placed");
        }
    }

    fn play_death_sequence(&mut self, actor: ActorId, kind: ActorKind) {
        debug!(?actor, ?kind, "death sequence");
    }

    fn play_rescue_fade_sequence(&mut self, actor: ActorId, destination: Vec2) {
        info!(?actor, x = destination.x, y = destination.y, "hostage freed");
    }

    fn update_ammo_display(&mut self, remaining: u32) {
        self.ammo = Some(remaining);
        debug!(remaining, "ammo");
    }

    fn update_game_over_cause(&mut self, cause: EndCause) {
        self.game_over = Some(cause);
    }

    fn pause(&mut self) {
        info!("paused");
    }

    fn resume(&mut self) {
        info!("resumed");
    }

    fn end_round(&mut self, cause: EndCause) {
        info!("{}", cause.message());
    }

    fn restart(&mut self) {
        *self = Self::default();
    }

    fn quit(&mut self) {
        info!("quitting");
    }
}
