use crate::clock::DeltaTimer;
use crate::engine::{Engine, StepEvents};
use crate::model::{Controls, World};
use crate::render::Renderer;
use crate::scheduler::{FrameHandle, FrameScheduler};
use crate::surface::Surface;

/// Lifecycle of the animation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

/// Owns the world and drives it one frame at a time.
///
/// While running, exactly one frame request is outstanding; it is cancelled
/// whenever the loop stops and when the controller is dropped.
pub struct LoopController<S: FrameScheduler> {
    engine: Engine,
    renderer: Renderer,
    world: World,
    controls: Controls,
    phase: Phase,
    timer: DeltaTimer,
    scheduler: S,
    pending: Option<FrameHandle>,
}

impl<S: FrameScheduler> LoopController<S> {
    pub fn new(engine: Engine, scheduler: S) -> Self {
        let cfg = engine.cfg();
        let world = World::from_config(cfg);
        let renderer = Renderer::new(cfg.layout.clone());
        let timer = DeltaTimer::new(cfg.growth.max_dt);
        Self {
            engine,
            renderer,
            world,
            controls: Controls::default(),
            phase: Phase::Idle,
            timer,
            scheduler,
            pending: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Paint the current world without advancing it.
    pub fn present<D: Surface + ?Sized>(&self, surface: &mut D) {
        self.renderer.render(&self.world, &self.controls, surface);
    }

    /// Enter the running phase and request the first frame.
    pub fn start(&mut self, now: f64) {
        if self.phase == Phase::Running {
            return;
        }
        log::info!("starting at {now:.3}s from {:?}", self.phase);
        self.phase = Phase::Running;
        self.controls.running = true;
        self.timer.restart(now);
        self.schedule();
    }

    /// Pause the loop and leave the last frame visible.
    pub fn stop<D: Surface + ?Sized>(&mut self, surface: &mut D) {
        if self.phase != Phase::Running {
            return;
        }
        self.cancel_pending();
        self.phase = Phase::Paused;
        self.controls.running = false;
        log::info!("paused after {} ticks", self.world.ticks);
        self.present(surface);
    }

    pub fn toggle_running<D: Surface + ?Sized>(&mut self, now: f64, surface: &mut D) {
        match self.phase {
            Phase::Running => self.stop(surface),
            Phase::Idle | Phase::Paused => self.start(now),
        }
    }

    /// Reinitialize the world. The running phase is left unchanged.
    pub fn reset<D: Surface + ?Sized>(&mut self, surface: &mut D) {
        self.world = World::from_config(self.engine.cfg());
        self.controls.reset_epoch += 1;
        log::info!("reset (epoch {})", self.controls.reset_epoch);
        if self.phase != Phase::Running {
            self.present(surface);
        }
    }

    /// Change the speed; out-of-range values are clamped.
    pub fn set_speed(&mut self, speed_kph: i64) {
        self.controls.set_speed_kph(speed_kph);
        log::debug!("speed set to {} km/h", self.controls.speed_kph());
    }

    /// Switch swim mode. A frozen frame is repainted so the river shows up.
    pub fn set_swim<D: Surface + ?Sized>(&mut self, swim: bool, surface: &mut D) {
        self.controls.swim = swim;
        log::debug!("swim mode {}", if swim { "on" } else { "off" });
        if self.phase != Phase::Running {
            self.present(surface);
        }
    }

    /// Handle a delivered frame callback.
    ///
    /// Steps and renders the world once, then requests the next frame if the
    /// loop is still running. Stale or cancelled handles are ignored.
    pub fn on_frame<D: Surface + ?Sized>(
        &mut self,
        handle: FrameHandle,
        now: f64,
        surface: &mut D,
    ) -> Option<StepEvents> {
        if self.pending != Some(handle) {
            log::debug!("ignoring stale frame {handle:?}");
            return None;
        }
        self.pending = None;
        if self.phase != Phase::Running {
            return None;
        }

        let dt = self.timer.tick(now);
        let controls = self.controls.clone();
        let events = self.engine.step(&mut self.world, dt, &controls);
        self.renderer.render(&self.world, &controls, surface);

        if events.dropped || events.sprouted > 0 {
            log::debug!(
                "tick {}: dropped {}, sprouted {}, seeds {}, plants {}",
                self.world.ticks,
                events.dropped,
                events.sprouted,
                self.world.seeds.len(),
                self.world.plants.len()
            );
        }

        if self.phase == Phase::Running {
            self.schedule();
        }
        Some(events)
    }

    fn schedule(&mut self) {
        self.cancel_pending();
        self.pending = Some(self.scheduler.request_frame());
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }
}

impl<S: FrameScheduler> Drop for LoopController<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
