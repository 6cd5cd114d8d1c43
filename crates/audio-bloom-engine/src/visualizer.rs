//! The engine instance and its frame loop.
//!
//! One [`Visualizer`] owns everything a running visualization needs: the
//! surface, the particle field, the fade controller and the frame scheduler.
//! The analysis feed is only borrowed through a weak reference. Nothing here
//! is shared across threads; the host drives the loop by calling
//! [`Visualizer::on_refresh`] on every display refresh.

use log::{debug, info, trace, warn};
use std::rc::{Rc, Weak};

use crate::feed::conform;
use crate::{
    band_averages_with, AnalysisFeed, BandLimits, Clock, EngineConfig, FadeController, FadeState,
    FrameHandle, FrameScheduler, ParticleField, Result, SampleStream, Surface, SystemClock,
    VizError, WaveformRenderer,
};

/// What a single frame callback ended up doing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Waveform and particles were drawn; the loop continues
    Rendered,
    /// The surface had no drawable extent; nothing was drawn, the loop continues
    Skipped,
    /// The fade-out finished; surface and particles were cleared and the loop ended
    FadeCompleted,
    /// No live feed while not fading; the loop ended without clearing
    FeedDetached,
}

pub struct Visualizer<S: Surface, C: Clock = SystemClock> {
    surface: S,
    clock: C,
    feed: Option<Weak<dyn AnalysisFeed>>,

    scheduler: FrameScheduler,
    /// Last callback this engine scheduled, for cancellation
    pending: Option<FrameHandle>,

    fade: FadeController,
    particles: ParticleField,
    waveform: WaveformRenderer,
    band_limits: BandLimits,

    // Feed read buffers (reused every frame)
    time_domain: Vec<u8>,
    frequency: Vec<u8>,

    // Set while a degraded-frame condition persists so it is logged once
    surface_reported: bool,
    malformed_reported: bool,
}

impl<S: Surface> Visualizer<S, SystemClock> {
    pub fn new(surface: S, config: &EngineConfig) -> Self {
        Self::with_clock(surface, SystemClock, config)
    }
}

impl<S: Surface, C: Clock> Visualizer<S, C> {
    pub fn with_clock(surface: S, clock: C, config: &EngineConfig) -> Self {
        Self::with_particles(
            surface,
            clock,
            config,
            ParticleField::new(config.particle_settings()),
        )
    }

    /// Use a caller-built particle field (e.g. seeded for reproducible output)
    pub fn with_particles(
        surface: S,
        clock: C,
        config: &EngineConfig,
        particles: ParticleField,
    ) -> Self {
        Self {
            surface,
            clock,
            feed: None,
            scheduler: FrameScheduler::new(),
            pending: None,
            fade: FadeController::new(config.fade_duration()),
            particles,
            waveform: config.waveform_renderer(),
            band_limits: config.band_limits(),
            time_domain: Vec::new(),
            frequency: Vec::new(),
            surface_reported: false,
            malformed_reported: false,
        }
    }

    /// Register the analysis source. Only a weak reference is kept; dropping
    /// the last `Rc` detaches it.
    pub fn attach_feed<F: AnalysisFeed + 'static>(&mut self, feed: &Rc<F>) {
        let weak: Weak<F> = Rc::downgrade(feed);
        self.feed = Some(weak);
        self.malformed_reported = false;
        debug!("Analysis feed attached");
    }

    pub fn detach_feed(&mut self) {
        self.feed = None;
    }

    pub fn has_feed(&self) -> bool {
        self.live_feed().is_some()
    }

    /// Begin the frame loop.
    ///
    /// Cancels any callback this engine still has scheduled and abandons a
    /// fade in flight, so at most one loop runs per engine.
    pub fn start(&mut self) -> Result<()> {
        if self.live_feed().is_none() {
            return Err(VizError::NoFeedAttached);
        }

        self.cancel_pending();
        self.fade.reset();
        self.pending = Some(self.scheduler.request_frame());
        info!("Visualizer started");
        Ok(())
    }

    /// Request a fade-out. Teardown happens on later frames; does nothing
    /// when the loop is not running.
    pub fn stop(&mut self) {
        if !self.is_running() {
            debug!("stop() ignored: visualizer not running");
            return;
        }
        if self.fade.is_fading() {
            return;
        }
        self.fade.request_stop(self.clock.now());
        info!("Visualizer fading out over {:?}", self.fade.duration());
    }

    /// Display refresh tick from the host. Runs the scheduled frame if there
    /// is one; returns `None` when the loop is not running.
    pub fn on_refresh(&mut self) -> Option<FrameOutcome> {
        let handle = self.scheduler.take_due()?;
        trace!("frame {:?}", handle);
        Some(self.run_frame())
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_pending()
    }

    pub fn fade_state(&self) -> FadeState {
        self.fade.state()
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// For the owner's layout changes (resize); the engine re-reads the
    /// extent at the start of each frame.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn run_frame(&mut self) -> FrameOutcome {
        // Re-schedule first so nothing below can end the loop by accident
        self.pending = Some(self.scheduler.request_frame());

        let now = self.clock.now();
        let (alpha, done) = self.fade.current_alpha(now);
        if done {
            self.surface.clear();
            self.particles.clear();
            self.cancel_pending();
            info!("Visualizer stopped");
            return FrameOutcome::FadeCompleted;
        }

        let fading = self.fade.is_fading();
        let feed = self.live_feed();
        if !fading && feed.is_none() {
            self.cancel_pending();
            info!("Analysis feed gone, visualizer idle");
            return FrameOutcome::FeedDetached;
        }

        let extent = self.surface.extent();
        if !extent.is_drawable() {
            if !self.surface_reported {
                warn!(
                    "{}; skipping draws",
                    VizError::SurfaceUnavailable {
                        width: extent.width,
                        height: extent.height,
                    }
                );
                self.surface_reported = true;
            }
            return FrameOutcome::Skipped;
        }
        self.surface_reported = false;

        self.surface.clear();

        if let Some(feed) = feed {
            feed.time_domain_samples(&mut self.time_domain);
            let expected = feed.expected_len(SampleStream::TimeDomain);
            let mut malformed = conform(&mut self.time_domain, expected, SampleStream::TimeDomain);

            self.waveform
                .render(&self.time_domain, extent, alpha, &mut self.surface);

            if !fading {
                feed.frequency_magnitudes(&mut self.frequency);
                let expected = feed.expected_len(SampleStream::Frequency);
                malformed =
                    malformed.or(conform(&mut self.frequency, expected, SampleStream::Frequency));

                let bands = band_averages_with(
                    &self.frequency,
                    feed.sample_rate(),
                    feed.transform_size(),
                    &self.band_limits,
                );
                let spawned = self.particles.spawn(&bands, extent, now);
                trace!("bands {:?}, spawned {}", bands, spawned);
            }

            self.report_malformed(malformed);
        }

        self.particles.age_and_render(now, alpha, &mut self.surface);
        FrameOutcome::Rendered
    }

    fn live_feed(&self) -> Option<Rc<dyn AnalysisFeed>> {
        self.feed.as_ref().and_then(|weak| weak.upgrade())
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
    }

    fn report_malformed(&mut self, malformed: Option<VizError>) {
        match malformed {
            Some(err) if !self.malformed_reported => {
                warn!("{}; clamping to available samples", err);
                self.malformed_reported = true;
            }
            Some(_) => {}
            None => self.malformed_reported = false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Canvas, ManualClock};
    use std::cell::RefCell;
    use std::time::Duration;

    struct ToneFeed {
        time: Vec<u8>,
        freq: RefCell<Vec<u8>>,
    }

    impl AnalysisFeed for ToneFeed {
        fn sample_rate(&self) -> f32 {
            8000.0
        }
        fn transform_size(&self) -> usize {
            16
        }
        fn time_domain_samples(&self, out: &mut Vec<u8>) {
            out.clone_from(&self.time);
        }
        fn frequency_magnitudes(&self, out: &mut Vec<u8>) {
            out.clone_from(&self.freq.borrow());
        }
    }

    fn loud_feed() -> Rc<ToneFeed> {
        Rc::new(ToneFeed {
            time: vec![128; 16],
            freq: RefCell::new(vec![240; 8]),
        })
    }

    fn engine(clock: &ManualClock) -> Visualizer<Canvas, ManualClock> {
        Visualizer::with_clock(Canvas::new(200.0, 100.0), clock.clone(), &EngineConfig::default())
    }

    #[test]
    fn test_start_without_feed_fails() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        assert_eq!(viz.start(), Err(VizError::NoFeedAttached));
        assert!(!viz.is_running());
    }

    #[test]
    fn test_start_with_dropped_feed_fails() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        viz.attach_feed(&loud_feed());
        assert_eq!(viz.start(), Err(VizError::NoFeedAttached));
    }

    #[test]
    fn test_no_refresh_before_start() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = loud_feed();
        viz.attach_feed(&feed);
        assert_eq!(viz.on_refresh(), None);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        viz.stop();
        assert_eq!(viz.fade_state(), FadeState::Idle);
    }

    #[test]
    fn test_frame_reschedules_itself() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = loud_feed();
        viz.attach_feed(&feed);
        viz.start().unwrap();

        for _ in 0..3 {
            assert_eq!(viz.on_refresh(), Some(FrameOutcome::Rendered));
            clock.advance(Duration::from_millis(16));
        }
        assert!(viz.is_running());
    }

    #[test]
    fn test_spawn_skipped_while_fading() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = loud_feed();
        viz.attach_feed(&feed);
        viz.start().unwrap();

        viz.on_refresh();
        let after_first = viz.particle_count();
        assert!(after_first > 0);

        viz.stop();
        clock.advance(Duration::from_millis(100));
        viz.on_refresh();
        assert_eq!(viz.particle_count(), after_first);
        // Residual particles are still drawn while fading
        assert_eq!(viz.surface().circle_count(), after_first);
    }

    #[test]
    fn test_detached_feed_ends_loop_without_clearing() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = loud_feed();
        viz.attach_feed(&feed);
        viz.start().unwrap();
        viz.on_refresh();

        drop(feed);
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::FeedDetached));
        assert!(!viz.is_running());
        assert!(!viz.surface().is_empty());
        assert_eq!(viz.on_refresh(), None);
    }

    #[test]
    fn test_fade_continues_after_feed_drops() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = loud_feed();
        viz.attach_feed(&feed);
        viz.start().unwrap();
        viz.on_refresh();

        viz.stop();
        drop(feed);
        clock.advance(Duration::from_millis(500));
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::Rendered));
        assert_eq!(viz.surface().polylines().count(), 0);

        clock.advance(Duration::from_millis(1000));
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::FadeCompleted));
    }

    #[test]
    fn test_zero_extent_skips_frame_but_keeps_loop() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = loud_feed();
        viz.attach_feed(&feed);
        viz.start().unwrap();

        viz.surface_mut().resize(0.0, 0.0);
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::Skipped));
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::Skipped));
        assert_eq!(viz.particle_count(), 0);

        viz.surface_mut().resize(200.0, 100.0);
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::Rendered));
    }

    #[test]
    fn test_malformed_feed_is_clamped() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = Rc::new(ToneFeed {
            time: vec![128; 40],
            freq: RefCell::new(vec![240; 3]),
        });
        viz.attach_feed(&feed);
        viz.start().unwrap();

        assert_eq!(viz.on_refresh(), Some(FrameOutcome::Rendered));
        let path = viz.surface().polylines().next().unwrap();
        assert_eq!(path.len(), 16);
        assert!(viz.particle_count() > 0);
    }

    #[test]
    fn test_restart_mid_fade_resets() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = loud_feed();
        viz.attach_feed(&feed);
        viz.start().unwrap();
        viz.on_refresh();
        viz.stop();
        assert!(matches!(viz.fade_state(), FadeState::FadingOut { .. }));

        viz.start().unwrap();
        assert_eq!(viz.fade_state(), FadeState::Idle);
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::Rendered));
    }

    struct WarningLog;

    thread_local! {
        static WARNINGS: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    impl log::Log for WarningLog {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                WARNINGS.with(|w| w.borrow_mut().push(record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static WARNING_LOG: WarningLog = WarningLog;

    /// Route warnings from this thread into `WARNINGS`, starting empty
    fn capture_warnings() {
        let _ = log::set_logger(&WARNING_LOG);
        log::set_max_level(log::LevelFilter::Warn);
        WARNINGS.with(|w| w.borrow_mut().clear());
    }

    fn warnings_containing(needle: &str) -> usize {
        WARNINGS.with(|w| w.borrow().iter().filter(|m| m.contains(needle)).count())
    }

    #[test]
    fn test_unavailable_surface_warns_once_per_streak() {
        capture_warnings();
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = loud_feed();
        viz.attach_feed(&feed);
        viz.start().unwrap();

        viz.surface_mut().resize(0.0, 0.0);
        for _ in 0..4 {
            assert_eq!(viz.on_refresh(), Some(FrameOutcome::Skipped));
        }
        assert_eq!(warnings_containing("surface unavailable"), 1);

        viz.surface_mut().resize(200.0, 100.0);
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::Rendered));
        assert!(viz.particle_count() > 0);
        assert!(!viz.surface().is_empty());

        viz.surface_mut().resize(200.0, 0.0);
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::Skipped));
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::Skipped));
        assert_eq!(warnings_containing("surface unavailable"), 2);
    }

    #[test]
    fn test_malformed_feed_warns_once_per_streak() {
        capture_warnings();
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = Rc::new(ToneFeed {
            time: vec![128; 16],
            freq: RefCell::new(vec![240; 3]),
        });
        viz.attach_feed(&feed);
        viz.start().unwrap();

        for _ in 0..3 {
            assert_eq!(viz.on_refresh(), Some(FrameOutcome::Rendered));
        }
        assert_eq!(warnings_containing("malformed"), 1);

        *feed.freq.borrow_mut() = vec![240; 8];
        viz.on_refresh();
        *feed.freq.borrow_mut() = vec![240; 2];
        viz.on_refresh();
        assert_eq!(warnings_containing("malformed"), 2);
    }

    #[test]
    fn test_detached_feed_idles_loop() {
        let clock = ManualClock::new();
        let mut viz = engine(&clock);
        let feed = loud_feed();
        viz.attach_feed(&feed);
        assert!(viz.has_feed());
        viz.start().unwrap();

        viz.detach_feed();
        assert!(!viz.has_feed());
        assert_eq!(viz.on_refresh(), Some(FrameOutcome::FeedDetached));
        assert!(!viz.is_running());
        assert_eq!(viz.start(), Err(VizError::NoFeedAttached));
    }
}
