use crate::algorithm::remesh_alg::{BuildReport, Remesher};
use crate::engine::Engine;
use crate::error::{RemeshError, Result};
use crate::params::defaults::{ACTION, CHECK};
use crate::params::ParameterStore;

/// Source of user interactions driving the loop
pub trait EventSource {
    /// False once the source is closed or unavailable
    fn is_open(&self) -> bool;

    /// Blocks until the next interaction or tick
    ///
    /// The source may change parameters, including the action token.
    fn wait_for_signal(&mut self, params: &mut ParameterStore) -> Result<()>;

    /// Shows the result of a rebuild
    fn redraw(&mut self, report: &BuildReport);

    /// Shows a failed rebuild
    fn report_error(&mut self, _error: &RemeshError) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Rebuilding,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub rebuilds: usize,
    pub failures: usize,
}

/// Poll/act loop rebuilding the mesh whenever a check is requested
pub struct EventLoop<'a, E: Engine, S: EventSource> {
    remesher: &'a mut Remesher<E>,
    params: &'a mut ParameterStore,
    source: &'a mut S,
    state: LoopState,
    stats: LoopStats,
}

impl<'a, E: Engine, S: EventSource> EventLoop<'a, E, S> {
    pub fn new(
        remesher: &'a mut Remesher<E>,
        params: &'a mut ParameterStore,
        source: &'a mut S,
    ) -> EventLoop<'a, E, S> {
        EventLoop {
            remesher,
            params,
            source,
            state: LoopState::Idle,
            stats: LoopStats::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Performs one transition and returns the new state
    pub fn step(&mut self) -> Result<LoopState> {
        match self.state {
            LoopState::Idle => {
                if self.params.get_string(ACTION)? == CHECK {
                    self.params.set_string(ACTION, "")?;
                    self.state = LoopState::Rebuilding;
                }
            }
            LoopState::Rebuilding => {
                match self.remesher.build(&*self.params) {
                    Ok(report) => {
                        self.stats.rebuilds += 1;
                        self.source.redraw(&report);
                    }
                    Err(e) => {
                        self.stats.failures += 1;
                        log::error!("rebuild failed: {}", e);
                        self.source.report_error(&e);
                    }
                }
                self.state = LoopState::Idle;
            }
        }
        Ok(self.state)
    }

    /// Polls once, rebuilding if a check was requested
    pub fn check_for_event(&mut self) -> Result<()> {
        if self.step()? == LoopState::Rebuilding {
            self.step()?;
        }
        Ok(())
    }

    /// Runs until the event source closes
    pub fn run(mut self) -> Result<LoopStats> {
        while self.source.is_open() {
            self.check_for_event()?;
            self.source.wait_for_signal(&mut *self.params)?;
        }
        log::debug!(
            "event loop closed after {} rebuild(s), {} failure(s)",
            self.stats.rebuilds,
            self.stats.failures
        );
        Ok(self.stats)
    }
}
