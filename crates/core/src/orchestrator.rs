//! Compile-and-run: two catalog commands dispatched as one unit

use crate::command::{CommandBuilder, ResolvedCommand};
use crate::dispatch::{DispatchMode, Dispatcher, ExecutionOutcome, HandoffSink};
use crate::error::Result;
use crate::params::BuildParameters;
use tracing::{debug, warn};

/// Join two commands so the second runs only if the first succeeds
pub fn join_commands(build: &ResolvedCommand, run: &ResolvedCommand) -> ResolvedCommand {
    ResolvedCommand::new(
        format!("{} && {}", build.text, run.text),
        build.is_multi_process || run.is_multi_process,
    )
}

pub struct Orchestrator<'a, 'd, H: HandoffSink> {
    builder: CommandBuilder<'a>,
    dispatcher: &'d mut Dispatcher<H>,
}

impl<'a, 'd, H: HandoffSink> Orchestrator<'a, 'd, H> {
    pub fn new(builder: CommandBuilder<'a>, dispatcher: &'d mut Dispatcher<H>) -> Self {
        Self {
            builder,
            dispatcher,
        }
    }

    /// Build both stages, then dispatch the joined command once.
    ///
    /// The stages keep their own parameters; differing process counts are
    /// reported but not rejected.
    pub fn compile_and_run(
        &mut self,
        build_method: &str,
        run_method: &str,
        build_params: &BuildParameters,
        run_params: &BuildParameters,
        mode: DispatchMode,
    ) -> Result<ExecutionOutcome> {
        let joined = self.plan(build_method, run_method, build_params, run_params)?;
        self.dispatcher.dispatch(&joined.text, mode)
    }

    /// The joined command `compile_and_run` would dispatch
    pub fn plan(
        &self,
        build_method: &str,
        run_method: &str,
        build_params: &BuildParameters,
        run_params: &BuildParameters,
    ) -> Result<ResolvedCommand> {
        let build = self.builder.build(build_method, build_params)?;
        let run = self.builder.run(run_method, run_params)?;

        if build.is_multi_process
            && run.is_multi_process
            && build_params.process_count != run_params.process_count
        {
            warn!(
                "Build uses {:?} processes but run uses {:?}; the program may not match its launch",
                build_params.process_count.map(|c| c.get()),
                run_params.process_count.map(|c| c.get())
            );
        }

        let joined = join_commands(&build, &run);
        debug!("Compile-and-run command: {}", joined.text);
        Ok(joined)
    }
}
