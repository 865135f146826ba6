use std::{
    cell::RefCell,
    collections::HashMap,
    time::{Duration, Instant},
};

use log::{error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    step::{Step, StepExecution},
};

/// Type alias for job execution results.
type JobResult<T> = Result<T, BatchError>;

/// Represents a job that can be executed.
///
/// A job is a container for a sequence of steps that are executed in order.
/// The job orchestrates the steps and reports the overall result.
pub trait Job {
    /// Runs the job and returns the result of the job execution.
    ///
    /// # Returns
    /// - `Ok(JobExecution)` when the job executes successfully
    /// - `Err(BatchError)` when the job execution fails
    fn run(&self) -> JobResult<JobExecution>;

    /// Returns the recorded execution of a step by name, if it ran.
    fn get_step_execution(&self, step_name: &str) -> Option<StepExecution>;
}

/// Timing information about a job run.
#[derive(Debug)]
pub struct JobExecution {
    /// The time when the job started executing
    pub start: Instant,
    /// The time when the job finished executing
    pub end: Instant,
    /// The total duration of the job execution
    pub duration: Duration,
}

/// A specific configuration of a job that can be executed.
///
/// Created through the [`JobBuilder`]; the steps are executed in the order
/// they were added.
pub struct JobInstance<'a> {
    /// Unique identifier for this job instance
    id: Uuid,
    /// Human-readable name for the job
    name: String,
    /// Collection of steps that make up this job, in execution order
    steps: Vec<&'a dyn Step>,
    /// Executions recorded for the steps that have run
    step_executions: RefCell<HashMap<String, StepExecution>>,
}

impl Job for JobInstance<'_> {
    fn run(&self) -> JobResult<JobExecution> {
        let start = Instant::now();

        info!("Start of job: {}, id: {}", self.name, self.id);

        for step in &self.steps {
            let mut step_execution = StepExecution::new(step.get_name());
            let result = step.execute(&mut step_execution);

            self.step_executions
                .borrow_mut()
                .insert(step_execution.name.clone(), step_execution);

            if let Err(err) = result {
                error!("Step {} failed: {}", step.get_name(), err);
                return Err(BatchError::Step(step.get_name().to_owned()));
            }
        }

        info!("End of job: {}, id: {}", self.name, self.id);

        Ok(JobExecution {
            start,
            end: Instant::now(),
            duration: start.elapsed(),
        })
    }

    fn get_step_execution(&self, step_name: &str) -> Option<StepExecution> {
        self.step_executions.borrow().get(step_name).cloned()
    }
}

/// Builder for creating a job instance.
#[derive(Default)]
pub struct JobBuilder<'a> {
    /// Optional name for the job (generated randomly if not specified)
    name: Option<String>,
    /// Collection of steps to be executed, in order
    steps: Vec<&'a dyn Step>,
}

impl<'a> JobBuilder<'a> {
    pub fn new() -> Self {
        Self {
            name: None,
            steps: Vec::new(),
        }
    }

    /// Sets the name of the job.
    pub fn name(mut self, name: String) -> JobBuilder<'a> {
        self.name = Some(name);
        self
    }

    /// Sets the first step of the job.
    ///
    /// Semantically identical to `next()` but reads better for the
    /// initial step.
    pub fn start(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Adds a step to the job. Steps are executed in the order they are added.
    pub fn next(mut self, step: &'a dyn Step) -> JobBuilder<'a> {
        self.steps.push(step);
        self
    }

    /// Builds a `JobInstance`. If no name has been provided, a random name
    /// is generated.
    pub fn build(self) -> JobInstance<'a> {
        JobInstance {
            id: Uuid::new_v4(),
            name: self.name.unwrap_or_else(build_name),
            steps: self.steps,
            step_executions: RefCell::new(HashMap::new()),
        }
    }
}
