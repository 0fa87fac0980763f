use crate::action::{parse_action_spec, ActionTokenError, Step};
use crate::input::{InputError, InputSimulator};

/// What happened while running one action spec.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Steps that were simulated successfully.
    pub executed: usize,
    /// Tokens skipped because they did not parse.
    pub token_errors: Vec<ActionTokenError>,
    /// Steps the input simulator failed to perform.
    pub step_failures: Vec<InputError>,
}

impl DispatchReport {
    pub fn is_clean(&self) -> bool {
        self.token_errors.is_empty() && self.step_failures.is_empty()
    }
}

/// Parses `spec` and runs every valid step in order.
///
/// Never fails: bad tokens and failed steps are recorded in the report and the
/// remaining steps still run. There is no retry or rollback.
pub fn dispatch<I: InputSimulator + ?Sized>(spec: &str, input: &mut I) -> DispatchReport {
    let parsed = parse_action_spec(spec);
    let mut report = execute(&parsed.steps, input);
    report.token_errors = parsed.errors;
    report
}

/// Runs already-parsed `steps` in order.
pub fn execute<I: InputSimulator + ?Sized>(steps: &[Step], input: &mut I) -> DispatchReport {
    let mut report = DispatchReport::default();
    for &step in steps {
        match input.perform(step) {
            Ok(()) => report.executed += 1,
            Err(e) => report.step_failures.push(e),
        }
    }
    report
}
