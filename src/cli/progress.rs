use std::fmt::Display;
use std::time::Duration;

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::warn;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Done,
    Pending,
    InProgress,
    Skipped,
    Failed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TaskKey {
    LoadTech,
    GenerateLayout,
    WriteLayout,
}

pub struct StepContext {
    step_num: usize,
    steps: Vec<Step>,
}

pub struct Step {
    desc: String,
    key: TaskKey,
    progress_bar: ProgressBar,
}

impl StepContext {
    pub fn new() -> Self {
        println!("Tasks:");

        let mut steps = vec![
            Step {
                desc: "Load technology".to_string(),
                key: TaskKey::LoadTech,
                progress_bar: ProgressBar::new_spinner(),
            },
            Step {
                desc: "Generate layout".to_string(),
                key: TaskKey::GenerateLayout,
                progress_bar: ProgressBar::new_spinner(),
            },
            Step {
                desc: "Write layout data".to_string(),
                key: TaskKey::WriteLayout,
                progress_bar: ProgressBar::new_spinner(),
            },
        ];
        let mp = MultiProgress::new();
        let num_steps = steps.len();
        let width = format!("{}", num_steps).len();
        for (i, step) in steps.iter_mut().enumerate() {
            step.progress_bar = mp.insert(i, step.progress_bar.clone());
            let msg = format!("[{:width$}/{:width$}] {}", i + 1, num_steps, step.desc);
            step.set_status(StepStatus::Pending, Some(msg));
        }
        if let Some(first) = steps.first_mut() {
            first.set_status(StepStatus::InProgress, None);
        }
        StepContext { step_num: 0, steps }
    }

    #[inline]
    pub fn current_step(&mut self) -> Option<&mut Step> {
        self.steps.get_mut(self.step_num)
    }

    /// Marks the current step and every later one as failed or skipped if `res` is an error.
    pub fn check<T, E>(&mut self, res: Result<T, E>) -> Result<T, E> {
        if res.is_err() {
            if let Some(current_step) = self.current_step() {
                current_step.set_status(StepStatus::Failed, None);
                self.step_num += 1;
                while let Some(current_step) = self.current_step() {
                    current_step.set_status(StepStatus::Skipped, None);
                    self.step_num += 1;
                }
            }
            println!("\n");
        }
        res
    }

    pub fn finish(&mut self, key: TaskKey) {
        match self.current_step() {
            Some(current_step) if current_step.key == key => {
                current_step.set_status(StepStatus::Done, None);
                self.step_num += 1;
                if let Some(current_step) = self.current_step() {
                    current_step.set_status(StepStatus::InProgress, None);
                } else {
                    println!("\nCompleted all tasks");
                }
            }
            Some(current_step) => warn!(
                "step {:?} finished while {:?} was in progress",
                key, current_step.key
            ),
            None => warn!("step {:?} finished after all steps completed", key),
        }
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.step_num >= self.steps.len()
    }
}

impl Default for StepContext {
    fn default() -> Self {
        Self::new()
    }
}

fn format_template(spinner: bool, status: impl Display) -> String {
    if spinner {
        format!("{{spinner:.green}} {:16} {{msg}}", status)
    } else {
        format!("  {:16} {{msg}}", status)
    }
}

impl Step {
    fn set_status(&mut self, status: StepStatus, msg: Option<String>) {
        let status_template = match status {
            StepStatus::Done => format_template(false, "Done".green().bold()),
            StepStatus::Failed => format_template(false, "Failed".bright_white().on_red().bold()),
            StepStatus::InProgress => format_template(true, "In Progress".bright_white().bold()),
            StepStatus::Pending => format_template(true, "Pending".blue().bold()),
            StepStatus::Skipped => format_template(false, "Skipped".yellow().bold()),
        };
        let style = ProgressStyle::with_template(&status_template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        self.progress_bar.set_style(style);

        if let Some(msg) = msg {
            self.progress_bar.set_message(msg);
        }

        if status == StepStatus::InProgress {
            self.progress_bar
                .enable_steady_tick(Duration::from_millis(200));
        } else if status != StepStatus::Pending {
            self.progress_bar.finish();
        }
    }
}
