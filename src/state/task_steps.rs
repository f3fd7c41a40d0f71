/// Labels of the progress steps shown while a search runs, in order
pub const TASK_LABELS: [&str; 4] = [
    "Analyzing your request",
    "Searching online for products",
    "Ranking and selecting the best options",
    "Finalizing results",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Loading,
    Done,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStep {
    pub id: u32,
    pub label: &'static str,
    pub status: TaskStatus,
}

/// Outcome of advancing the task list by one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepAdvance {
    /// The loading step finished and step `id` is now loading
    Started(u32),
    /// The last step finished
    Finished,
    /// Nothing was loading, so nothing changed
    Idle,
}

/// Linear list of task steps. Statuses only ever move forward:
/// pending -> loading -> done, or loading -> error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskList {
    steps: Vec<TaskStep>,
}

impl Default for TaskList {
    fn default() -> Self {
        Self::initial()
    }
}

impl TaskList {
    /// Fresh list for a new submission: step 1 loading, the rest pending
    pub fn initial() -> Self {
        let steps = TASK_LABELS
            .into_iter()
            .enumerate()
            .map(|(index, label)| TaskStep {
                id: index as u32 + 1,
                label,
                status: if index == 0 {
                    TaskStatus::Loading
                } else {
                    TaskStatus::Pending
                },
            })
            .collect();

        Self { steps }
    }

    pub fn steps(&self) -> &[TaskStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn status_of(&self, id: u32) -> Option<TaskStatus> {
        self.steps.iter().find(|s| s.id == id).map(|s| s.status)
    }

    pub fn loading_index(&self) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.status == TaskStatus::Loading)
    }

    /// Whether the step currently loading is the last one
    pub fn loading_is_last(&self) -> bool {
        self.loading_index() == Some(self.steps.len().saturating_sub(1))
    }

    /// Finish the loading step and start the next one
    pub fn advance(&mut self) -> StepAdvance {
        let Some(index) = self.loading_index() else {
            return StepAdvance::Idle;
        };

        self.steps[index].status = TaskStatus::Done;
        match self.steps.get_mut(index + 1) {
            Some(next) if next.status == TaskStatus::Pending => {
                next.status = TaskStatus::Loading;
                StepAdvance::Started(next.id)
            }
            Some(_) => StepAdvance::Idle,
            None => StepAdvance::Finished,
        }
    }

    /// Mark every loading step as failed. Returns how many changed.
    pub fn fail(&mut self) -> usize {
        let mut failed = 0;
        for step in self
            .steps
            .iter_mut()
            .filter(|s| s.status == TaskStatus::Loading)
        {
            step.status = TaskStatus::Error;
            failed += 1;
        }
        failed
    }

    pub fn all_done(&self) -> bool {
        self.steps.iter().all(|s| s.status == TaskStatus::Done)
    }

    pub fn error_count(&self) -> usize {
        self.count(TaskStatus::Error)
    }

    pub fn count(&self, status: TaskStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }
}
