// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use crate::dist::{Communicator, convex_hulls};
use crate::error::CohullError;
use crate::im::{PixelGrid, valid_dimensions};

/// Raw caller input, only held by the coordinating worker
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub data: Vec<i32>,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Created,
    Validated,
    Prepared,
    Ran,
    Finished,
}

/// Staged adapter around the labeling and hull core
///
/// Stages must be called in order: `validation`, `pre_processing`, `run`
/// and `post_processing`. Every worker of the group runs its own task; only
/// the coordinator holds input and writes output.
///
/// # Examples
///
/// ```
/// use cohull_core::dist::{Communicator, LocalGroup};
/// use cohull_core::task::{HullTask, TaskInput};
///
/// let outputs = LocalGroup::run(2, |comm| {
///     let input = comm.is_root().then(|| TaskInput {
///         data: vec![1, 1, 1, 1],
///         width: 2,
///         height: 2,
///     });
///
///     let mut task = HullTask::new(comm, input);
///     assert!(task.validation());
///     task.pre_processing().unwrap();
///     task.run().unwrap();
///
///     let mut hull = vec![0; 8];
///     task.post_processing(&mut [hull.as_mut_slice()]).unwrap();
///     hull
/// })
/// .unwrap();
///
/// assert_eq!(outputs[0], [0, 1, 1, 1, 1, 0, 0, 0]);
/// ```
pub struct HullTask<C: Communicator> {
    comm: C,
    input: Option<TaskInput>,
    grid: Option<PixelGrid>,
    results: Vec<Vec<i32>>,
    stage: Stage,
}

impl<C: Communicator> HullTask<C> {
    pub fn new(comm: C, input: Option<TaskInput>) -> Self {
        HullTask {
            comm,
            input,
            grid: None,
            results: Vec::new(),
            stage: Stage::Created,
        }
    }

    /// Check the input dimensions before any work is done
    ///
    /// Returns false for negative dimensions, a coordinator without input,
    /// or a call out of order. Non-coordinating workers hold no input and
    /// always accept.
    pub fn validation(&mut self) -> bool {
        if self.stage != Stage::Created {
            return false;
        }

        let valid = if self.comm.is_root() {
            self.input
                .as_ref()
                .is_some_and(|input| valid_dimensions(input.width, input.height))
        } else {
            true
        };

        if valid {
            self.stage = Stage::Validated;
        }

        valid
    }

    /// Build the pixel grid on the coordinator
    pub fn pre_processing(&mut self) -> Result<(), CohullError> {
        self.advance(Stage::Validated, Stage::Prepared, "pre_processing requires validation")?;

        if self.comm.is_root() {
            let input = self.input.take().ok_or_else(|| {
                CohullError::TaskOrderError("pre_processing requires coordinator input")
            })?;
            self.grid = Some(PixelGrid::from_signed(input.data, input.width, input.height)?);
        }

        Ok(())
    }

    /// Label, distribute and gather hulls
    ///
    /// Every worker of the group must call `run`.
    pub fn run(&mut self) -> Result<(), CohullError> {
        self.advance(Stage::Prepared, Stage::Ran, "run requires pre_processing")?;

        self.results = convex_hulls(&self.comm, self.grid.take())?.unwrap_or_default();

        Ok(())
    }

    /// Copy each flattened hull into the matching caller buffer
    ///
    /// Only the coordinator writes. Each buffer must hold at least
    /// `2 x vertex count` integers.
    pub fn post_processing(&mut self, outputs: &mut [&mut [i32]]) -> Result<(), CohullError> {
        self.advance(Stage::Ran, Stage::Finished, "post_processing requires run")?;

        if !self.comm.is_root() {
            return Ok(());
        }

        if outputs.len() < self.results.len()
            || self
                .results
                .iter()
                .zip(outputs.iter())
                .any(|(hull, output)| output.len() < hull.len())
        {
            return Err(CohullError::OutputSizeError);
        }

        for (hull, output) in self.results.iter().zip(outputs.iter_mut()) {
            output[..hull.len()].copy_from_slice(hull);
        }

        Ok(())
    }

    /// Flattened hulls held by the coordinator after `run`
    pub fn results(&self) -> &[Vec<i32>] {
        &self.results
    }

    fn advance(&mut self, from: Stage, to: Stage, message: &'static str) -> Result<(), CohullError> {
        if self.stage != from {
            return Err(CohullError::TaskOrderError(message));
        }
        self.stage = to;
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::dist::{LocalComm, LocalGroup};

    fn solo() -> LocalComm {
        LocalGroup::communicators(1).unwrap().remove(0)
    }

    fn input(data: Vec<i32>, width: i64, height: i64) -> Option<TaskInput> {
        Some(TaskInput {
            data,
            width,
            height,
        })
    }

    #[test]
    fn test_negative_dimensions_rejected() {
        let mut task = HullTask::new(solo(), input(vec![], -1, 4));
        assert!(!task.validation());
        assert!(matches!(
            task.pre_processing(),
            Err(CohullError::TaskOrderError(_))
        ));

        let mut task = HullTask::new(solo(), input(vec![], 4, -1));
        assert!(!task.validation());
    }

    #[test]
    fn test_out_of_order() {
        let mut task = HullTask::new(solo(), input(vec![1], 1, 1));
        assert!(task.run().is_err());
        assert!(task.validation());
        assert!(!task.validation());
        assert!(task.post_processing(&mut []).is_err());
        task.pre_processing().unwrap();
        task.run().unwrap();
        assert!(task.run().is_err());
    }

    #[test]
    fn test_buffer_size_mismatch() {
        let mut task = HullTask::new(solo(), input(vec![1, 1, 1], 2, 2));
        assert!(task.validation());
        assert_eq!(
            task.pre_processing().unwrap_err(),
            CohullError::BufferSizeError
        );
    }

    #[test]
    fn test_output_too_small() {
        let mut task = HullTask::new(solo(), input(vec![1, 0, 0, 1, 1, 0], 3, 2));
        assert!(task.validation());
        task.pre_processing().unwrap();
        task.run().unwrap();
        assert_eq!(task.results(), [vec![0, 1, 1, 1, 0, 0]]);

        let mut small = vec![0; 4];
        assert_eq!(
            task.post_processing(&mut [small.as_mut_slice()]).unwrap_err(),
            CohullError::OutputSizeError
        );
    }

    #[test]
    fn test_group_outputs() {
        #[rustfmt::skip]
        let data = vec![
            1, 0, 0, 1,
            0, 0, 0, 1,
            1, 1, 0, 0,
        ];

        let outputs = LocalGroup::run(3, |comm| {
            let input = comm.is_root().then(|| TaskInput {
                data: data.clone(),
                width: 4,
                height: 3,
            });

            let mut task = HullTask::new(comm, input);
            assert!(task.validation());
            task.pre_processing().unwrap();
            task.run().unwrap();

            let mut a = vec![-1; 2];
            let mut b = vec![-1; 4];
            let mut c = vec![-1; 4];
            task.post_processing(&mut [a.as_mut_slice(), b.as_mut_slice(), c.as_mut_slice()])
                .unwrap();
            (task.results().len(), a, b, c)
        })
        .unwrap();

        assert_eq!(outputs[0], (3, vec![0, 0], vec![3, 1, 3, 0], vec![0, 2, 1, 2]));
        assert_eq!(outputs[1], (0, vec![-1; 2], vec![-1; 4], vec![-1; 4]));
    }
}
