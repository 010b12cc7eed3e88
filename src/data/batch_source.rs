use log::trace;
use ndarray::{Array2, ArrayView2, s};

use crate::{PbtErr, Result};

/// A borrowed, row-aligned pair of inputs and targets.
#[derive(Debug, Clone, Copy)]
pub struct BatchRef<'a> {
    pub x: ArrayView2<'a, f32>,
    pub y: ArrayView2<'a, f32>,
}

impl BatchRef<'_> {
    /// Returns the amount of rows in this batch.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.nrows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cyclic source of training batches plus a fixed validation set.
///
/// Batches are contiguous, non-overlapping row ranges of the training set handed out in
/// order. The cursor wraps back to the first batch as soon as a batch reaches the end of
/// the training set, so a cycle never ends with an empty batch.
#[derive(Debug, Clone)]
pub struct BatchSource {
    train_x: Array2<f32>,
    train_y: Array2<f32>,
    eval_x: Array2<f32>,
    eval_y: Array2<f32>,
    batch_size: usize,
    cursor: usize, // batch index, not row index
}

impl BatchSource {
    /// Creates a new `BatchSource`.
    ///
    /// # Arguments
    /// * `train_x` - The training inputs, one example per row.
    /// * `train_y` - The training targets, aligned with `train_x`.
    /// * `eval_x` - The held-out inputs.
    /// * `eval_y` - The held-out targets, aligned with `eval_x`.
    /// * `batch_size` - The amount of rows of every full batch.
    ///
    /// # Returns
    /// A new `BatchSource` positioned at its first batch, or an error if the arrays are
    /// empty or disagree on their shapes.
    pub fn new(
        train_x: Array2<f32>,
        train_y: Array2<f32>,
        eval_x: Array2<f32>,
        eval_y: Array2<f32>,
        batch_size: usize,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(PbtErr::InvalidConfig("batch size must be positive".into()));
        }

        if train_x.nrows() == 0 {
            return Err(PbtErr::InvalidConfig("training set is empty".into()));
        }

        check_len("training targets", train_y.nrows(), train_x.nrows())?;
        check_len("validation targets", eval_y.nrows(), eval_x.nrows())?;
        check_len("validation features", eval_x.ncols(), train_x.ncols())?;
        check_len("validation target width", eval_y.ncols(), train_y.ncols())?;

        Ok(Self {
            train_x,
            train_y,
            eval_x,
            eval_y,
            batch_size,
            cursor: 0,
        })
    }

    /// Returns the next training batch and advances the cursor.
    ///
    /// The last batch of a cycle is short when the training set isn't a multiple of the
    /// batch size. Wrapping around is silent.
    pub fn next_batch(&mut self) -> BatchRef<'_> {
        let n = self.len();
        let first = self.cursor * self.batch_size;
        let last = first + self.batch_size;

        let end = if last < n {
            self.cursor += 1;
            last
        } else {
            self.cursor = 0;
            n
        };

        trace!(first = first, end = end, cursor = self.cursor; "next batch");
        BatchRef {
            x: self.train_x.slice(s![first..end, ..]),
            y: self.train_y.slice(s![first..end, ..]),
        }
    }

    /// Returns the whole validation set, always the same one.
    pub fn validation(&self) -> BatchRef<'_> {
        BatchRef {
            x: self.eval_x.view(),
            y: self.eval_y.view(),
        }
    }

    /// Moves the cursor back to the first batch.
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Returns the index of the batch the next call to `next_batch` will return.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the amount of training rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.train_x.nrows()
    }

    /// Always false, construction rejects empty training sets.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the amount of batches in one pass over the training set.
    #[inline]
    pub fn batches_per_cycle(&self) -> usize {
        self.len().div_ceil(self.batch_size)
    }

    /// Returns the width of an input row.
    #[inline]
    pub fn input_dim(&self) -> usize {
        self.train_x.ncols()
    }

    /// Returns the width of a target row.
    #[inline]
    pub fn output_dim(&self) -> usize {
        self.train_y.ncols()
    }
}

fn check_len(what: &'static str, got: usize, expected: usize) -> Result<()> {
    if got != expected {
        return Err(PbtErr::LengthMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}
