use crate::{
    backend::{Backend, Scalar, Tensor1D, Tensor2D},
    dataset::Dataset,
    loss::Loss,
    model::{ParamOps, TrainableModel},
    optimizer::Optimizer,
    regularizers::Regularizer,
};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::marker::PhantomData;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrainerError {
    #[error("dataset length unknown")]
    UnknownLength,

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("failed to load batch: {0}")]
    Batch(String),

    #[error("loss became non-finite at epoch {epoch}")]
    Diverged { epoch: usize },
}

/// Loop settings shared by [`Trainer`] and its builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerSettings {
    pub batch_size: usize,
    pub max_epochs: usize,
    /// Log the mean loss of every epoch at `debug` level.
    pub verbose: bool,
    /// Reshuffle sample order each epoch from this seed; `None` keeps dataset order.
    pub shuffle_seed: Option<u64>,
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            batch_size: 32,
            max_epochs: 1000,
            verbose: false,
            shuffle_seed: None,
        }
    }
}

/// Mini-batch gradient descent over a [`TrainableModel`] with a fixed loss,
/// optimizer and regularizer. Immutable once built.
pub struct Trainer<B, L, O, M, P, R>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B, Params = P, Gradients = P>,
    O: Optimizer<B, P>,
    R: Regularizer<B, M>,
{
    pub(crate) settings: TrainerSettings,
    loss_fn: L,
    optimizer: O,
    regularizer: R,
    _types: PhantomData<(B, M)>,
}

pub struct TrainerBuilder<B, L, O, M, P, R>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B, Params = P, Gradients = P>,
    O: Optimizer<B, P>,
    R: Regularizer<B, M>,
{
    trainer: Trainer<B, L, O, M, P, R>,
}

impl<B, L, O, M, P, R> TrainerBuilder<B, L, O, M, P, R>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B, Params = P, Gradients = P>,
    O: Optimizer<B, P>,
    R: Regularizer<B, M>,
{
    pub fn new(loss_fn: L, optimizer: O, regularizer: R) -> Self {
        Self {
            trainer: Trainer {
                settings: TrainerSettings::default(),
                loss_fn,
                optimizer,
                regularizer,
                _types: PhantomData,
            },
        }
    }

    /// Zero is treated as one.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.trainer.settings.batch_size = size.max(1);
        self
    }

    pub fn max_epochs(mut self, epochs: usize) -> Self {
        self.trainer.settings.max_epochs = epochs;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.trainer.settings.verbose = verbose;
        self
    }

    pub fn shuffle(mut self, seed: u64) -> Self {
        self.trainer.settings.shuffle_seed = Some(seed);
        self
    }

    pub fn settings(&self) -> &TrainerSettings {
        &self.trainer.settings
    }

    pub fn build(self) -> Trainer<B, L, O, M, P, R> {
        self.trainer
    }
}

impl<B, L, O, M, P, R> Trainer<B, L, O, M, P, R>
where
    B: Backend,
    L: Loss<B, Target = Tensor1D<B>, Prediction = Tensor1D<B>>,
    M: TrainableModel<B, Input = Tensor2D<B>, Prediction = Tensor1D<B>, Params = P, Gradients = P>,
    O: Optimizer<B, P>,
    R: Regularizer<B, M>,
    P: ParamOps<B>,
{
    /// Runs `max_epochs` epochs and returns the fitted model.
    ///
    /// The loss averages gradients over each batch; the regularizer gradient
    /// is added on top. Fails with [`TrainerError::Diverged`] on the first
    /// epoch whose mean loss is not finite.
    pub fn fit<D>(&self, mut model: M, dataset: &D) -> Result<M::Output, TrainerError>
    where
        D: Dataset,
    {
        let n_total = dataset.len().ok_or(TrainerError::UnknownLength)?;
        if n_total == 0 {
            return Err(TrainerError::EmptyDataset);
        }

        let TrainerSettings {
            batch_size,
            max_epochs,
            verbose,
            shuffle_seed,
        } = self.settings;
        let mut rng = shuffle_seed.map(StdRng::seed_from_u64);
        let mut order: Vec<usize> = (0..n_total).collect();

        for epoch in 0..max_epochs {
            let batches = match rng.as_mut() {
                Some(rng) => {
                    order.shuffle(rng);
                    dataset.batches_in_order::<B>(batch_size, order.clone())
                }
                None => dataset.batches::<B>(batch_size),
            };

            let mut total_loss = Scalar::<B>::new(0.0);
            let mut n_batches = 0usize;
            for batch in batches {
                let (batch_x, batch_y) =
                    batch.map_err(|e| TrainerError::Batch(format!("{e:?}")))?;
                let preds = model.forward(&batch_x);
                let (reg_penalty, reg_grad) = self.regularizer.regularizer_penalty_grad(&model);
                total_loss = total_loss + self.loss_fn.loss(&preds, &batch_y) + reg_penalty;

                let grad_preds = self.loss_fn.grad_wrt_prediction(&preds, &batch_y);
                let grads = model.backward(&batch_x, &grad_preds).add(&reg_grad);
                let new_params = self.optimizer.step(model.params(), &grads);
                model.update_params(&new_params);
                n_batches += 1;
            }

            let avg_loss = total_loss.to_f64() / n_batches.max(1) as f64;
            if !avg_loss.is_finite() {
                return Err(TrainerError::Diverged { epoch });
            }
            if verbose {
                debug!("epoch {epoch}: loss = {avg_loss:.6}");
            }
        }

        Ok(model.into_fitted())
    }
}

impl<B, L, O, M, P, R> Trainer<B, L, O, M, P, R>
where
    B: Backend,
    L: Loss<B>,
    M: TrainableModel<B, Params = P, Gradients = P>,
    O: Optimizer<B, P>,
    R: Regularizer<B, M>,
{
    /// Shorthand for [`TrainerBuilder::new`].
    pub fn builder(loss_fn: L, optimizer: O, regularizer: R) -> TrainerBuilder<B, L, O, M, P, R> {
        TrainerBuilder::new(loss_fn, optimizer, regularizer)
    }
}
