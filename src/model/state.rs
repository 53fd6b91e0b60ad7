/// Type-level state of a model still under training; only this state has
/// `forward`/`backward`.
#[derive(Debug, Clone, Copy)]
pub struct Unfitted;

/// Type-level state of a trained model: parameters only, ready to predict.
#[derive(Debug, Clone, Copy)]
pub struct Fitted;
