mod flatten;
mod reconcile;

pub use self::flatten::flatten;
pub use self::reconcile::Reconciler;
