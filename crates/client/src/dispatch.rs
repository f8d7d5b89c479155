use tokio::task::{JoinError, JoinHandle};

/// Handle returned by a controller action. Work that needs the network runs
/// on a spawned task; everything else is decided before the call returns.
#[derive(Debug)]
pub enum Dispatch<T> {
    Done(T),
    InFlight(JoinHandle<T>),
}

impl<T> Dispatch<T> {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Dispatch::InFlight(_))
    }

    pub async fn outcome(self) -> Result<T, JoinError> {
        match self {
            Dispatch::Done(outcome) => Ok(outcome),
            Dispatch::InFlight(handle) => handle.await,
        }
    }
}
